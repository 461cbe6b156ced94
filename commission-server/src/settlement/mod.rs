//! Commission settlement engine
//!
//! Turns confirmed payments into per-salesperson commission records.
//!
//! # 结构
//!
//! | Module        | Role                                                  |
//! |---------------|-------------------------------------------------------|
//! | `snapshot`    | read order, lines and payment confirmation            |
//! | `eligibility` | gate: NOT_CONFIRMED / ALREADY_SETTLED / ...           |
//! | `period`      | order date → settlement month (one month later)       |
//! | `proration`   | payment ratio and per-line commissionable amounts     |
//! | `attribution` | beneficiary per line, promotion-child exclusion       |
//! | `plan`        | proration + attribution for one order (pure)          |
//! | `aggregator`  | record increments and audit lines (transactional)     |
//! | `engine`      | batch driver, per-order transactions, queries         |

pub mod aggregator;
pub mod attribution;
pub mod cache;
pub mod eligibility;
pub mod engine;
pub mod error;
pub mod period;
pub mod plan;
pub mod proration;
pub mod rates;
pub mod snapshot;

pub use engine::{EngineConfig, SettlementEngine};
pub use error::{Inconsistency, SettlementError, SettlementResult};
pub use proration::ProrationBase;
