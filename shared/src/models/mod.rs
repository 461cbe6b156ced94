//! Data models
//!
//! Shared between the settlement engine, its HTTP surface and operator tooling.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]` where
//! every column maps directly; money-bearing rows are decoded in the repositories.

pub mod commission;
pub mod order;
pub mod period;
pub mod settlement;
pub mod user;

// Re-exports
pub use commission::*;
pub use order::*;
pub use period::*;
pub use settlement::*;
pub use user::*;
