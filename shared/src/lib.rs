//! Shared types for the commission settlement service
//!
//! Domain models, the unified error system and small utilities used by
//! the server crate and its operator tooling.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
