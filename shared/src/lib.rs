//! Shared types and domain logic for the Rider Distribution Management platform
//!
//! This crate contains the pure parts of the system: common types, validation
//! helpers, and the derivation engines (reconciliation, inventory summary,
//! production planning) that the backend services feed from storage.

pub mod production;
pub mod reconciliation;
pub mod summary;
pub mod types;
pub mod validation;

pub use production::*;
pub use reconciliation::*;
pub use summary::*;
pub use types::*;
pub use validation::*;
