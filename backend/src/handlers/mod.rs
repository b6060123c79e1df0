//! HTTP handlers for the Rider Distribution Management backend

pub mod batch;
pub mod distribution;
pub mod health;
pub mod inventory;
pub mod product;
pub mod production;
pub mod reconciliation;
pub mod report;
pub mod rider;

pub use batch::*;
pub use distribution::*;
pub use health::*;
pub use inventory::*;
pub use product::*;
pub use production::*;
pub use reconciliation::*;
pub use report::*;
pub use rider::*;
