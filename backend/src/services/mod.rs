//! Business logic services for the Rider Distribution Management backend

pub mod batch;
pub mod distribution;
pub mod inventory;
pub mod product;
pub mod production;
pub mod reconciliation;
pub mod report;
pub mod rider;

pub use batch::BatchService;
pub use distribution::DistributionService;
pub use inventory::InventoryService;
pub use product::ProductService;
pub use production::ProductionService;
pub use reconciliation::ReconciliationService;
pub use report::ReportService;
pub use rider::RiderService;

use crate::error::{AppError, AppResult};
use shared::ProductCategory;

/// Decode a stored category value into the typed enum.
///
/// The column carries a CHECK constraint, so a decode failure means the data
/// was edited out of band.
pub(crate) fn parse_category(value: &str) -> AppResult<ProductCategory> {
    value.parse().map_err(AppError::Internal)
}
