//! Reconciliation service
//!
//! Feeds distribution ledger rows through the pure reconciliation engine in
//! the shared crate. Reconciliation is always derived on read; outcome
//! counters in the ledger are the single source of truth.

use sqlx::PgPool;
use uuid::Uuid;

use shared::{
    reconcile, summarize, DateRange, OutcomeCounts, ReconciliationItem, ReconciliationSummary,
};

use crate::error::AppResult;
use crate::services::distribution::{DistributionDetail, DistributionService};

/// Reconciliation service
#[derive(Clone)]
pub struct ReconciliationService {
    distributions: DistributionService,
}

impl ReconciliationService {
    /// Create a new ReconciliationService instance
    pub fn new(db: PgPool) -> Self {
        Self {
            distributions: DistributionService::new(db),
        }
    }

    /// Per-distribution reconciliation rows, optionally filtered by rider
    /// and date window
    pub async fn report(
        &self,
        rider_id: Option<Uuid>,
        window: Option<&DateRange>,
    ) -> AppResult<Vec<ReconciliationItem>> {
        let details = self.distributions.list_details(rider_id, window).await?;

        Ok(details.into_iter().map(to_item).collect())
    }

    /// Aggregate reconciliation summary over the same filtered set
    pub async fn summary(
        &self,
        rider_id: Option<Uuid>,
        window: Option<&DateRange>,
    ) -> AppResult<ReconciliationSummary> {
        let items = self.report(rider_id, window).await?;

        Ok(summarize(&items))
    }
}

fn to_item(detail: DistributionDetail) -> ReconciliationItem {
    let d = detail.distribution;
    let reconciliation = reconcile(OutcomeCounts {
        quantity: d.quantity,
        sold: d.sold_quantity,
        returned: d.returned_quantity,
        rejected: d.rejected_quantity,
    });

    ReconciliationItem {
        id: d.id,
        batch_id: d.batch_id,
        product_id: detail.product_id,
        product_name: detail.product_name,
        rider_id: d.rider_id,
        rider_name: detail.rider_name,
        distributed_quantity: d.quantity,
        sold_quantity: d.sold_quantity,
        returned_quantity: d.returned_quantity,
        rejected_quantity: d.rejected_quantity,
        unaccounted_quantity: reconciliation.unaccounted,
        accounting_percentage: reconciliation.accounting_percentage,
        status: reconciliation.status,
        distributed_at: d.distributed_at,
        notes: d.notes,
    }
}
