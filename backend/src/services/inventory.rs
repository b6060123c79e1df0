//! Inventory summary service
//!
//! Reads the batch and distribution ledgers and hands the rows to the pure
//! aggregator in the shared crate. Purely derived, no state of its own.

use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::{summarize_inventory, BatchStock, DistributionTotals, ProductInventorySummary};

use crate::error::AppResult;
use crate::services::parse_category;

/// Inventory summary service
#[derive(Clone)]
pub struct InventoryService {
    db: PgPool,
}

#[derive(Debug, FromRow)]
struct BatchStockRow {
    batch_id: Uuid,
    product_id: Uuid,
    product_name: String,
    category: String,
    current_quantity: i32,
    warehouse_rejected_quantity: i32,
}

#[derive(Debug, FromRow)]
struct DistributionTotalsRow {
    batch_id: Uuid,
    quantity: i32,
    sold_quantity: i32,
    returned_quantity: i32,
    rejected_quantity: i32,
}

impl InventoryService {
    /// Create a new InventoryService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Per-product inventory summary across all batches and distributions.
    ///
    /// Batches are read in FEFO order, so products appear in the order their
    /// oldest stock expires.
    pub async fn summarize(&self) -> AppResult<Vec<ProductInventorySummary>> {
        let batch_rows = sqlx::query_as::<_, BatchStockRow>(
            r#"
            SELECT b.id AS batch_id, b.product_id, p.name AS product_name, p.category,
                   b.current_quantity, b.warehouse_rejected_quantity
            FROM inventory_batches b
            JOIN products p ON p.id = b.product_id
            ORDER BY b.expiry_date ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let distribution_rows = sqlx::query_as::<_, DistributionTotalsRow>(
            r#"
            SELECT batch_id, quantity, sold_quantity, returned_quantity, rejected_quantity
            FROM distributions
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let batches = batch_rows
            .into_iter()
            .map(|row| {
                Ok(BatchStock {
                    category: parse_category(&row.category)?,
                    batch_id: row.batch_id,
                    product_id: row.product_id,
                    product_name: row.product_name,
                    current_quantity: row.current_quantity,
                    warehouse_rejected_quantity: row.warehouse_rejected_quantity,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        let distributions: Vec<DistributionTotals> = distribution_rows
            .into_iter()
            .map(|row| DistributionTotals {
                batch_id: row.batch_id,
                quantity: row.quantity,
                sold_quantity: row.sold_quantity,
                returned_quantity: row.returned_quantity,
                rejected_quantity: row.rejected_quantity,
            })
            .collect();

        Ok(summarize_inventory(&batches, &distributions))
    }
}
