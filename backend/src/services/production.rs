//! Production planning service
//!
//! Combines the inventory summary with the rider count and the configured
//! allocation policy to derive how much of each product should be produced.

use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::{plan_production_needs, AllocationPolicy, ProductStock, ProductionNeed};

use crate::error::AppResult;
use crate::services::inventory::InventoryService;
use crate::services::parse_category;
use crate::services::rider::RiderService;

/// Rider count used when the roster is empty, so a fresh install still gets
/// a usable plan
const DEFAULT_RIDER_COUNT: i32 = 4;

/// Production planning service
#[derive(Clone)]
pub struct ProductionService {
    db: PgPool,
    policy: AllocationPolicy,
}

/// A full production plan
#[derive(Debug, Clone, Serialize)]
pub struct ProductionPlan {
    pub rider_count: i32,
    pub needs: Vec<ProductionNeed>,
}

#[derive(Debug, FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    category: String,
}

impl ProductionService {
    /// Create a new ProductionService instance
    pub fn new(db: PgPool, policy: AllocationPolicy) -> Self {
        Self { db, policy }
    }

    /// Derive production needs for the whole catalog.
    ///
    /// Every product appears in the plan, including ones with no batch yet;
    /// those count as zero stock.
    pub async fn production_needs(&self) -> AppResult<ProductionPlan> {
        let products = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, category FROM products ORDER BY name",
        )
        .fetch_all(&self.db)
        .await?;

        let summaries = InventoryService::new(self.db.clone()).summarize().await?;

        let riders_on_roster = RiderService::new(self.db.clone()).count().await?;
        let rider_count = if riders_on_roster > 0 {
            riders_on_roster as i32
        } else {
            DEFAULT_RIDER_COUNT
        };

        let stocks = products
            .into_iter()
            .map(|product| {
                let current_stock = summaries
                    .iter()
                    .find(|s| s.product_id == product.id)
                    .map(|s| s.total_in_inventory)
                    .unwrap_or(0);

                Ok(ProductStock {
                    category: parse_category(&product.category)?,
                    product_id: product.id,
                    product_name: product.name,
                    current_stock,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(ProductionPlan {
            rider_count,
            needs: plan_production_needs(&stocks, rider_count, &self.policy),
        })
    }
}
