//! Daily report service
//!
//! Assembles a one-day operational report: what was produced that day, what
//! went out to riders, and where warehouse stock stands now.

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use shared::ProductCategory;

use crate::error::AppResult;
use crate::services::inventory::InventoryService;

/// Daily report service
#[derive(Clone)]
pub struct ReportService {
    db: PgPool,
}

/// One batch produced on the report day
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductionLine {
    pub product_name: String,
    pub quantity: i32,
    pub production_date: NaiveDate,
    pub expiry_date: NaiveDate,
}

/// One allocation made on the report day
#[derive(Debug, Clone, Serialize)]
pub struct DistributionLine {
    pub rider_name: String,
    pub product_name: String,
    pub quantity: i32,
    /// Production and expiry dates of the source batch, "dd/mm - dd/mm"
    pub batch_info: String,
}

#[derive(Debug, FromRow)]
struct DistributionLineRow {
    rider_name: String,
    product_name: String,
    quantity: i32,
    production_date: NaiveDate,
    expiry_date: NaiveDate,
}

/// Current warehouse totals attached to the daily report
#[derive(Debug, Clone, Serialize)]
pub struct DayTotals {
    /// Warehouse stock across primary products
    pub total_cups: i32,
    /// Warehouse stock across add-ons
    pub total_addons: i32,
    /// Number of products with stock on hand
    pub products: usize,
}

/// A one-day operational report
#[derive(Debug, Clone, Serialize)]
pub struct DailyReport {
    pub date: NaiveDate,
    pub productions: Vec<ProductionLine>,
    pub distributions: Vec<DistributionLine>,
    pub summary: DayTotals,
}

impl ReportService {
    /// Create a new ReportService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Build the report for one calendar day
    pub async fn daily_report(&self, date: NaiveDate) -> AppResult<DailyReport> {
        let productions = sqlx::query_as::<_, ProductionLine>(
            r#"
            SELECT p.name AS product_name, b.initial_quantity AS quantity,
                   b.production_date, b.expiry_date
            FROM inventory_batches b
            JOIN products p ON p.id = b.product_id
            WHERE b.production_date = $1
            ORDER BY p.name
            "#,
        )
        .bind(date)
        .fetch_all(&self.db)
        .await?;

        let day_start = date.and_time(NaiveTime::MIN).and_utc();
        let day_end = (date + Duration::days(1)).and_time(NaiveTime::MIN).and_utc();

        let distribution_rows = sqlx::query_as::<_, DistributionLineRow>(
            r#"
            SELECT r.name AS rider_name, p.name AS product_name, d.quantity,
                   b.production_date, b.expiry_date
            FROM distributions d
            JOIN riders r ON r.id = d.rider_id
            JOIN inventory_batches b ON b.id = d.batch_id
            JOIN products p ON p.id = b.product_id
            WHERE d.distributed_at >= $1 AND d.distributed_at < $2
            ORDER BY d.distributed_at
            "#,
        )
        .bind(day_start)
        .bind(day_end)
        .fetch_all(&self.db)
        .await?;

        let distributions = distribution_rows
            .into_iter()
            .map(|row| DistributionLine {
                batch_info: format!(
                    "{} - {}",
                    row.production_date.format("%d/%m"),
                    row.expiry_date.format("%d/%m"),
                ),
                rider_name: row.rider_name,
                product_name: row.product_name,
                quantity: row.quantity,
            })
            .collect();

        let summaries = InventoryService::new(self.db.clone()).summarize().await?;
        let mut totals = DayTotals {
            total_cups: 0,
            total_addons: 0,
            products: 0,
        };
        for summary in &summaries {
            match summary.category {
                ProductCategory::Primary => totals.total_cups += summary.total_in_inventory,
                ProductCategory::Addon => totals.total_addons += summary.total_in_inventory,
            }
            if summary.total_in_inventory > 0 {
                totals.products += 1;
            }
        }

        Ok(DailyReport {
            date,
            productions,
            distributions,
            summary: totals,
        })
    }
}
