//! Distribution ledger service
//!
//! Tracks quantity handed from a batch to a rider and the three-way split of
//! its eventual disposition (sold / returned / rejected). Allocation and
//! outcome recording are the two writes where concurrent requests can race;
//! both are closed with conditional updates inside short transactions.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::{validate_positive_quantity, AllocationPolicy, DateRange, DESTRUCTION_MARKER};

use crate::error::{AppError, AppResult};
use crate::services::batch::BatchService;
use crate::services::parse_category;

/// Distribution ledger service
#[derive(Clone)]
pub struct DistributionService {
    db: PgPool,
}

/// One allocation of stock from a batch to a rider, with outcome counters
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Distribution {
    pub id: Uuid,
    pub rider_id: Uuid,
    pub batch_id: Uuid,
    pub quantity: i32,
    pub distributed_at: DateTime<Utc>,
    pub sold_quantity: i32,
    pub returned_quantity: i32,
    pub rejected_quantity: i32,
    pub rejected_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl Distribution {
    /// Quantity still with the rider, not yet accounted for
    pub fn remaining(&self) -> i32 {
        self.quantity - self.sold_quantity - self.returned_quantity - self.rejected_quantity
    }
}

/// Distribution joined with rider and product reference data
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DistributionDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub distribution: Distribution,
    pub rider_name: String,
    pub product_id: Uuid,
    pub product_name: String,
}

/// Rider-reported disposition of distributed stock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeAction {
    Sell,
    Return,
    Reject,
}

/// Input for allocating stock to a rider
#[derive(Debug, Deserialize)]
pub struct AllocateInput {
    pub rider_id: Uuid,
    pub batch_id: Uuid,
    pub quantity: i32,
}

/// Input for allocating the same quantity from several batches
#[derive(Debug, Deserialize)]
pub struct BulkAllocateInput {
    pub rider_id: Uuid,
    pub batch_ids: Vec<Uuid>,
    pub quantity_per_batch: i32,
}

/// Input for recording a rider-reported outcome
#[derive(Debug, Deserialize)]
pub struct RecordOutcomeInput {
    pub action: OutcomeAction,
    pub amount: i32,
}

/// Input for an administrative correction of outcome counters
#[derive(Debug, Deserialize)]
pub struct AdminCorrectInput {
    pub sold_quantity: i32,
    pub returned_quantity: i32,
    pub notes: Option<String>,
}

/// A batch skipped during bulk allocation, with the reason
#[derive(Debug, Clone, Serialize)]
pub struct SkippedBatch {
    pub batch_id: Uuid,
    pub reason: String,
}

/// Result of a bulk allocation: partial success is the documented contract
#[derive(Debug, Clone, Serialize)]
pub struct BulkAllocationOutcome {
    pub created: Vec<Distribution>,
    pub skipped: Vec<SkippedBatch>,
}

/// A product skipped during bundle allocation, with the reason
#[derive(Debug, Clone, Serialize)]
pub struct SkippedProduct {
    pub product_id: Uuid,
    pub product_name: String,
    pub reason: String,
}

/// Result of a default-bundle allocation
#[derive(Debug, Clone, Serialize)]
pub struct BundleAllocationOutcome {
    pub created: Vec<Distribution>,
    pub skipped: Vec<SkippedProduct>,
}

#[derive(Debug, FromRow)]
struct ProductRef {
    id: Uuid,
    name: String,
    category: String,
}

const DISTRIBUTION_COLUMNS: &str = "id, rider_id, batch_id, quantity, distributed_at, \
     sold_quantity, returned_quantity, rejected_quantity, rejected_at, notes";

impl DistributionService {
    /// Create a new DistributionService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Allocate stock from a batch to a rider.
    ///
    /// The batch decrement and the distribution insert happen in one
    /// transaction: a failed allocation leaves no trace.
    pub async fn allocate(&self, input: AllocateInput) -> AppResult<Distribution> {
        if let Err(msg) = validate_positive_quantity(input.quantity) {
            return Err(AppError::Validation {
                field: "quantity".to_string(),
                message: msg.to_string(),
                message_id: "Jumlah harus lebih dari nol".to_string(),
            });
        }

        self.ensure_rider_exists(input.rider_id).await?;

        let mut tx = self.db.begin().await?;

        BatchService::decrement_for_distribution(&mut tx, input.batch_id, input.quantity).await?;

        let distribution = sqlx::query_as::<_, Distribution>(&format!(
            r#"
            INSERT INTO distributions (rider_id, batch_id, quantity)
            VALUES ($1, $2, $3)
            RETURNING {DISTRIBUTION_COLUMNS}
            "#,
        ))
        .bind(input.rider_id)
        .bind(input.batch_id)
        .bind(input.quantity)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            distribution_id = %distribution.id,
            rider_id = %input.rider_id,
            batch_id = %input.batch_id,
            quantity = input.quantity,
            "stock allocated to rider"
        );

        Ok(distribution)
    }

    /// Allocate the same quantity from several batches to one rider.
    ///
    /// Partial success is the contract: a batch with insufficient stock or a
    /// missing record is reported as skipped and does not abort the rest.
    pub async fn allocate_bulk(&self, input: BulkAllocateInput) -> AppResult<BulkAllocationOutcome> {
        let mut outcome = BulkAllocationOutcome {
            created: Vec::new(),
            skipped: Vec::new(),
        };

        for batch_id in input.batch_ids {
            let result = self
                .allocate(AllocateInput {
                    rider_id: input.rider_id,
                    batch_id,
                    quantity: input.quantity_per_batch,
                })
                .await;

            match result {
                Ok(distribution) => outcome.created.push(distribution),
                Err(
                    err @ (AppError::InsufficientStock { .. }
                    | AppError::NotFound(_)
                    | AppError::Validation { .. }),
                ) => {
                    outcome.skipped.push(SkippedBatch {
                        batch_id,
                        reason: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        Ok(outcome)
    }

    /// Allocate the default bundle: for each product, the policy quantity
    /// from the single oldest-expiring eligible batch.
    ///
    /// A batch claimed for one product is excluded for the rest of the pass,
    /// so two catalog entries can never compete for the same physical stock
    /// within one planning run.
    pub async fn allocate_default_bundle(
        &self,
        rider_id: Uuid,
        policy: &AllocationPolicy,
    ) -> AppResult<BundleAllocationOutcome> {
        self.ensure_rider_exists(rider_id).await?;

        let products = sqlx::query_as::<_, ProductRef>(
            "SELECT id, name, category FROM products ORDER BY name",
        )
        .fetch_all(&self.db)
        .await?;

        let mut outcome = BundleAllocationOutcome {
            created: Vec::new(),
            skipped: Vec::new(),
        };
        let mut claimed: Vec<Uuid> = Vec::new();

        for product in products {
            let category = parse_category(&product.category)?;
            let quantity = policy.allocation_for(&product.name, category);
            if quantity <= 0 {
                outcome.skipped.push(SkippedProduct {
                    product_id: product.id,
                    product_name: product.name,
                    reason: "no allocation configured for this product".to_string(),
                });
                continue;
            }

            let batch_id = sqlx::query_scalar::<_, Uuid>(
                r#"
                SELECT id
                FROM inventory_batches
                WHERE product_id = $1
                  AND current_quantity >= $2
                  AND expiry_date >= CURRENT_DATE
                  AND (notes IS NULL OR notes NOT LIKE $3)
                  AND id <> ALL($4)
                ORDER BY expiry_date ASC
                LIMIT 1
                "#,
            )
            .bind(product.id)
            .bind(quantity)
            .bind(format!("{}%", DESTRUCTION_MARKER))
            .bind(&claimed[..])
            .fetch_optional(&self.db)
            .await?;

            let Some(batch_id) = batch_id else {
                outcome.skipped.push(SkippedProduct {
                    product_id: product.id,
                    product_name: product.name,
                    reason: "no eligible batch with sufficient stock".to_string(),
                });
                continue;
            };

            let result = self
                .allocate(AllocateInput {
                    rider_id,
                    batch_id,
                    quantity,
                })
                .await;

            match result {
                Ok(distribution) => {
                    claimed.push(batch_id);
                    outcome.created.push(distribution);
                }
                // The batch can lose stock between selection and allocation;
                // report the product as skipped instead of aborting the pass
                Err(
                    err @ (AppError::InsufficientStock { .. }
                    | AppError::NotFound(_)
                    | AppError::Validation { .. }),
                ) => {
                    outcome.skipped.push(SkippedProduct {
                        product_id: product.id,
                        product_name: product.name,
                        reason: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        Ok(outcome)
    }

    /// Record a rider-reported outcome against a distribution.
    ///
    /// The counter increment is validated against the stored state, never a
    /// client-supplied remaining: the conditional update recomputes
    /// `remaining` in the same statement that applies the change, so two
    /// concurrent submissions cannot both pass against a stale value. A
    /// return additionally credits the source batch in the same transaction.
    pub async fn record_outcome(
        &self,
        distribution_id: Uuid,
        input: RecordOutcomeInput,
    ) -> AppResult<Distribution> {
        if let Err(msg) = validate_positive_quantity(input.amount) {
            return Err(AppError::Validation {
                field: "amount".to_string(),
                message: msg.to_string(),
                message_id: "Jumlah harus lebih dari nol".to_string(),
            });
        }

        let sql = match input.action {
            OutcomeAction::Sell => format!(
                r#"
                UPDATE distributions
                SET sold_quantity = sold_quantity + $2
                WHERE id = $1
                  AND quantity - sold_quantity - returned_quantity - rejected_quantity >= $2
                RETURNING {DISTRIBUTION_COLUMNS}
                "#,
            ),
            OutcomeAction::Return => format!(
                r#"
                UPDATE distributions
                SET returned_quantity = returned_quantity + $2
                WHERE id = $1
                  AND quantity - sold_quantity - returned_quantity - rejected_quantity >= $2
                RETURNING {DISTRIBUTION_COLUMNS}
                "#,
            ),
            OutcomeAction::Reject => format!(
                r#"
                UPDATE distributions
                SET rejected_quantity = rejected_quantity + $2, rejected_at = NOW()
                WHERE id = $1
                  AND quantity - sold_quantity - returned_quantity - rejected_quantity >= $2
                RETURNING {DISTRIBUTION_COLUMNS}
                "#,
            ),
        };

        let mut tx = self.db.begin().await?;

        let updated = sqlx::query_as::<_, Distribution>(&sql)
            .bind(distribution_id)
            .bind(input.amount)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(distribution) = updated else {
            drop(tx);
            let existing = self.get_distribution(distribution_id).await?;
            return Err(AppError::InsufficientStock {
                requested: input.amount,
                available: existing.remaining().max(0),
            });
        };

        if input.action == OutcomeAction::Return {
            BatchService::increment_for_return(&mut tx, distribution.batch_id, input.amount)
                .await?;
        }

        tx.commit().await?;

        tracing::info!(
            distribution_id = %distribution.id,
            action = ?input.action,
            amount = input.amount,
            "outcome recorded"
        );

        Ok(distribution)
    }

    /// Administrative override of sold and returned counters, for fixing
    /// data-entry mistakes.
    ///
    /// The new values are absolute, not additive. Increasing the returned
    /// quantity credits the delta back to the batch; decreasing it is
    /// rejected, since the earlier batch credit may already have been
    /// distributed again and cannot be safely reversed.
    pub async fn admin_correct(
        &self,
        distribution_id: Uuid,
        input: AdminCorrectInput,
    ) -> AppResult<Distribution> {
        if input.sold_quantity < 0 || input.returned_quantity < 0 {
            return Err(AppError::Validation {
                field: "sold_quantity".to_string(),
                message: "Corrected quantities must not be negative".to_string(),
                message_id: "Jumlah koreksi tidak boleh negatif".to_string(),
            });
        }

        let mut tx = self.db.begin().await?;

        let existing = sqlx::query_as::<_, Distribution>(&format!(
            "SELECT {DISTRIBUTION_COLUMNS} FROM distributions WHERE id = $1 FOR UPDATE",
        ))
        .bind(distribution_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Distribution".to_string()))?;

        if input.returned_quantity < existing.returned_quantity {
            return Err(AppError::Validation {
                field: "returned_quantity".to_string(),
                message: "Decreasing a recorded return is not supported".to_string(),
                message_id: "Pengurangan retur yang sudah tercatat tidak didukung".to_string(),
            });
        }

        let accounted =
            input.sold_quantity + input.returned_quantity + existing.rejected_quantity;
        if accounted > existing.quantity {
            return Err(AppError::InsufficientStock {
                requested: accounted,
                available: existing.quantity,
            });
        }

        let return_delta = input.returned_quantity - existing.returned_quantity;
        if return_delta > 0 {
            BatchService::increment_for_return(&mut tx, existing.batch_id, return_delta).await?;
        }

        let updated = sqlx::query_as::<_, Distribution>(&format!(
            r#"
            UPDATE distributions
            SET sold_quantity = $2, returned_quantity = $3, notes = COALESCE($4, notes)
            WHERE id = $1
            RETURNING {DISTRIBUTION_COLUMNS}
            "#,
        ))
        .bind(distribution_id)
        .bind(input.sold_quantity)
        .bind(input.returned_quantity)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(distribution_id = %updated.id, "administrative correction applied");

        Ok(updated)
    }

    /// Get a single distribution
    pub async fn get_distribution(&self, distribution_id: Uuid) -> AppResult<Distribution> {
        let distribution = sqlx::query_as::<_, Distribution>(&format!(
            "SELECT {DISTRIBUTION_COLUMNS} FROM distributions WHERE id = $1",
        ))
        .bind(distribution_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Distribution".to_string()))?;

        Ok(distribution)
    }

    /// List distributions that still have unaccounted quantity, across all
    /// dates, optionally filtered by rider
    pub async fn list_open(&self, rider_id: Option<Uuid>) -> AppResult<Vec<Distribution>> {
        let distributions = sqlx::query_as::<_, Distribution>(&format!(
            r#"
            SELECT {DISTRIBUTION_COLUMNS}
            FROM distributions
            WHERE quantity - sold_quantity - returned_quantity - rejected_quantity > 0
              AND ($1::uuid IS NULL OR rider_id = $1)
            ORDER BY distributed_at DESC
            "#,
        ))
        .bind(rider_id)
        .fetch_all(&self.db)
        .await?;

        Ok(distributions)
    }

    /// List all distributions, newest first
    pub async fn list_all(&self) -> AppResult<Vec<Distribution>> {
        let distributions = sqlx::query_as::<_, Distribution>(&format!(
            "SELECT {DISTRIBUTION_COLUMNS} FROM distributions ORDER BY distributed_at DESC",
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(distributions)
    }

    /// List distributions within an inclusive day-granularity window
    pub async fn list_by_date_window(&self, range: &DateRange) -> AppResult<Vec<Distribution>> {
        let (start, end) = window_bounds(range);

        let distributions = sqlx::query_as::<_, Distribution>(&format!(
            r#"
            SELECT {DISTRIBUTION_COLUMNS}
            FROM distributions
            WHERE distributed_at >= $1 AND distributed_at < $2
            ORDER BY distributed_at DESC
            "#,
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.db)
        .await?;

        Ok(distributions)
    }

    /// List all distributions for one rider, newest first
    pub async fn list_by_rider(&self, rider_id: Uuid) -> AppResult<Vec<Distribution>> {
        let distributions = sqlx::query_as::<_, Distribution>(&format!(
            r#"
            SELECT {DISTRIBUTION_COLUMNS}
            FROM distributions
            WHERE rider_id = $1
            ORDER BY distributed_at DESC
            "#,
        ))
        .bind(rider_id)
        .fetch_all(&self.db)
        .await?;

        Ok(distributions)
    }

    /// List distributions joined with rider and product names, optionally
    /// filtered by rider and date window. Feeds the reconciliation engine
    /// and the report assembler.
    pub async fn list_details(
        &self,
        rider_id: Option<Uuid>,
        window: Option<&DateRange>,
    ) -> AppResult<Vec<DistributionDetail>> {
        let bounds = window.map(window_bounds);
        let (start, end) = match bounds {
            Some((start, end)) => (Some(start), Some(end)),
            None => (None, None),
        };

        let details = sqlx::query_as::<_, DistributionDetail>(
            r#"
            SELECT d.id, d.rider_id, d.batch_id, d.quantity, d.distributed_at,
                   d.sold_quantity, d.returned_quantity, d.rejected_quantity,
                   d.rejected_at, d.notes,
                   r.name AS rider_name, p.id AS product_id, p.name AS product_name
            FROM distributions d
            JOIN riders r ON r.id = d.rider_id
            JOIN inventory_batches b ON b.id = d.batch_id
            JOIN products p ON p.id = b.product_id
            WHERE ($1::uuid IS NULL OR d.rider_id = $1)
              AND ($2::timestamptz IS NULL OR d.distributed_at >= $2)
              AND ($3::timestamptz IS NULL OR d.distributed_at < $3)
            ORDER BY d.distributed_at DESC
            "#,
        )
        .bind(rider_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.db)
        .await?;

        Ok(details)
    }

    async fn ensure_rider_exists(&self, rider_id: Uuid) -> AppResult<()> {
        let rider_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM riders WHERE id = $1)")
                .bind(rider_id)
                .fetch_one(&self.db)
                .await?;

        if !rider_exists {
            return Err(AppError::NotFound("Rider".to_string()));
        }

        Ok(())
    }
}

/// Convert an inclusive day range into half-open timestamp bounds
fn window_bounds(range: &DateRange) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = range.start.and_time(NaiveTime::MIN).and_utc();
    let end = (range.end + Duration::days(1)).and_time(NaiveTime::MIN).and_utc();
    (start, end)
}
