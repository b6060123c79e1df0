//! Batch ledger service for tracking dated production lots
//!
//! A batch's `current_quantity` only ever decreases (distribution, warehouse
//! rejection, destruction) except when a rider returns previously distributed
//! stock. All stock-reducing writes are conditional updates so concurrent
//! requests cannot race past the available quantity.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use shared::{
    destruction_note, validate_batch_dates, validate_name, validate_positive_quantity,
    ProductCategory, DESTRUCTION_MARKER,
};

use crate::error::{AppError, AppResult};
use crate::services::parse_category;

/// Batch ledger service
#[derive(Clone)]
pub struct BatchService {
    db: PgPool,
}

/// A dated production lot of one product
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Batch {
    pub id: Uuid,
    pub product_id: Uuid,
    pub production_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub initial_quantity: i32,
    pub current_quantity: i32,
    pub warehouse_rejected_quantity: i32,
    pub rejection_reason: Option<String>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Batch {
    /// Whether the batch's notes record a destruction event (terminal state)
    pub fn is_destroyed(&self) -> bool {
        shared::is_destroyed(self.notes.as_deref())
    }
}

/// Batch joined with its product's reference data
#[derive(Debug, Clone, Serialize)]
pub struct BatchWithProduct {
    #[serde(flatten)]
    pub batch: Batch,
    pub product_name: String,
    pub category: ProductCategory,
}

#[derive(Debug, FromRow)]
struct BatchWithProductRow {
    #[sqlx(flatten)]
    batch: Batch,
    product_name: String,
    category: String,
}

/// Input for creating a batch
#[derive(Debug, Deserialize)]
pub struct CreateBatchInput {
    pub product_id: Uuid,
    pub production_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub initial_quantity: i32,
    pub notes: Option<String>,
}

/// Input for marking stock damaged before distribution
#[derive(Debug, Deserialize)]
pub struct WarehouseRejectInput {
    pub amount: i32,
    pub reason: Option<String>,
}

/// Input for destroying a whole batch
#[derive(Debug, Deserialize)]
pub struct DestroyBatchInput {
    pub reason: String,
}

const BATCH_COLUMNS: &str = "id, product_id, production_date, expiry_date, initial_quantity, \
     current_quantity, warehouse_rejected_quantity, rejection_reason, rejected_at, notes, created_at";

impl BatchService {
    /// Create a new BatchService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a new production batch with full stock available
    pub async fn create_batch(&self, input: CreateBatchInput) -> AppResult<Batch> {
        if let Err(msg) = validate_positive_quantity(input.initial_quantity) {
            return Err(AppError::Validation {
                field: "initial_quantity".to_string(),
                message: msg.to_string(),
                message_id: "Jumlah produksi harus lebih dari nol".to_string(),
            });
        }
        if let Err(msg) = validate_batch_dates(input.production_date, input.expiry_date) {
            return Err(AppError::Validation {
                field: "expiry_date".to_string(),
                message: msg.to_string(),
                message_id: "Tanggal kedaluwarsa tidak boleh sebelum tanggal produksi".to_string(),
            });
        }

        // Check the product reference up front so a missing product surfaces
        // as a friendly message instead of a raw constraint error
        let product_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                .bind(input.product_id)
                .fetch_one(&self.db)
                .await?;

        if !product_exists {
            return Err(AppError::NotFound("Product".to_string()));
        }

        let batch = sqlx::query_as::<_, Batch>(&format!(
            r#"
            INSERT INTO inventory_batches
                (product_id, production_date, expiry_date, initial_quantity, current_quantity, notes)
            VALUES ($1, $2, $3, $4, $4, $5)
            RETURNING {BATCH_COLUMNS}
            "#,
        ))
        .bind(input.product_id)
        .bind(input.production_date)
        .bind(input.expiry_date)
        .bind(input.initial_quantity)
        .bind(&input.notes)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(batch_id = %batch.id, quantity = batch.initial_quantity, "batch created");

        Ok(batch)
    }

    /// Get a single batch
    pub async fn get_batch(&self, batch_id: Uuid) -> AppResult<Batch> {
        let batch = sqlx::query_as::<_, Batch>(&format!(
            "SELECT {BATCH_COLUMNS} FROM inventory_batches WHERE id = $1",
        ))
        .bind(batch_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Batch".to_string()))?;

        Ok(batch)
    }

    /// List all batches joined with product data, oldest expiry first
    pub async fn list_batches(&self) -> AppResult<Vec<BatchWithProduct>> {
        let rows = sqlx::query_as::<_, BatchWithProductRow>(
            r#"
            SELECT b.id, b.product_id, b.production_date, b.expiry_date, b.initial_quantity,
                   b.current_quantity, b.warehouse_rejected_quantity, b.rejection_reason,
                   b.rejected_at, b.notes, b.created_at,
                   p.name AS product_name, p.category
            FROM inventory_batches b
            JOIN products p ON p.id = b.product_id
            ORDER BY b.expiry_date ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(Self::with_product).collect()
    }

    /// List batches eligible for allocation: stock remaining, not destroyed,
    /// oldest expiry first (FEFO)
    pub async fn list_available(&self) -> AppResult<Vec<BatchWithProduct>> {
        let rows = sqlx::query_as::<_, BatchWithProductRow>(
            r#"
            SELECT b.id, b.product_id, b.production_date, b.expiry_date, b.initial_quantity,
                   b.current_quantity, b.warehouse_rejected_quantity, b.rejection_reason,
                   b.rejected_at, b.notes, b.created_at,
                   p.name AS product_name, p.category
            FROM inventory_batches b
            JOIN products p ON p.id = b.product_id
            WHERE b.current_quantity > 0
              AND (b.notes IS NULL OR b.notes NOT LIKE $1)
            ORDER BY b.expiry_date ASC
            "#,
        )
        .bind(destroyed_pattern())
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(Self::with_product).collect()
    }

    /// Mark quantity as damaged before it ever left the warehouse
    pub async fn warehouse_reject(
        &self,
        batch_id: Uuid,
        input: WarehouseRejectInput,
    ) -> AppResult<Batch> {
        if let Err(msg) = validate_positive_quantity(input.amount) {
            return Err(AppError::Validation {
                field: "amount".to_string(),
                message: msg.to_string(),
                message_id: "Jumlah harus lebih dari nol".to_string(),
            });
        }

        let updated = sqlx::query_as::<_, Batch>(&format!(
            r#"
            UPDATE inventory_batches
            SET warehouse_rejected_quantity = warehouse_rejected_quantity + $2,
                current_quantity = current_quantity - $2,
                rejection_reason = COALESCE($3, rejection_reason),
                rejected_at = NOW()
            WHERE id = $1 AND current_quantity >= $2
            RETURNING {BATCH_COLUMNS}
            "#,
        ))
        .bind(batch_id)
        .bind(input.amount)
        .bind(&input.reason)
        .fetch_optional(&self.db)
        .await?;

        match updated {
            Some(batch) => {
                tracing::info!(batch_id = %batch.id, amount = input.amount, "warehouse rejection recorded");
                Ok(batch)
            }
            None => {
                let batch = self.get_batch(batch_id).await?;
                Err(AppError::InsufficientStock {
                    requested: input.amount,
                    available: batch.current_quantity,
                })
            }
        }
    }

    /// Destroy a whole batch: stock drops to zero and the destruction marker
    /// is prefixed to `notes`, permanently excluding the batch from
    /// allocation. Prior notes are kept for the audit trail. Irreversible.
    pub async fn destroy_batch(&self, batch_id: Uuid, reason: &str) -> AppResult<Batch> {
        if let Err(msg) = validate_name(reason) {
            return Err(AppError::Validation {
                field: "reason".to_string(),
                message: msg.to_string(),
                message_id: "Alasan pemusnahan harus diisi".to_string(),
            });
        }

        let updated = sqlx::query_as::<_, Batch>(&format!(
            r#"
            UPDATE inventory_batches
            SET current_quantity = 0, notes = $2 || COALESCE(' | ' || notes, '')
            WHERE id = $1 AND (notes IS NULL OR notes NOT LIKE $3)
            RETURNING {BATCH_COLUMNS}
            "#,
        ))
        .bind(batch_id)
        .bind(destruction_note(reason.trim()))
        .bind(destroyed_pattern())
        .fetch_optional(&self.db)
        .await?;

        match updated {
            Some(batch) => {
                tracing::info!(batch_id = %batch.id, reason = reason.trim(), "batch destroyed");
                Ok(batch)
            }
            None => {
                // Either the batch does not exist or it was already destroyed
                let batch = self.get_batch(batch_id).await?;
                Err(AppError::Validation {
                    field: "batch_id".to_string(),
                    message: format!("Batch {} is already destroyed", batch.id),
                    message_id: "Batch sudah dimusnahkan".to_string(),
                })
            }
        }
    }

    /// Take `amount` out of a batch for distribution. Runs inside the
    /// caller's transaction; the conditional update closes the
    /// check-then-act race on `current_quantity`.
    pub(crate) async fn decrement_for_distribution(
        conn: &mut PgConnection,
        batch_id: Uuid,
        amount: i32,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE inventory_batches
            SET current_quantity = current_quantity - $2
            WHERE id = $1 AND current_quantity >= $2
              AND (notes IS NULL OR notes NOT LIKE $3)
            "#,
        )
        .bind(batch_id)
        .bind(amount)
        .bind(destroyed_pattern())
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        // Zero rows affected: diagnose which invariant blocked the update
        let row = sqlx::query_as::<_, (i32, Option<String>)>(
            "SELECT current_quantity, notes FROM inventory_batches WHERE id = $1",
        )
        .bind(batch_id)
        .fetch_optional(&mut *conn)
        .await?;

        match row {
            None => Err(AppError::NotFound("Batch".to_string())),
            Some((_, notes)) if shared::is_destroyed(notes.as_deref()) => {
                Err(AppError::Validation {
                    field: "batch_id".to_string(),
                    message: "Batch has been destroyed".to_string(),
                    message_id: "Batch sudah dimusnahkan".to_string(),
                })
            }
            Some((available, _)) => Err(AppError::InsufficientStock {
                requested: amount,
                available,
            }),
        }
    }

    /// Credit returned stock back to its source batch. Runs inside the
    /// caller's transaction.
    pub(crate) async fn increment_for_return(
        conn: &mut PgConnection,
        batch_id: Uuid,
        amount: i32,
    ) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE inventory_batches SET current_quantity = current_quantity + $2 WHERE id = $1",
        )
        .bind(batch_id)
        .bind(amount)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Batch".to_string()));
        }

        Ok(())
    }

    fn with_product(row: BatchWithProductRow) -> AppResult<BatchWithProduct> {
        Ok(BatchWithProduct {
            category: parse_category(&row.category)?,
            product_name: row.product_name,
            batch: row.batch,
        })
    }
}

/// LIKE pattern matching notes that start with the destruction marker
fn destroyed_pattern() -> String {
    format!("{}%", DESTRUCTION_MARKER)
}
