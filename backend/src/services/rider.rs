//! Rider roster service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::{validate_indonesian_phone, validate_name};

use crate::error::{AppError, AppResult};

/// Rider roster service
#[derive(Clone)]
pub struct RiderService {
    db: PgPool,
}

/// A field sales rider who receives distributed stock
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Rider {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for registering a rider
#[derive(Debug, Deserialize)]
pub struct CreateRiderInput {
    pub name: String,
    pub phone: Option<String>,
}

impl RiderService {
    /// Create a new RiderService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Register a rider on the roster
    pub async fn create_rider(&self, input: CreateRiderInput) -> AppResult<Rider> {
        if let Err(msg) = validate_name(&input.name) {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: msg.to_string(),
                message_id: "Nama rider harus diisi".to_string(),
            });
        }
        if let Some(phone) = &input.phone {
            if let Err(msg) = validate_indonesian_phone(phone) {
                return Err(AppError::Validation {
                    field: "phone".to_string(),
                    message: msg.to_string(),
                    message_id: "Nomor telepon tidak valid".to_string(),
                });
            }
        }

        let rider = sqlx::query_as::<_, Rider>(
            r#"
            INSERT INTO riders (name, phone)
            VALUES ($1, $2)
            RETURNING id, name, phone, created_at
            "#,
        )
        .bind(input.name.trim())
        .bind(&input.phone)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(rider_id = %rider.id, name = %rider.name, "rider registered");

        Ok(rider)
    }

    /// Get a single rider
    pub async fn get_rider(&self, rider_id: Uuid) -> AppResult<Rider> {
        let rider = sqlx::query_as::<_, Rider>(
            "SELECT id, name, phone, created_at FROM riders WHERE id = $1",
        )
        .bind(rider_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Rider".to_string()))?;

        Ok(rider)
    }

    /// List the roster, alphabetical
    pub async fn list_riders(&self) -> AppResult<Vec<Rider>> {
        let riders = sqlx::query_as::<_, Rider>(
            "SELECT id, name, phone, created_at FROM riders ORDER BY name",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(riders)
    }

    /// Remove a rider. Their distribution history is removed with them.
    pub async fn delete_rider(&self, rider_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM riders WHERE id = $1")
            .bind(rider_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Rider".to_string()));
        }

        tracing::info!(rider_id = %rider_id, "rider removed");

        Ok(())
    }

    /// Number of riders currently on the roster
    pub async fn count(&self) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM riders")
            .fetch_one(&self.db)
            .await?;

        Ok(count)
    }
}
