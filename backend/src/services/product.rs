//! Product catalog service

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::{validate_name, ProductCategory};

use crate::error::{AppError, AppResult};
use crate::services::parse_category;

/// Product catalog service
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

/// A catalog entry: something the operation produces and distributes
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub category: ProductCategory,
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    category: String,
    price: Decimal,
    created_at: DateTime<Utc>,
}

/// Input for creating a product
#[derive(Debug, Deserialize)]
pub struct CreateProductInput {
    pub name: String,
    pub category: ProductCategory,
    pub price: Option<Decimal>,
}

/// Input for updating a product; unset fields keep their current value
#[derive(Debug, Deserialize)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub category: Option<ProductCategory>,
    pub price: Option<Decimal>,
}

impl ProductService {
    /// Create a new ProductService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Add a product to the catalog
    pub async fn create_product(&self, input: CreateProductInput) -> AppResult<Product> {
        if let Err(msg) = validate_name(&input.name) {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: msg.to_string(),
                message_id: "Nama produk harus diisi".to_string(),
            });
        }

        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            INSERT INTO products (name, category, price)
            VALUES ($1, $2, $3)
            RETURNING id, name, category, price, created_at
            "#,
        )
        .bind(input.name.trim())
        .bind(input.category.as_str())
        .bind(input.price.unwrap_or_default())
        .fetch_one(&self.db)
        .await?;

        tracing::info!(product_id = %row.id, name = %row.name, "product created");

        Self::from_row(row)
    }

    /// Get a single product
    pub async fn get_product(&self, product_id: Uuid) -> AppResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, category, price, created_at FROM products WHERE id = $1",
        )
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        Self::from_row(row)
    }

    /// List the whole catalog, alphabetical
    pub async fn list_products(&self) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, category, price, created_at FROM products ORDER BY name",
        )
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(Self::from_row).collect()
    }

    /// Update a product; unset fields are left unchanged
    pub async fn update_product(
        &self,
        product_id: Uuid,
        input: UpdateProductInput,
    ) -> AppResult<Product> {
        if let Some(name) = &input.name {
            if let Err(msg) = validate_name(name) {
                return Err(AppError::Validation {
                    field: "name".to_string(),
                    message: msg.to_string(),
                    message_id: "Nama produk harus diisi".to_string(),
                });
            }
        }

        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            UPDATE products
            SET name = COALESCE($2, name),
                category = COALESCE($3, category),
                price = COALESCE($4, price)
            WHERE id = $1
            RETURNING id, name, category, price, created_at
            "#,
        )
        .bind(product_id)
        .bind(input.name.as_deref().map(str::trim))
        .bind(input.category.map(|c| c.as_str()))
        .bind(input.price)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        Self::from_row(row)
    }

    /// Remove a product. Fails with a conflict while batches still reference
    /// it, so ledger history is never orphaned.
    pub async fn delete_product(&self, product_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(product_id)
            .execute(&self.db)
            .await;

        match result {
            Ok(done) if done.rows_affected() == 0 => {
                Err(AppError::NotFound("Product".to_string()))
            }
            Ok(_) => {
                tracing::info!(product_id = %product_id, "product deleted");
                Ok(())
            }
            Err(err) if is_foreign_key_violation(&err) => Err(AppError::Conflict {
                resource: "product".to_string(),
                message: "Product still has batches and cannot be deleted".to_string(),
                message_id: "Produk masih memiliki batch dan tidak dapat dihapus".to_string(),
            }),
            Err(err) => Err(err.into()),
        }
    }

    fn from_row(row: ProductRow) -> AppResult<Product> {
        Ok(Product {
            category: parse_category(&row.category)?,
            id: row.id,
            name: row.name,
            price: row.price,
            created_at: row.created_at,
        })
    }
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(
        err.as_database_error().and_then(|db| db.code()),
        Some(code) if code == "23503"
    )
}
