//! HTTP handlers for the batch ledger

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::batch::{
    Batch, BatchService, BatchWithProduct, CreateBatchInput, DestroyBatchInput,
    WarehouseRejectInput,
};
use crate::AppState;

/// Record a new production batch
pub async fn create_batch(
    State(state): State<AppState>,
    Json(input): Json<CreateBatchInput>,
) -> AppResult<Json<Batch>> {
    let service = BatchService::new(state.db);
    let batch = service.create_batch(input).await?;
    Ok(Json(batch))
}

/// Get a single batch
pub async fn get_batch(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
) -> AppResult<Json<Batch>> {
    let service = BatchService::new(state.db);
    let batch = service.get_batch(batch_id).await?;
    Ok(Json(batch))
}

/// List all batches, oldest expiry first
pub async fn list_batches(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<BatchWithProduct>>> {
    let service = BatchService::new(state.db);
    let batches = service.list_batches().await?;
    Ok(Json(batches))
}

/// List batches eligible for allocation
pub async fn list_available_batches(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<BatchWithProduct>>> {
    let service = BatchService::new(state.db);
    let batches = service.list_available().await?;
    Ok(Json(batches))
}

/// Mark quantity as damaged in the warehouse
pub async fn warehouse_reject(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
    Json(input): Json<WarehouseRejectInput>,
) -> AppResult<Json<Batch>> {
    let service = BatchService::new(state.db);
    let batch = service.warehouse_reject(batch_id, input).await?;
    Ok(Json(batch))
}

/// Destroy a whole batch
pub async fn destroy_batch(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
    Json(input): Json<DestroyBatchInput>,
) -> AppResult<Json<Batch>> {
    let service = BatchService::new(state.db);
    let batch = service.destroy_batch(batch_id, &input.reason).await?;
    Ok(Json(batch))
}
