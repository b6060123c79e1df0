//! HTTP handlers for the rider roster

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::rider::{CreateRiderInput, Rider, RiderService};
use crate::AppState;

/// Register a rider
pub async fn create_rider(
    State(state): State<AppState>,
    Json(input): Json<CreateRiderInput>,
) -> AppResult<Json<Rider>> {
    let service = RiderService::new(state.db);
    let rider = service.create_rider(input).await?;
    Ok(Json(rider))
}

/// Get a single rider
pub async fn get_rider(
    State(state): State<AppState>,
    Path(rider_id): Path<Uuid>,
) -> AppResult<Json<Rider>> {
    let service = RiderService::new(state.db);
    let rider = service.get_rider(rider_id).await?;
    Ok(Json(rider))
}

/// List the roster
pub async fn list_riders(State(state): State<AppState>) -> AppResult<Json<Vec<Rider>>> {
    let service = RiderService::new(state.db);
    let riders = service.list_riders().await?;
    Ok(Json(riders))
}

/// Remove a rider
pub async fn delete_rider(
    State(state): State<AppState>,
    Path(rider_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = RiderService::new(state.db);
    service.delete_rider(rider_id).await?;
    Ok(Json(()))
}
