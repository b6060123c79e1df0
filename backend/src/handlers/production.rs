//! HTTP handlers for production planning

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::services::production::{ProductionPlan, ProductionService};
use crate::AppState;

/// Derive production needs for the whole catalog
pub async fn production_needs(State(state): State<AppState>) -> AppResult<Json<ProductionPlan>> {
    let policy = state.config.allocation.policy();
    let service = ProductionService::new(state.db, policy);
    let plan = service.production_needs().await?;
    Ok(Json(plan))
}
