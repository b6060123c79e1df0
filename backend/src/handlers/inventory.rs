//! HTTP handlers for the inventory summary

use axum::{extract::State, Json};

use shared::ProductInventorySummary;

use crate::error::AppResult;
use crate::services::inventory::InventoryService;
use crate::AppState;

/// Per-product inventory summary
pub async fn inventory_summary(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ProductInventorySummary>>> {
    let service = InventoryService::new(state.db);
    let summaries = service.summarize().await?;
    Ok(Json(summaries))
}
