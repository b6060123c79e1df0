//! HTTP handlers for the distribution ledger

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use shared::DateRange;

use crate::error::{AppError, AppResult};
use crate::services::distribution::{
    AdminCorrectInput, AllocateInput, BulkAllocateInput, BulkAllocationOutcome,
    BundleAllocationOutcome, Distribution, DistributionService, RecordOutcomeInput,
};
use crate::AppState;

/// Query parameters for listing distributions
#[derive(Debug, Deserialize)]
pub struct ListDistributionsQuery {
    /// Single-day filter; takes precedence over start/end
    pub date: Option<NaiveDate>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub rider_id: Option<Uuid>,
}

/// Query parameters for listing open distributions
#[derive(Debug, Deserialize)]
pub struct OpenDistributionsQuery {
    pub rider_id: Option<Uuid>,
}

/// Body for bundle allocation
#[derive(Debug, Deserialize)]
pub struct BundleAllocateInput {
    pub rider_id: Uuid,
}

/// Allocate stock from one batch to a rider
pub async fn allocate(
    State(state): State<AppState>,
    Json(input): Json<AllocateInput>,
) -> AppResult<Json<Distribution>> {
    let service = DistributionService::new(state.db);
    let distribution = service.allocate(input).await?;
    Ok(Json(distribution))
}

/// Allocate the same quantity from several batches
pub async fn allocate_bulk(
    State(state): State<AppState>,
    Json(input): Json<BulkAllocateInput>,
) -> AppResult<Json<BulkAllocationOutcome>> {
    let service = DistributionService::new(state.db);
    let outcome = service.allocate_bulk(input).await?;
    Ok(Json(outcome))
}

/// Allocate the configured default bundle to a rider
pub async fn allocate_default_bundle(
    State(state): State<AppState>,
    Json(input): Json<BundleAllocateInput>,
) -> AppResult<Json<BundleAllocationOutcome>> {
    let policy = state.config.allocation.policy();
    let service = DistributionService::new(state.db);
    let outcome = service.allocate_default_bundle(input.rider_id, &policy).await?;
    Ok(Json(outcome))
}

/// List distributions, optionally filtered by day, date range, or rider
pub async fn list_distributions(
    State(state): State<AppState>,
    Query(query): Query<ListDistributionsQuery>,
) -> AppResult<Json<Vec<Distribution>>> {
    let service = DistributionService::new(state.db);

    let distributions = if let Some(date) = query.date {
        service.list_by_date_window(&DateRange::single_day(date)).await?
    } else if let (Some(start), Some(end)) = (query.start, query.end) {
        if end < start {
            return Err(AppError::Validation {
                field: "end".to_string(),
                message: "End date must not be before start date".to_string(),
                message_id: "Tanggal akhir tidak boleh sebelum tanggal mulai".to_string(),
            });
        }
        service.list_by_date_window(&DateRange::new(start, end)).await?
    } else if let Some(rider_id) = query.rider_id {
        service.list_by_rider(rider_id).await?
    } else {
        service.list_all().await?
    };

    Ok(Json(distributions))
}

/// List distributions with unaccounted quantity
pub async fn list_open_distributions(
    State(state): State<AppState>,
    Query(query): Query<OpenDistributionsQuery>,
) -> AppResult<Json<Vec<Distribution>>> {
    let service = DistributionService::new(state.db);
    let distributions = service.list_open(query.rider_id).await?;
    Ok(Json(distributions))
}

/// Get a single distribution
pub async fn get_distribution(
    State(state): State<AppState>,
    Path(distribution_id): Path<Uuid>,
) -> AppResult<Json<Distribution>> {
    let service = DistributionService::new(state.db);
    let distribution = service.get_distribution(distribution_id).await?;
    Ok(Json(distribution))
}

/// Record a rider-reported outcome
pub async fn record_outcome(
    State(state): State<AppState>,
    Path(distribution_id): Path<Uuid>,
    Json(input): Json<RecordOutcomeInput>,
) -> AppResult<Json<Distribution>> {
    let service = DistributionService::new(state.db);
    let distribution = service.record_outcome(distribution_id, input).await?;
    Ok(Json(distribution))
}

/// Apply an administrative correction to outcome counters
pub async fn admin_correct(
    State(state): State<AppState>,
    Path(distribution_id): Path<Uuid>,
    Json(input): Json<AdminCorrectInput>,
) -> AppResult<Json<Distribution>> {
    let service = DistributionService::new(state.db);
    let distribution = service.admin_correct(distribution_id, input).await?;
    Ok(Json(distribution))
}
