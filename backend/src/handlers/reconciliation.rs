//! HTTP handlers for reconciliation views

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use shared::{DateRange, ReconciliationItem, ReconciliationSummary, ReportWindow};

use crate::error::{AppError, AppResult};
use crate::services::reconciliation::ReconciliationService;
use crate::AppState;

/// Query parameters shared by the reconciliation endpoints.
///
/// An explicit start/end pair takes precedence over the named window; with
/// neither present the view covers all time.
#[derive(Debug, Deserialize)]
pub struct ReconciliationQuery {
    pub rider_id: Option<Uuid>,
    /// One of "daily", "weekly", "monthly", "yearly"
    pub window: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl ReconciliationQuery {
    fn resolve_window(&self) -> AppResult<Option<DateRange>> {
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if end < start {
                return Err(AppError::Validation {
                    field: "end".to_string(),
                    message: "End date must not be before start date".to_string(),
                    message_id: "Tanggal akhir tidak boleh sebelum tanggal mulai".to_string(),
                });
            }
            return Ok(Some(DateRange::new(start, end)));
        }

        match &self.window {
            None => Ok(None),
            Some(key) => {
                let window = ReportWindow::from_key(key).ok_or_else(|| AppError::Validation {
                    field: "window".to_string(),
                    message: format!("Unknown window: {}", key),
                    message_id: format!("Periode tidak dikenal: {}", key),
                })?;
                Ok(Some(window.resolve(Utc::now().date_naive())))
            }
        }
    }
}

/// Per-distribution reconciliation rows
pub async fn reconciliation_report(
    State(state): State<AppState>,
    Query(query): Query<ReconciliationQuery>,
) -> AppResult<Json<Vec<ReconciliationItem>>> {
    let window = query.resolve_window()?;
    let service = ReconciliationService::new(state.db);
    let items = service.report(query.rider_id, window.as_ref()).await?;
    Ok(Json(items))
}

/// Aggregate reconciliation summary
pub async fn reconciliation_summary(
    State(state): State<AppState>,
    Query(query): Query<ReconciliationQuery>,
) -> AppResult<Json<ReconciliationSummary>> {
    let window = query.resolve_window()?;
    let service = ReconciliationService::new(state.db);
    let summary = service.summary(query.rider_id, window.as_ref()).await?;
    Ok(Json(summary))
}
