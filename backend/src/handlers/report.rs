//! HTTP handlers for daily reports

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::error::AppResult;
use crate::services::report::{DailyReport, ReportService};
use crate::AppState;

/// Query parameters for the daily report; defaults to today
#[derive(Debug, Deserialize)]
pub struct DailyReportQuery {
    pub date: Option<NaiveDate>,
}

/// Build the operational report for one day
pub async fn daily_report(
    State(state): State<AppState>,
    Query(query): Query<DailyReportQuery>,
) -> AppResult<Json<DailyReport>> {
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let service = ReportService::new(state.db);
    let report = service.daily_report(date).await?;
    Ok(Json(report))
}
