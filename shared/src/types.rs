//! Common types used across the platform

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Product category: primary products are counted as cups, add-ons are not
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    Primary,
    Addon,
}

impl ProductCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Primary => "primary",
            ProductCategory::Addon => "addon",
        }
    }
}

impl std::str::FromStr for ProductCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "primary" => Ok(ProductCategory::Primary),
            "addon" => Ok(ProductCategory::Addon),
            other => Err(format!("unknown product category: {}", other)),
        }
    }
}

/// Marker token recorded in a batch's notes when the batch is destroyed.
/// A batch carrying this marker is terminal and excluded from allocation.
pub const DESTRUCTION_MARKER: &str = "[DESTROYED]";

/// Format the notes entry for a destroyed batch
pub fn destruction_note(reason: &str) -> String {
    format!("{} {}", DESTRUCTION_MARKER, reason)
}

/// Check whether a batch's notes record a destruction event
pub fn is_destroyed(notes: Option<&str>) -> bool {
    notes.is_some_and(|n| n.starts_with(DESTRUCTION_MARKER))
}

/// Inclusive date range at day granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn single_day(date: NaiveDate) -> Self {
        Self { start: date, end: date }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Aggregation window for reports and reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportWindow {
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Custom(DateRange),
}

impl ReportWindow {
    /// Parse one of the fixed window keys ("daily", "weekly", ...)
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "daily" => Some(ReportWindow::Daily),
            "weekly" => Some(ReportWindow::Weekly),
            "monthly" => Some(ReportWindow::Monthly),
            "yearly" => Some(ReportWindow::Yearly),
            _ => None,
        }
    }

    /// Resolve the window to an inclusive date range ending on `today`.
    ///
    /// Weekly covers the last 7 days; monthly and yearly run from the first
    /// day of the current month/year through `today`.
    pub fn resolve(&self, today: NaiveDate) -> DateRange {
        match self {
            ReportWindow::Daily => DateRange::single_day(today),
            ReportWindow::Weekly => DateRange::new(today - Duration::days(6), today),
            ReportWindow::Monthly => {
                DateRange::new(today.with_day(1).unwrap_or(today), today)
            }
            ReportWindow::Yearly => {
                let start = NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today);
                DateRange::new(start, today)
            }
            ReportWindow::Custom(range) => *range,
        }
    }
}
