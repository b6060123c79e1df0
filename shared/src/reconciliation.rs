//! Reconciliation engine
//!
//! Pure derivation over distribution outcome counters: compares distributed
//! quantity against the accounted split (sold / returned / rejected) and
//! classifies each record. Never mutates anything; the backend feeds it from
//! the distribution ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome counters for a single distribution
#[derive(Debug, Clone, Copy)]
pub struct OutcomeCounts {
    pub quantity: i32,
    pub sold: i32,
    pub returned: i32,
    pub rejected: i32,
}

/// Classification of a reconciled distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconciliationStatus {
    /// Everything distributed is accounted for
    Complete,
    /// Some quantity is still with the rider
    Pending,
    /// Accounted exceeds distributed: a data-integrity violation that should
    /// be unreachable through normal operation, surfaced rather than corrected
    Mismatch,
}

/// Result of reconciling a single distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciliation {
    pub accounted: i32,
    /// Magnitude of the gap between distributed and accounted quantity
    pub unaccounted: i32,
    /// Rounded share of the distributed quantity that is accounted for
    pub accounting_percentage: i32,
    pub status: ReconciliationStatus,
}

/// Compute the reconciliation view of one distribution's counters
pub fn reconcile(counts: OutcomeCounts) -> Reconciliation {
    let accounted = counts.sold + counts.returned + counts.rejected;
    let gap = counts.quantity - accounted;

    let status = if gap > 0 {
        ReconciliationStatus::Pending
    } else if gap < 0 {
        ReconciliationStatus::Mismatch
    } else {
        ReconciliationStatus::Complete
    };

    let accounting_percentage = if counts.quantity > 0 {
        ((accounted as f64 / counts.quantity as f64) * 100.0).round() as i32
    } else {
        0
    };

    Reconciliation {
        accounted,
        unaccounted: gap.abs(),
        accounting_percentage,
        status,
    }
}

/// Reconciliation view of one distribution, enriched with reference names
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationItem {
    pub id: Uuid,
    pub batch_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub rider_id: Uuid,
    pub rider_name: String,
    pub distributed_quantity: i32,
    pub sold_quantity: i32,
    pub returned_quantity: i32,
    pub rejected_quantity: i32,
    pub unaccounted_quantity: i32,
    pub accounting_percentage: i32,
    pub status: ReconciliationStatus,
    pub distributed_at: DateTime<Utc>,
    pub notes: Option<String>,
}

/// Aggregate totals across a set of reconciliation items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationSummary {
    pub total_distributed: i64,
    pub total_sold: i64,
    pub total_returned: i64,
    pub total_rejected: i64,
    pub total_unaccounted: i64,
    pub complete_count: usize,
    pub pending_count: usize,
    pub mismatch_count: usize,
    /// Mean of per-item accounting percentages: every distribution weighs
    /// equally regardless of its size
    pub overall_accounting_percentage: i32,
}

/// Aggregate a collection of reconciliation items
pub fn summarize(items: &[ReconciliationItem]) -> ReconciliationSummary {
    let mut summary = ReconciliationSummary {
        total_distributed: 0,
        total_sold: 0,
        total_returned: 0,
        total_rejected: 0,
        total_unaccounted: 0,
        complete_count: 0,
        pending_count: 0,
        mismatch_count: 0,
        overall_accounting_percentage: 0,
    };

    let mut percentage_sum: i64 = 0;

    for item in items {
        summary.total_distributed += item.distributed_quantity as i64;
        summary.total_sold += item.sold_quantity as i64;
        summary.total_returned += item.returned_quantity as i64;
        summary.total_rejected += item.rejected_quantity as i64;
        summary.total_unaccounted += item.unaccounted_quantity as i64;
        percentage_sum += item.accounting_percentage as i64;

        match item.status {
            ReconciliationStatus::Complete => summary.complete_count += 1,
            ReconciliationStatus::Pending => summary.pending_count += 1,
            ReconciliationStatus::Mismatch => summary.mismatch_count += 1,
        }
    }

    if !items.is_empty() {
        summary.overall_accounting_percentage =
            (percentage_sum as f64 / items.len() as f64).round() as i32;
    }

    summary
}
