//! Inventory summary aggregator
//!
//! Joins the batch ledger and the distribution ledger per product. Grouping
//! is seeded from batches: a product with no batch never appears in the
//! output, even if stray distribution rows reference it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::types::ProductCategory;

/// Stock view of one batch, as read from the batch ledger
#[derive(Debug, Clone)]
pub struct BatchStock {
    pub batch_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub category: ProductCategory,
    pub current_quantity: i32,
    pub warehouse_rejected_quantity: i32,
}

/// Outcome counters of one distribution, keyed back to its batch
#[derive(Debug, Clone)]
pub struct DistributionTotals {
    pub batch_id: Uuid,
    pub quantity: i32,
    pub sold_quantity: i32,
    pub returned_quantity: i32,
    pub rejected_quantity: i32,
}

/// Per-product inventory summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInventorySummary {
    pub product_id: Uuid,
    pub product_name: String,
    pub category: ProductCategory,
    /// Sum of current batch quantities (warehouse stock)
    pub total_in_inventory: i32,
    pub total_warehouse_rejected: i32,
    pub total_distributed: i32,
    pub total_sold: i32,
    pub total_returned: i32,
    pub total_rejected: i32,
    /// Quantity physically with riders: distributed minus every accounted bucket
    pub in_rider: i32,
    pub batch_count: usize,
}

/// Aggregate batches and distributions into per-product summaries.
///
/// Output order follows the first appearance of each product in `batches`,
/// so feeding batches in FEFO order yields a stable, expiry-driven listing.
pub fn summarize_inventory(
    batches: &[BatchStock],
    distributions: &[DistributionTotals],
) -> Vec<ProductInventorySummary> {
    let mut summaries: Vec<ProductInventorySummary> = Vec::new();
    let mut index_by_product: HashMap<Uuid, usize> = HashMap::new();
    let mut product_by_batch: HashMap<Uuid, Uuid> = HashMap::new();

    for batch in batches {
        product_by_batch.insert(batch.batch_id, batch.product_id);

        let idx = *index_by_product.entry(batch.product_id).or_insert_with(|| {
            summaries.push(ProductInventorySummary {
                product_id: batch.product_id,
                product_name: batch.product_name.clone(),
                category: batch.category,
                total_in_inventory: 0,
                total_warehouse_rejected: 0,
                total_distributed: 0,
                total_sold: 0,
                total_returned: 0,
                total_rejected: 0,
                in_rider: 0,
                batch_count: 0,
            });
            summaries.len() - 1
        });

        let summary = &mut summaries[idx];
        summary.total_in_inventory += batch.current_quantity;
        summary.total_warehouse_rejected += batch.warehouse_rejected_quantity;
        summary.batch_count += 1;
    }

    for dist in distributions {
        let Some(product_id) = product_by_batch.get(&dist.batch_id) else {
            continue;
        };
        let Some(&idx) = index_by_product.get(product_id) else {
            continue;
        };

        let summary = &mut summaries[idx];
        summary.total_distributed += dist.quantity;
        summary.total_sold += dist.sold_quantity;
        summary.total_returned += dist.returned_quantity;
        summary.total_rejected += dist.rejected_quantity;
    }

    for summary in &mut summaries {
        summary.in_rider = summary.total_distributed
            - summary.total_sold
            - summary.total_returned
            - summary.total_rejected;
    }

    summaries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(product: Uuid, name: &str, current: i32) -> BatchStock {
        BatchStock {
            batch_id: Uuid::new_v4(),
            product_id: product,
            product_name: name.to_string(),
            category: ProductCategory::Primary,
            current_quantity: current,
            warehouse_rejected_quantity: 0,
        }
    }

    #[test]
    fn test_grouping_seeded_from_batches() {
        let product_a = Uuid::new_v4();
        let product_b = Uuid::new_v4();

        let batches = vec![
            batch(product_a, "Kopi Aren", 10),
            batch(product_b, "Matcha", 5),
            batch(product_a, "Kopi Aren", 7),
        ];

        let summaries = summarize_inventory(&batches, &[]);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].product_id, product_a);
        assert_eq!(summaries[0].total_in_inventory, 17);
        assert_eq!(summaries[0].batch_count, 2);
        assert_eq!(summaries[1].total_in_inventory, 5);
    }

    #[test]
    fn test_distribution_totals_joined_through_batch() {
        let product = Uuid::new_v4();
        let b = batch(product, "Kopi Aren", 20);
        let batch_id = b.batch_id;

        let distributions = vec![
            DistributionTotals {
                batch_id,
                quantity: 10,
                sold_quantity: 6,
                returned_quantity: 1,
                rejected_quantity: 1,
            },
            DistributionTotals {
                batch_id,
                quantity: 5,
                sold_quantity: 0,
                returned_quantity: 0,
                rejected_quantity: 0,
            },
        ];

        let summaries = summarize_inventory(&[b], &distributions);
        assert_eq!(summaries.len(), 1);
        let s = &summaries[0];
        assert_eq!(s.total_distributed, 15);
        assert_eq!(s.total_sold, 6);
        assert_eq!(s.total_returned, 1);
        assert_eq!(s.total_rejected, 1);
        assert_eq!(s.in_rider, 7);
    }

    #[test]
    fn test_orphan_distribution_is_ignored() {
        let product = Uuid::new_v4();
        let b = batch(product, "Taro", 8);

        let stray = DistributionTotals {
            batch_id: Uuid::new_v4(),
            quantity: 99,
            sold_quantity: 0,
            returned_quantity: 0,
            rejected_quantity: 0,
        };

        let summaries = summarize_inventory(&[b], &[stray]);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].total_distributed, 0);
    }
}
