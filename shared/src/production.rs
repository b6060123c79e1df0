//! Production needs planner
//!
//! Stateless derivation over the inventory summary plus the rider count and
//! an allocation policy: how much of each product must be produced to cover
//! rider allocation plus a warehouse buffer.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::types::ProductCategory;

/// Units allocated per rider for each product, with a fallback for add-ons
/// that are not listed explicitly
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationPolicy {
    /// Product name -> units per rider
    pub per_rider: HashMap<String, i32>,
    /// Fallback allocation for add-ons not listed in `per_rider`
    pub addon_default: i32,
    /// Minimum warehouse buffer after distribution
    pub buffer_min: i32,
    /// Buffer as a share of total allocation
    pub buffer_percent: f64,
}

impl Default for AllocationPolicy {
    fn default() -> Self {
        let per_rider = HashMap::from([
            ("Kopi Aren".to_string(), 30),
            ("Matcha".to_string(), 5),
            ("Bubblegum".to_string(), 5),
            ("Taro".to_string(), 5),
            ("Coklat".to_string(), 5),
        ]);
        Self {
            per_rider,
            addon_default: 5,
            buffer_min: 20,
            buffer_percent: 0.15,
        }
    }
}

impl AllocationPolicy {
    /// Units per rider for a product. Unlisted primary products get 0;
    /// unlisted add-ons fall back to the add-on default.
    pub fn allocation_for(&self, product_name: &str, category: ProductCategory) -> i32 {
        match self.per_rider.get(product_name) {
            Some(&units) => units,
            None => match category {
                ProductCategory::Primary => 0,
                ProductCategory::Addon => self.addon_default,
            },
        }
    }
}

/// Stock status of a product relative to its production target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    Low,
    Balanced,
    Surplus,
}

impl StockStatus {
    fn sort_rank(&self) -> u8 {
        match self {
            StockStatus::Low => 0,
            StockStatus::Balanced => 1,
            StockStatus::Surplus => 2,
        }
    }
}

/// Current stock of one product, as fed by the inventory summary
#[derive(Debug, Clone)]
pub struct ProductStock {
    pub product_id: Uuid,
    pub product_name: String,
    pub category: ProductCategory,
    pub current_stock: i32,
}

/// Production requirement for one product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionNeed {
    pub product_id: Uuid,
    pub product_name: String,
    pub category: ProductCategory,
    pub current_stock: i32,
    pub allocation_per_rider: i32,
    pub total_allocation: i32,
    pub buffer_target: i32,
    pub total_needed: i32,
    pub needed: i32,
    pub stock_after_distribution: i32,
    pub status: StockStatus,
}

/// Factor above which stock counts as surplus relative to the target
const SURPLUS_FACTOR: f64 = 1.3;

/// Derive production needs for every product.
///
/// Sorted low before balanced before surplus; within a status, descending
/// `needed`.
pub fn plan_production_needs(
    products: &[ProductStock],
    rider_count: i32,
    policy: &AllocationPolicy,
) -> Vec<ProductionNeed> {
    let mut needs: Vec<ProductionNeed> = products
        .iter()
        .map(|product| {
            let allocation_per_rider =
                policy.allocation_for(&product.product_name, product.category);
            let total_allocation = allocation_per_rider * rider_count;

            let buffer_target = policy
                .buffer_min
                .max((total_allocation as f64 * policy.buffer_percent).ceil() as i32);
            let total_needed = total_allocation + buffer_target;
            let needed = (total_needed - product.current_stock).max(0);
            let stock_after_distribution = (product.current_stock - total_allocation).max(0);

            let status = if needed > 0 {
                StockStatus::Low
            } else if product.current_stock as f64 > total_needed as f64 * SURPLUS_FACTOR {
                StockStatus::Surplus
            } else {
                StockStatus::Balanced
            };

            ProductionNeed {
                product_id: product.product_id,
                product_name: product.product_name.clone(),
                category: product.category,
                current_stock: product.current_stock,
                allocation_per_rider,
                total_allocation,
                buffer_target,
                total_needed,
                needed,
                stock_after_distribution,
                status,
            }
        })
        .collect();

    needs.sort_by(|a, b| {
        a.status
            .sort_rank()
            .cmp(&b.status.sort_rank())
            .then(b.needed.cmp(&a.needed))
    });

    needs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stock(name: &str, category: ProductCategory, current: i32) -> ProductStock {
        ProductStock {
            product_id: Uuid::new_v4(),
            product_name: name.to_string(),
            category,
            current_stock: current,
        }
    }

    #[test]
    fn test_policy_fallbacks() {
        let policy = AllocationPolicy::default();
        assert_eq!(policy.allocation_for("Kopi Aren", ProductCategory::Primary), 30);
        assert_eq!(policy.allocation_for("Matcha", ProductCategory::Primary), 5);
        // Unlisted primary products are not allocated by default
        assert_eq!(policy.allocation_for("Es Jeruk", ProductCategory::Primary), 0);
        // Unlisted add-ons fall back to the add-on default
        assert_eq!(policy.allocation_for("Boba", ProductCategory::Addon), 5);
    }

    #[test]
    fn test_needed_calculation() {
        let policy = AllocationPolicy {
            per_rider: HashMap::from([("Kopi Aren".to_string(), 30)]),
            ..AllocationPolicy::default()
        };

        let needs = plan_production_needs(
            &[stock("Kopi Aren", ProductCategory::Primary, 50)],
            4,
            &policy,
        );

        assert_eq!(needs.len(), 1);
        let need = &needs[0];
        assert_eq!(need.total_allocation, 120);
        // ceil(120 * 0.15) = 18, floored by the minimum of 20
        assert_eq!(need.buffer_target, 20);
        assert_eq!(need.total_needed, 140);
        assert_eq!(need.needed, 90);
        assert_eq!(need.status, StockStatus::Low);
        assert_eq!(need.stock_after_distribution, 0);
    }

    #[test]
    fn test_buffer_percentage_dominates_minimum() {
        let policy = AllocationPolicy {
            per_rider: HashMap::from([("Kopi Aren".to_string(), 40)]),
            ..AllocationPolicy::default()
        };

        let needs = plan_production_needs(
            &[stock("Kopi Aren", ProductCategory::Primary, 0)],
            4,
            &policy,
        );

        // ceil(160 * 0.15) = 24 > 20
        assert_eq!(needs[0].buffer_target, 24);
        assert_eq!(needs[0].total_needed, 184);
    }

    #[test]
    fn test_status_boundaries() {
        let policy = AllocationPolicy {
            per_rider: HashMap::from([("Taro".to_string(), 5)]),
            ..AllocationPolicy::default()
        };

        // total_allocation = 20, buffer = 20, total_needed = 40
        let exact = plan_production_needs(&[stock("Taro", ProductCategory::Primary, 40)], 4, &policy);
        assert_eq!(exact[0].status, StockStatus::Balanced);

        // 52 == 40 * 1.3 is not strictly above the surplus line
        let at_line = plan_production_needs(&[stock("Taro", ProductCategory::Primary, 52)], 4, &policy);
        assert_eq!(at_line[0].status, StockStatus::Balanced);

        let above = plan_production_needs(&[stock("Taro", ProductCategory::Primary, 53)], 4, &policy);
        assert_eq!(above[0].status, StockStatus::Surplus);
    }

    #[test]
    fn test_sort_order() {
        let policy = AllocationPolicy::default();
        let needs = plan_production_needs(
            &[
                stock("Coklat", ProductCategory::Primary, 500),
                stock("Kopi Aren", ProductCategory::Primary, 0),
                stock("Matcha", ProductCategory::Primary, 10),
                stock("Taro", ProductCategory::Primary, 40),
            ],
            4,
            &policy,
        );

        // Low items first, ordered by descending needed; surplus last
        assert_eq!(needs[0].product_name, "Kopi Aren");
        assert_eq!(needs[0].status, StockStatus::Low);
        assert_eq!(needs[1].product_name, "Matcha");
        assert_eq!(needs[2].product_name, "Taro");
        assert_eq!(needs[2].status, StockStatus::Balanced);
        assert_eq!(needs[3].product_name, "Coklat");
        assert_eq!(needs[3].status, StockStatus::Surplus);
    }
}
