//! Distribution ledger tests
//!
//! In-memory simulation of the allocation and outcome rules:
//! - Quantity conservation across arbitrary operation sequences
//! - Allocation atomicity (a failed allocation changes nothing)
//! - Return round trips credit the source batch
//! - Bulk allocation partial success
//! - Administrative corrections (absolute override, delta-only batch credit)
//! - Bundle passes never claim the same batch twice
//! - Destroyed batches are never allocated from

use proptest::prelude::*;

// ============================================================================
// In-memory ledger simulation
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum Action {
    Sell,
    Return,
    Reject,
}

#[derive(Debug, Clone)]
struct SimBatch {
    initial: i32,
    current: i32,
    destroyed: bool,
}

#[derive(Debug, Clone)]
struct SimDistribution {
    batch: usize,
    quantity: i32,
    sold: i32,
    returned: i32,
    rejected: i32,
}

impl SimDistribution {
    fn remaining(&self) -> i32 {
        self.quantity - self.sold - self.returned - self.rejected
    }
}

#[derive(Debug, Default)]
struct Ledger {
    batches: Vec<SimBatch>,
    distributions: Vec<SimDistribution>,
}

impl Ledger {
    fn add_batch(&mut self, initial: i32) -> usize {
        self.batches.push(SimBatch {
            initial,
            current: initial,
            destroyed: false,
        });
        self.batches.len() - 1
    }

    fn destroy(&mut self, batch: usize) {
        self.batches[batch].current = 0;
        self.batches[batch].destroyed = true;
    }

    fn allocate(&mut self, batch: usize, quantity: i32) -> Result<usize, &'static str> {
        if quantity <= 0 {
            return Err("quantity must be positive");
        }
        let b = &mut self.batches[batch];
        if b.destroyed {
            return Err("batch destroyed");
        }
        if b.current < quantity {
            return Err("insufficient stock");
        }
        b.current -= quantity;
        self.distributions.push(SimDistribution {
            batch,
            quantity,
            sold: 0,
            returned: 0,
            rejected: 0,
        });
        Ok(self.distributions.len() - 1)
    }

    fn record(&mut self, dist: usize, action: Action, amount: i32) -> Result<(), &'static str> {
        if amount <= 0 {
            return Err("amount must be positive");
        }
        let d = &mut self.distributions[dist];
        if d.remaining() < amount {
            return Err("exceeds remaining");
        }
        match action {
            Action::Sell => d.sold += amount,
            Action::Reject => d.rejected += amount,
            Action::Return => {
                d.returned += amount;
                let batch = d.batch;
                self.batches[batch].current += amount;
            }
        }
        Ok(())
    }

    /// Absolute override of the sold and returned counters. Decreasing a
    /// recorded return is refused; an increase credits only the delta back
    /// to the source batch.
    fn admin_correct(&mut self, dist: usize, sold: i32, returned: i32) -> Result<(), &'static str> {
        if sold < 0 || returned < 0 {
            return Err("corrected quantities must not be negative");
        }
        let d = &self.distributions[dist];
        if returned < d.returned {
            return Err("return decrease unsupported");
        }
        if sold + returned + d.rejected > d.quantity {
            return Err("exceeds distributed quantity");
        }
        let delta = returned - d.returned;
        let batch = d.batch;
        let d = &mut self.distributions[dist];
        d.sold = sold;
        d.returned = returned;
        self.batches[batch].current += delta;
        Ok(())
    }

    /// One pass of bundle allocation over an ordered candidate list: each
    /// product takes the first eligible batch not already claimed in this
    /// pass.
    fn bundle_pick(&self, candidates: &[usize], claimed: &[usize], quantity: i32) -> Option<usize> {
        candidates.iter().copied().find(|&b| {
            !claimed.contains(&b)
                && !self.batches[b].destroyed
                && self.batches[b].current >= quantity
        })
    }

    /// Units that physically left a batch and never came back
    fn outstanding(&self, batch: usize) -> i32 {
        self.distributions
            .iter()
            .filter(|d| d.batch == batch)
            .map(|d| d.quantity - d.returned)
            .sum()
    }

    fn assert_conserved(&self) {
        for d in &self.distributions {
            assert!(d.sold >= 0 && d.returned >= 0 && d.rejected >= 0);
            assert!(
                d.sold + d.returned + d.rejected <= d.quantity,
                "accounted {} exceeds distributed {}",
                d.sold + d.returned + d.rejected,
                d.quantity
            );
        }
        for (idx, b) in self.batches.iter().enumerate() {
            assert!(b.current >= 0);
            if !b.destroyed {
                assert_eq!(
                    b.current + self.outstanding(idx),
                    b.initial,
                    "batch {} stock leaked",
                    idx
                );
            }
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_allocation_moves_stock() {
        let mut ledger = Ledger::default();
        let batch = ledger.add_batch(50);

        let dist = ledger.allocate(batch, 20).unwrap();
        assert_eq!(ledger.batches[batch].current, 30);
        assert_eq!(ledger.distributions[dist].remaining(), 20);
        ledger.assert_conserved();
    }

    #[test]
    fn test_failed_allocation_changes_nothing() {
        let mut ledger = Ledger::default();
        let batch = ledger.add_batch(10);

        assert!(ledger.allocate(batch, 11).is_err());
        assert_eq!(ledger.batches[batch].current, 10);
        assert!(ledger.distributions.is_empty());
    }

    #[test]
    fn test_outcome_cannot_exceed_remaining() {
        let mut ledger = Ledger::default();
        let batch = ledger.add_batch(30);
        let dist = ledger.allocate(batch, 10).unwrap();

        ledger.record(dist, Action::Sell, 6).unwrap();
        ledger.record(dist, Action::Reject, 3).unwrap();
        // Only 1 unit remains
        assert!(ledger.record(dist, Action::Sell, 2).is_err());
        ledger.record(dist, Action::Sell, 1).unwrap();
        assert_eq!(ledger.distributions[dist].remaining(), 0);
        ledger.assert_conserved();
    }

    #[test]
    fn test_return_credits_source_batch() {
        let mut ledger = Ledger::default();
        let batch = ledger.add_batch(40);
        let dist = ledger.allocate(batch, 15).unwrap();

        ledger.record(dist, Action::Return, 5).unwrap();
        assert_eq!(ledger.batches[batch].current, 30);
        // Returned stock can be allocated again
        ledger.allocate(batch, 30).unwrap();
        assert_eq!(ledger.batches[batch].current, 0);
        ledger.assert_conserved();
    }

    #[test]
    fn test_rider_rejection_does_not_credit_batch() {
        let mut ledger = Ledger::default();
        let batch = ledger.add_batch(40);
        let dist = ledger.allocate(batch, 15).unwrap();

        ledger.record(dist, Action::Reject, 5).unwrap();
        assert_eq!(ledger.batches[batch].current, 25);
        ledger.assert_conserved();
    }

    /// A correction may not shrink a recorded return: the earlier batch
    /// credit could already have been redistributed
    #[test]
    fn test_correction_rejects_return_decrease() {
        let mut ledger = Ledger::default();
        let batch = ledger.add_batch(30);
        let dist = ledger.allocate(batch, 20).unwrap();
        ledger.record(dist, Action::Return, 5).unwrap();

        assert!(ledger.admin_correct(dist, 2, 3).is_err());
        assert_eq!(ledger.distributions[dist].returned, 5);
        assert_eq!(ledger.batches[batch].current, 15);
        ledger.assert_conserved();
    }

    /// A correction may not account more than was distributed, with the
    /// untouched rejected counter included in the check
    #[test]
    fn test_correction_rejects_over_accounting() {
        let mut ledger = Ledger::default();
        let batch = ledger.add_batch(20);
        let dist = ledger.allocate(batch, 10).unwrap();
        ledger.record(dist, Action::Reject, 4).unwrap();

        // 5 sold + 2 returned + 4 rejected = 11 > 10
        assert!(ledger.admin_correct(dist, 5, 2).is_err());
        assert_eq!(ledger.distributions[dist].sold, 0);
        ledger.assert_conserved();
    }

    /// The override is absolute, but only the return delta flows back to
    /// the source batch
    #[test]
    fn test_correction_credits_exactly_the_return_delta() {
        let mut ledger = Ledger::default();
        let batch = ledger.add_batch(40);
        let dist = ledger.allocate(batch, 20).unwrap();
        ledger.record(dist, Action::Return, 5).unwrap();
        assert_eq!(ledger.batches[batch].current, 25);

        ledger.admin_correct(dist, 10, 8).unwrap();
        let d = &ledger.distributions[dist];
        assert_eq!(d.sold, 10);
        assert_eq!(d.returned, 8);
        // 3 more units returned than before
        assert_eq!(ledger.batches[batch].current, 28);
        ledger.assert_conserved();

        // Correcting sold alone leaves the batch untouched
        ledger.admin_correct(dist, 12, 8).unwrap();
        assert_eq!(ledger.batches[batch].current, 28);
        ledger.assert_conserved();
    }

    /// Two catalog entries resolving to the same batch: the second pick is
    /// routed to the next eligible batch, never the one already claimed
    #[test]
    fn test_bundle_pass_routes_second_product_to_next_batch() {
        let mut ledger = Ledger::default();
        let oldest = ledger.add_batch(50);
        let newer = ledger.add_batch(50);
        let quantity = 10;

        let mut claimed = Vec::new();
        for _product in 0..2 {
            let batch = ledger.bundle_pick(&[oldest, newer], &claimed, quantity).unwrap();
            ledger.allocate(batch, quantity).unwrap();
            claimed.push(batch);
        }

        assert_eq!(claimed, vec![oldest, newer]);
        assert_eq!(ledger.batches[oldest].current, 40);
        assert_eq!(ledger.batches[newer].current, 40);
        ledger.assert_conserved();
    }

    /// With no alternative batch the second product is skipped outright,
    /// even though the claimed batch still has stock for it
    #[test]
    fn test_bundle_pass_skips_instead_of_double_claiming() {
        let mut ledger = Ledger::default();
        let only = ledger.add_batch(50);
        let quantity = 10;

        let mut claimed = Vec::new();
        let mut skipped = 0;
        for _product in 0..2 {
            match ledger.bundle_pick(&[only], &claimed, quantity) {
                Some(batch) => {
                    ledger.allocate(batch, quantity).unwrap();
                    claimed.push(batch);
                }
                None => skipped += 1,
            }
        }

        assert_eq!(claimed.len(), 1);
        assert_eq!(skipped, 1);
        // Exactly one allocation came out of the batch
        assert_eq!(ledger.batches[only].current, 40);
        ledger.assert_conserved();
    }

    #[test]
    fn test_destroyed_batch_rejects_allocation() {
        let mut ledger = Ledger::default();
        let batch = ledger.add_batch(100);
        ledger.destroy(batch);

        assert_eq!(ledger.allocate(batch, 1), Err("batch destroyed"));
        assert_eq!(ledger.batches[batch].current, 0);
    }

    /// Bulk allocation over mixed batches succeeds where it can and reports
    /// the rest, without aborting the run
    #[test]
    fn test_bulk_allocation_partial_success() {
        let mut ledger = Ledger::default();
        let rich = ledger.add_batch(50);
        let poor = ledger.add_batch(3);
        let gone = ledger.add_batch(20);
        ledger.destroy(gone);

        let per_batch = 10;
        let mut created = 0;
        let mut skipped = 0;
        for batch in [rich, poor, gone] {
            match ledger.allocate(batch, per_batch) {
                Ok(_) => created += 1,
                Err(_) => skipped += 1,
            }
        }

        assert_eq!(created, 1);
        assert_eq!(skipped, 2);
        assert_eq!(ledger.batches[rich].current, 40);
        assert_eq!(ledger.batches[poor].current, 3);
        ledger.assert_conserved();
    }
}

// ============================================================================
// Property Tests
// ============================================================================

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        Just(Action::Sell),
        Just(Action::Return),
        Just(Action::Reject),
    ]
}

proptest! {
    /// Conservation holds across arbitrary interleavings of allocations and
    /// outcome reports: no sequence of operations can create or lose stock
    #[test]
    fn prop_conservation_under_random_operations(
        initial in 1i32..500,
        ops in prop::collection::vec(
            (0usize..8, 1i32..50, action_strategy()),
            0..40,
        ),
    ) {
        let mut ledger = Ledger::default();
        let batch = ledger.add_batch(initial);

        for (dist_pick, amount, action) in ops {
            // Alternate between allocating and reporting, driven by the data
            if dist_pick % 2 == 0 || ledger.distributions.is_empty() {
                let _ = ledger.allocate(batch, amount);
            } else {
                let dist = dist_pick % ledger.distributions.len();
                let _ = ledger.record(dist, action, amount);
            }
            ledger.assert_conserved();
        }
    }

    /// Whatever gets reported, accounted never exceeds distributed
    #[test]
    fn prop_accounted_bounded_by_distributed(
        quantity in 1i32..200,
        reports in prop::collection::vec((action_strategy(), 1i32..60), 0..20),
    ) {
        let mut ledger = Ledger::default();
        let batch = ledger.add_batch(quantity);
        let dist = ledger.allocate(batch, quantity).unwrap();

        for (action, amount) in reports {
            let _ = ledger.record(dist, action, amount);
        }

        let d = &ledger.distributions[dist];
        prop_assert!(d.sold + d.returned + d.rejected <= d.quantity);
        prop_assert!(d.remaining() >= 0);
    }

    /// No sequence of attempted corrections can break conservation or
    /// drive the source batch negative
    #[test]
    fn prop_corrections_preserve_conservation(
        quantity in 1i32..200,
        reports in prop::collection::vec((action_strategy(), 1i32..50), 0..10),
        corrections in prop::collection::vec((0i32..250, 0i32..250), 1..10),
    ) {
        let mut ledger = Ledger::default();
        let batch = ledger.add_batch(quantity);
        let dist = ledger.allocate(batch, quantity).unwrap();

        for (action, amount) in reports {
            let _ = ledger.record(dist, action, amount);
        }
        for (sold, returned) in corrections {
            let before = ledger.distributions[dist].returned;
            let _ = ledger.admin_correct(dist, sold, returned);
            // Returns are monotone through corrections as well
            prop_assert!(ledger.distributions[dist].returned >= before);
            ledger.assert_conserved();
        }
    }

    /// A full cycle of return and re-allocation never inflates batch stock
    #[test]
    fn prop_return_reallocation_round_trip(
        initial in 10i32..300,
        cycles in prop::collection::vec(1i32..10, 1..15),
    ) {
        let mut ledger = Ledger::default();
        let batch = ledger.add_batch(initial);

        for amount in cycles {
            if let Ok(dist) = ledger.allocate(batch, amount) {
                ledger.record(dist, Action::Return, amount).unwrap();
            }
            prop_assert!(ledger.batches[batch].current <= initial);
            ledger.assert_conserved();
        }
    }
}
