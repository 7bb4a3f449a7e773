//! Allocation search — the largest feasible initial lot under the budget.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::{Allocation, Ladder, SearchOutcome};

/// Default hard cap on the initial-lot scan.
pub const DEFAULT_MAX_LOT_SEARCH: u64 = 10_000;

/// Parameters for one allocation search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    /// Total investment budget.
    pub budget: f64,
    /// Non-negative fraction: after each level's purchase the running
    /// average cost must stay within `(1 + tolerance) * price`.
    pub tolerance: f64,
    /// Hard cap on candidate initial lots.
    pub max_lot_search: u64,
    /// Scan candidates on the rayon pool (reduced by maximum) instead of
    /// sequentially.
    pub parallel: bool,
}

impl SearchParams {
    pub fn new(budget: f64, tolerance: f64) -> Self {
        Self {
            budget,
            tolerance,
            max_lot_search: DEFAULT_MAX_LOT_SEARCH,
            parallel: true,
        }
    }

    pub fn with_max_lot_search(mut self, max_lot_search: u64) -> Self {
        self.max_lot_search = max_lot_search;
        self
    }

    /// Enables or disables the parallel candidate scan.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Find the largest feasible initial lot size and its induced schedule.
///
/// Deliberately an exhaustive linear scan over `Q0 ∈ [0, max_lot_search]`,
/// not a binary search: feasibility is not guaranteed to be monotonic in
/// `Q0` for every tolerance/step configuration, so no candidate may be
/// skipped. Candidates are independent, so the parallel path fans out over
/// the rayon pool and reduces by maximum feasible `Q0`, never first-found.
///
/// Returns [`SearchOutcome::Infeasible`] when no candidate (including a
/// zero lot) fits the budget.
pub fn find_allocation(ladder: &Ladder, params: &SearchParams) -> SearchOutcome {
    let prices = ladder.prices();
    if prices.is_empty() {
        return SearchOutcome::Infeasible;
    }

    let best = if params.parallel {
        (0..=params.max_lot_search)
            .into_par_iter()
            .filter_map(|q0| feasible_candidate(prices, q0, params))
            .max_by_key(Allocation::initial_lot)
    } else {
        (0..=params.max_lot_search)
            .filter_map(|q0| feasible_candidate(prices, q0, params))
            .max_by_key(Allocation::initial_lot)
    };

    match best {
        Some(allocation) => SearchOutcome::Feasible(allocation),
        None => SearchOutcome::Infeasible,
    }
}

/// Build the candidate's schedule and keep it only if it fits the budget.
fn feasible_candidate(prices: &[f64], q0: u64, params: &SearchParams) -> Option<Allocation> {
    let allocation = build_schedule(prices, q0, params.tolerance);
    (allocation.total_cost <= params.budget).then_some(allocation)
}

/// Deterministic greedy schedule for one candidate lot.
///
/// Level 0 buys exactly `q0`. Each later level buys the minimum top-up
/// keeping the running average cost within `(1 + tolerance) * price`: the
/// smallest non-negative integer `buy` with
/// `cost_sum - (1 + tolerance) * price * share_sum <= tolerance * price * buy`.
/// Negative solutions clamp to zero. A zero tolerance zeroes the divisor;
/// no finite top-up can tighten the bound, so the top-up clamps to zero.
pub(crate) fn build_schedule(prices: &[f64], q0: u64, tolerance: f64) -> Allocation {
    let mut schedule = vec![0u64; prices.len()];
    schedule[0] = q0;

    let mut cost_sum = prices[0] * q0 as f64;
    let mut share_sum = q0;

    for (i, &price) in prices.iter().enumerate().skip(1) {
        let needed = cost_sum - (1.0 + tolerance) * price * share_sum as f64;
        let denom = tolerance * price;

        let buy = if denom > 0.0 && needed > 0.0 {
            (needed / denom).ceil() as u64
        } else {
            0
        };

        schedule[i] = buy;
        cost_sum += price * buy as f64;
        share_sum += buy;
    }

    Allocation {
        schedule,
        total_cost: cost_sum,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StepRule;
    use crate::engine::build_ladder;

    fn example_ladder() -> Ladder {
        build_ladder(75.0, 60.0, StepRule::Absolute { amount: 2.5 })
    }

    #[test]
    fn schedule_tops_up_to_hold_average() {
        // Hand-checked: q0 = 10 at 75.00, then 72.50 with 2% tolerance.
        // needed = 750 - 1.02 * 72.5 * 10 = 10.5, denom = 1.45,
        // 10.5 / 1.45 = 7.24… → 8 shares.
        let allocation = build_schedule(&[75.0, 72.5], 10, 0.02);
        assert_eq!(allocation.schedule, vec![10, 8]);
        assert!((allocation.total_cost - (750.0 + 8.0 * 72.5)).abs() < 1e-9);

        // 8 is minimal: 7 leaves the average above the bound.
        let avg_with_7 = (750.0 + 7.0 * 72.5) / 17.0;
        assert!(avg_with_7 > 1.02 * 72.5);
        let avg_with_8 = allocation.total_cost / 18.0;
        assert!(avg_with_8 <= 1.02 * 72.5 + 1e-9);
    }

    #[test]
    fn zero_lot_buys_nothing() {
        let allocation = build_schedule(example_ladder().prices(), 0, 0.02);
        assert!(allocation.buys_nothing());
        assert_eq!(allocation.total_cost, 0.0);
    }

    #[test]
    fn zero_tolerance_clamps_top_ups() {
        let allocation = build_schedule(example_ladder().prices(), 40, 0.0);
        assert_eq!(allocation.schedule[0], 40);
        assert!(allocation.schedule[1..].iter().all(|&q| q == 0));
        assert!((allocation.total_cost - 40.0 * 75.0).abs() < 1e-9);
    }

    #[test]
    fn average_constraint_holds_at_every_level() {
        let ladder = example_ladder();
        let tolerance = 0.02;
        let allocation = build_schedule(ladder.prices(), 50, tolerance);

        let mut cost = 0.0;
        let mut shares = 0u64;
        for (price, &qty) in ladder.prices().iter().zip(&allocation.schedule) {
            cost += price * qty as f64;
            shares += qty;
            if shares > 0 {
                let avg = cost / shares as f64;
                assert!(
                    avg <= (1.0 + tolerance) * price + 1e-9,
                    "avg {avg} exceeds bound at price {price}"
                );
            }
        }
    }

    #[test]
    fn search_selects_largest_feasible_lot() {
        let ladder = example_ladder();
        let params = SearchParams::new(100_000.0, 0.02).with_max_lot_search(2_000);

        let allocation = match find_allocation(&ladder, &params) {
            SearchOutcome::Feasible(a) => a,
            SearchOutcome::Infeasible => panic!("expected a feasible plan"),
        };

        assert!(allocation.total_cost <= params.budget);
        // One more share at level 0 must not fit.
        let next = build_schedule(ladder.prices(), allocation.initial_lot() + 1, params.tolerance);
        assert!(next.total_cost > params.budget);
    }

    #[test]
    fn zero_lot_is_a_feasible_candidate() {
        // Budget too small for a single share still yields a (zero) plan,
        // not an infeasible outcome.
        let ladder = example_ladder();
        let params = SearchParams::new(10.0, 0.02).with_max_lot_search(50);
        let allocation = match find_allocation(&ladder, &params) {
            SearchOutcome::Feasible(a) => a,
            SearchOutcome::Infeasible => panic!("zero lot should be feasible"),
        };
        assert!(allocation.buys_nothing());
    }

    #[test]
    fn negative_budget_is_infeasible() {
        let ladder = example_ladder();
        let params = SearchParams::new(-1.0, 0.02).with_max_lot_search(50);
        assert!(find_allocation(&ladder, &params).is_infeasible());
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let ladder = example_ladder();
        let parallel = SearchParams::new(100_000.0, 0.02).with_max_lot_search(1_000);
        let sequential = parallel.clone().with_parallelism(false);

        assert_eq!(
            find_allocation(&ladder, &parallel),
            find_allocation(&ladder, &sequential)
        );
    }

    #[test]
    fn single_level_ladder_is_trivial() {
        // Degenerate inverted ladder: only the start price exists, so the
        // search reduces to budget / price.
        let ladder = build_ladder(50.0, 60.0, StepRule::Absolute { amount: 2.5 });
        let params = SearchParams::new(100_000.0, 0.02).with_max_lot_search(10_000);
        let allocation = match find_allocation(&ladder, &params) {
            SearchOutcome::Feasible(a) => a,
            SearchOutcome::Infeasible => panic!("expected trivial allocation"),
        };
        assert_eq!(allocation.initial_lot(), 2_000);
        assert!((allocation.total_cost - 100_000.0).abs() < 1e-9);
    }

    #[test]
    fn default_params() {
        let params = SearchParams::new(100_000.0, 0.02);
        assert_eq!(params.max_lot_search, DEFAULT_MAX_LOT_SEARCH);
        assert!(params.parallel);
    }
}
