//! Metrics projection — per-level running metrics from a ladder and schedule.

use thiserror::Error;

use crate::domain::{Ladder, LevelMetrics};
use crate::round::round_cents;

/// Contract violation: the schedule is not aligned to the ladder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectError {
    #[error("schedule has {schedule} entries for a {ladder}-level ladder")]
    LengthMismatch { ladder: usize, schedule: usize },
}

/// Project per-level running metrics for a schedule over a ladder.
///
/// Pure: identical inputs always yield identical output, and nothing is
/// kept between calls. The running totals are explicit fold state threaded
/// through the loop, never ambient fields. Currency outputs are
/// cent-rounded at emission; share counts stay exact integers.
///
/// A zero share count leaves the running average (and its deviation) at 0
/// rather than dividing by zero.
pub fn project(ladder: &Ladder, schedule: &[u64]) -> Result<Vec<LevelMetrics>, ProjectError> {
    let prices = ladder.prices();
    if prices.len() != schedule.len() {
        return Err(ProjectError::LengthMismatch {
            ladder: prices.len(),
            schedule: schedule.len(),
        });
    }

    let mut levels = Vec::with_capacity(prices.len());
    let mut cumulative_cost = 0.0;
    let mut cumulative_shares = 0u64;

    for (&price, &shares) in prices.iter().zip(schedule) {
        let cost = price * shares as f64;
        cumulative_cost += cost;
        cumulative_shares += shares;

        let avg_cost = if cumulative_shares > 0 {
            cumulative_cost / cumulative_shares as f64
        } else {
            0.0
        };
        let pct_diff_vs_avg = if avg_cost != 0.0 {
            (price - avg_cost) / avg_cost * 100.0
        } else {
            0.0
        };

        levels.push(LevelMetrics {
            price,
            shares,
            cumulative_shares,
            cost: round_cents(cost),
            cumulative_investment: round_cents(cumulative_cost),
            avg_cost: round_cents(avg_cost),
            pct_diff_vs_avg: round_cents(pct_diff_vs_avg),
        });
    }

    Ok(levels)
}
