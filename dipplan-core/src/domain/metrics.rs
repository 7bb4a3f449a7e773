//! Per-level running metrics derived from a ladder and a schedule.

use serde::{Deserialize, Serialize};

/// Running purchase metrics at one ladder level.
///
/// Currency fields are cent-rounded at emission; share counts stay exact
/// integers. Produced in ladder order by [`crate::engine::project`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelMetrics {
    /// The level's price (as emitted by the ladder builder).
    pub price: f64,
    /// Shares purchased at this level.
    pub shares: u64,
    /// Shares purchased at this level and all levels above it.
    pub cumulative_shares: u64,
    /// Cost of this level's purchase.
    pub cost: f64,
    /// Total invested through this level.
    pub cumulative_investment: f64,
    /// Running average purchase price (0 until the first share is bought).
    pub avg_cost: f64,
    /// Percentage deviation of this level's price from the running average
    /// cost (0 while the average is undefined).
    pub pct_diff_vs_avg: f64,
}
