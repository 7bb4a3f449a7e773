//! Domain types: step rules, price ladders, schedules, per-level metrics.

pub mod allocation;
pub mod ladder;
pub mod metrics;
pub mod step;

pub use allocation::{Allocation, SearchOutcome};
pub use ladder::{Ladder, LadderWarning};
pub use metrics::LevelMetrics;
pub use step::StepRule;
