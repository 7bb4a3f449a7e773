//! Step rule — how each ladder level drops from the previous one.

use serde::{Deserialize, Serialize};

/// How the next ladder level is derived from the current one.
///
/// Serializable so a step rule can live in a TOML/JSON plan config:
/// `{ type = "absolute", amount = 2.5 }` or
/// `{ type = "relative", fraction = 0.05 }`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepRule {
    /// Subtract a fixed currency amount per step.
    Absolute { amount: f64 },
    /// Multiply by `1 - fraction` per step.
    Relative { fraction: f64 },
}

impl StepRule {
    /// The raw step magnitude (currency amount or fraction).
    pub fn magnitude(&self) -> f64 {
        match *self {
            StepRule::Absolute { amount } => amount,
            StepRule::Relative { fraction } => fraction,
        }
    }

    /// True when the magnitude is strictly positive (a usable step).
    pub fn is_positive(&self) -> bool {
        self.magnitude() > 0.0
    }

    /// The price one step below `current`.
    pub fn next_below(&self, current: f64) -> f64 {
        match *self {
            StepRule::Absolute { amount } => current - amount,
            StepRule::Relative { fraction } => current * (1.0 - fraction),
        }
    }
}
