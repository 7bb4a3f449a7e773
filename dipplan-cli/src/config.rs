//! Serializable plan configuration (TOML).

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use dipplan_core::domain::StepRule;
use dipplan_core::engine::DEFAULT_MAX_LOT_SEARCH;

pub const DEFAULT_BUDGET: f64 = 100_000.0;
pub const DEFAULT_TOLERANCE_PCT: f64 = 2.0;

/// Top-level TOML document: a single `[plan]` table.
///
/// ```toml
/// [plan]
/// budget = 100000.0
/// start_price = 75.0
/// floor_price = 60.0
/// tolerance_pct = 2.0
///
/// [plan.step]
/// type = "absolute"
/// amount = 2.5
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanConfig {
    pub plan: PlanSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSection {
    /// Total investment budget.
    #[serde(default = "default_budget")]
    pub budget: f64,
    /// Starting (highest) price.
    pub start_price: f64,
    /// Lowest expected price (the ladder floor).
    pub floor_price: f64,
    /// Average cost must stay within this percent of the last price paid.
    #[serde(default = "default_tolerance_pct")]
    pub tolerance_pct: f64,
    /// Hard cap on the initial-lot search.
    #[serde(default = "default_max_lot_search")]
    pub max_lot_search: u64,
    /// How each level drops from the previous one. Last so the TOML
    /// serializer emits the sub-table after the scalar fields.
    pub step: StepRule,
}

fn default_budget() -> f64 {
    DEFAULT_BUDGET
}

fn default_tolerance_pct() -> f64 {
    DEFAULT_TOLERANCE_PCT
}

fn default_max_lot_search() -> u64 {
    DEFAULT_MAX_LOT_SEARCH
}

impl PlanConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("failed to parse plan config")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml(&text)
    }

    /// Fail fast on out-of-domain inputs. Degraded-but-valid shapes (an
    /// inverted range, a zero step) are left to the engine's warnings.
    pub fn validate(&self) -> Result<()> {
        let plan = &self.plan;
        if !plan.budget.is_finite() || plan.budget < 0.0 {
            bail!("budget must be a non-negative amount");
        }
        if !plan.start_price.is_finite() || plan.start_price <= 0.0 {
            bail!("start price must be positive");
        }
        if !plan.floor_price.is_finite() || plan.floor_price <= 0.0 {
            bail!("floor price must be positive");
        }
        if !plan.tolerance_pct.is_finite() || plan.tolerance_pct < 0.0 {
            bail!("tolerance must be non-negative");
        }
        if !plan.step.magnitude().is_finite() {
            bail!("step magnitude must be finite");
        }
        Ok(())
    }

    /// The engine-facing fraction form of the tolerance percent.
    pub fn tolerance(&self) -> f64 {
        self.plan.tolerance_pct / 100.0
    }
}
