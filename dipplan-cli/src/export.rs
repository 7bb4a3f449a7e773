//! Artifact export — JSON manifest and per-level CSV.
//!
//! All persisted artifacts carry a `schema_version` field. Unknown versions
//! are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use dipplan_core::domain::{Allocation, Ladder, LevelMetrics};

use crate::config::PlanConfig;

pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of one plan run, as persisted in `manifest.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResult {
    pub schema_version: u32,
    /// The full input config, so a manifest reproduces its run.
    pub config: PlanConfig,
    pub prices: Vec<f64>,
    /// Ladder construction warnings, rendered for display.
    pub warnings: Vec<String>,
    pub schedule: Vec<u64>,
    pub total_cost: f64,
    pub levels: Vec<LevelMetrics>,
}

impl PlanResult {
    pub fn new(
        config: &PlanConfig,
        ladder: &Ladder,
        allocation: &Allocation,
        levels: &[LevelMetrics],
    ) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            config: config.clone(),
            prices: ladder.prices().to_vec(),
            warnings: ladder.warnings().iter().map(|w| w.to_string()).collect(),
            schedule: allocation.schedule.clone(),
            total_cost: allocation.total_cost,
            levels: levels.to_vec(),
        }
    }
}

// ─── JSON ───────────────────────────────────────────────────────────

/// Serialize a `PlanResult` to pretty JSON.
pub fn export_json(result: &PlanResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize PlanResult to JSON")
}

/// Deserialize a `PlanResult` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<PlanResult> {
    let result: PlanResult =
        serde_json::from_str(json).context("failed to deserialize PlanResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

// ─── CSV ────────────────────────────────────────────────────────────

/// Export the per-level table as CSV: the data behind the shares,
/// cumulative-investment, average-cost, and deviation plots.
///
/// Columns: price, shares, avg_cost, pct_diff_vs_avg, cost,
/// cumulative_investment, cumulative_shares
pub fn export_levels_csv(levels: &[LevelMetrics]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "price",
        "shares",
        "avg_cost",
        "pct_diff_vs_avg",
        "cost",
        "cumulative_investment",
        "cumulative_shares",
    ])?;

    for level in levels {
        wtr.write_record([
            &format!("{:.2}", level.price),
            &level.shares.to_string(),
            &format!("{:.2}", level.avg_cost),
            &format!("{:.2}", level.pct_diff_vs_avg),
            &format!("{:.2}", level.cost),
            &format!("{:.2}", level.cumulative_investment),
            &level.cumulative_shares.to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the artifact set for a single run.
///
/// Creates a directory named `plan_{timestamp}/` under `output_dir`
/// containing:
/// - `manifest.json` — the full `PlanResult`
/// - `levels.csv` — one row per ladder level
///
/// Returns the path to the created directory.
pub fn save_artifacts(result: &PlanResult, output_dir: &Path) -> Result<PathBuf> {
    let dirname = format!("plan_{}", chrono::Local::now().format("%Y%m%d_%H%M%S"));
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    std::fs::write(run_dir.join("manifest.json"), export_json(result)?)?;
    std::fs::write(run_dir.join("levels.csv"), export_levels_csv(&result.levels)?)?;

    Ok(run_dir)
}

/// Load a `PlanResult` from an artifact directory's manifest.json.
///
/// Rejects unknown schema versions.
pub fn load_artifacts(dir: &Path) -> Result<PlanResult> {
    let manifest_path = dir.join("manifest.json");
    let json = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    import_json(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dipplan_core::domain::StepRule;
    use dipplan_core::engine::{build_ladder, find_allocation, project, SearchParams};

    fn sample_result() -> PlanResult {
        let config = PlanConfig::from_toml(
            r#"
[plan]
budget = 100000.0
start_price = 75.0
floor_price = 60.0
tolerance_pct = 2.0

[plan.step]
type = "absolute"
amount = 2.5
"#,
        )
        .unwrap();

        let ladder = build_ladder(
            config.plan.start_price,
            config.plan.floor_price,
            config.plan.step,
        );
        let params = SearchParams::new(config.plan.budget, config.tolerance());
        let allocation = find_allocation(&ladder, &params)
            .feasible()
            .cloned()
            .expect("feasible");
        let levels = project(&ladder, &allocation.schedule).unwrap();

        PlanResult::new(&config, &ladder, &allocation, &levels)
    }

    #[test]
    fn json_roundtrip() {
        let original = sample_result();
        let json = export_json(&original).unwrap();
        let restored = import_json(&json).unwrap();

        assert_eq!(restored.schema_version, SCHEMA_VERSION);
        assert_eq!(restored, original);
    }

    #[test]
    fn json_rejects_unknown_version() {
        let mut result = sample_result();
        result.schema_version = 99;
        let json = export_json(&result).unwrap();
        let err = import_json(&json);
        assert!(err.is_err());
        assert!(err
            .unwrap_err()
            .to_string()
            .contains("unsupported schema version 99"));
    }

    #[test]
    fn csv_one_row_per_level() {
        let result = sample_result();
        let csv = export_levels_csv(&result.levels).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), result.levels.len() + 1);
        assert_eq!(
            lines[0],
            "price,shares,avg_cost,pct_diff_vs_avg,cost,cumulative_investment,cumulative_shares"
        );
        assert!(lines[1].starts_with("75.00,"));
    }

    #[test]
    fn csv_empty_levels() {
        let csv = export_levels_csv(&[]).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }

    #[test]
    fn save_load_artifacts_roundtrip() {
        let result = sample_result();
        let dir = tempfile::tempdir().unwrap();
        let run_dir = save_artifacts(&result, dir.path()).unwrap();

        assert!(run_dir.join("manifest.json").exists());
        assert!(run_dir.join("levels.csv").exists());

        let loaded = load_artifacts(&run_dir).unwrap();
        assert_eq!(loaded, result);
    }
}
