//! DipPlan CLI — compute and display a buy-the-dip accumulation plan.
//!
//! Parameters come from flags or a TOML config file. The result is printed
//! as a per-level table; with `--output-dir` the run is also saved as
//! artifacts (`manifest.json`, `levels.csv`) for external charting tools.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;

use dipplan_core::domain::{Allocation, Ladder, LevelMetrics, SearchOutcome, StepRule};
use dipplan_core::engine::{build_ladder, find_allocation, project, SearchParams};

use dipplan_cli::config::{PlanConfig, PlanSection, DEFAULT_BUDGET, DEFAULT_TOLERANCE_PCT};
use dipplan_cli::export::{save_artifacts, PlanResult};

#[derive(Parser)]
#[command(
    name = "dipplan",
    about = "DipPlan CLI — buy-the-dip accumulation planner"
)]
struct Cli {
    /// Path to a TOML config file (mutually exclusive with parameter flags).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Total investment budget. Defaults to 100000.
    #[arg(long)]
    budget: Option<f64>,

    /// Starting (highest) price.
    #[arg(long)]
    start_price: Option<f64>,

    /// Lowest expected price (the ladder floor).
    #[arg(long)]
    floor_price: Option<f64>,

    /// Fixed currency drop per level.
    #[arg(long, conflicts_with = "step_percent")]
    step_amount: Option<f64>,

    /// Percentage drop per level.
    #[arg(long)]
    step_percent: Option<f64>,

    /// Average cost must stay within this percent of the last price paid.
    /// Defaults to 2.
    #[arg(long)]
    tolerance_pct: Option<f64>,

    /// Hard cap on the initial-lot search. Defaults to 10000.
    #[arg(long)]
    max_lot: Option<u64>,

    /// Scan candidates sequentially instead of on the rayon pool.
    #[arg(long, default_value_t = false)]
    sequential: bool,

    /// Save manifest.json and levels.csv under this directory.
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    config.validate()?;

    let plan = &config.plan;
    let ladder = build_ladder(plan.start_price, plan.floor_price, plan.step);
    for warning in ladder.warnings() {
        eprintln!("WARNING: {warning}");
    }

    let params = SearchParams::new(plan.budget, config.tolerance())
        .with_max_lot_search(plan.max_lot_search)
        .with_parallelism(!cli.sequential);

    let allocation = match find_allocation(&ladder, &params) {
        SearchOutcome::Feasible(allocation) => allocation,
        SearchOutcome::Infeasible => bail!("no feasible plan found with these parameters"),
    };

    let levels = project(&ladder, &allocation.schedule)?;

    print_summary(&config, &ladder, &allocation);
    print_table(&levels);

    if let Some(dir) = &cli.output_dir {
        let result = PlanResult::new(&config, &ladder, &allocation, &levels);
        let run_dir = save_artifacts(&result, dir)?;
        println!();
        println!("Artifacts saved to: {}", run_dir.display());
    }

    Ok(())
}

/// Build the effective config from either `--config` or the parameter flags.
fn resolve_config(cli: &Cli) -> Result<PlanConfig> {
    let has_param_flags = cli.budget.is_some()
        || cli.start_price.is_some()
        || cli.floor_price.is_some()
        || cli.step_amount.is_some()
        || cli.step_percent.is_some()
        || cli.tolerance_pct.is_some()
        || cli.max_lot.is_some();

    if let Some(path) = &cli.config {
        if has_param_flags {
            bail!("--config and parameter flags are mutually exclusive");
        }
        return PlanConfig::from_file(path);
    }

    let (start_price, floor_price) = match (cli.start_price, cli.floor_price) {
        (Some(start), Some(floor)) => (start, floor),
        _ => bail!("--start-price and --floor-price are required without --config"),
    };

    let step = match (cli.step_amount, cli.step_percent) {
        (Some(amount), None) => StepRule::Absolute { amount },
        (None, Some(percent)) => StepRule::Relative {
            fraction: percent / 100.0,
        },
        (None, None) => bail!("one of --step-amount or --step-percent is required"),
        (Some(_), Some(_)) => unreachable!("clap rejects the combination"),
    };

    Ok(PlanConfig {
        plan: PlanSection {
            budget: cli.budget.unwrap_or(DEFAULT_BUDGET),
            start_price,
            floor_price,
            step,
            tolerance_pct: cli.tolerance_pct.unwrap_or(DEFAULT_TOLERANCE_PCT),
            max_lot_search: cli
                .max_lot
                .unwrap_or(dipplan_core::engine::DEFAULT_MAX_LOT_SEARCH),
        },
    })
}

fn print_summary(config: &PlanConfig, ladder: &Ladder, allocation: &Allocation) {
    let plan = &config.plan;

    println!();
    println!("=== Accumulation Plan ===");
    match (ladder.start(), ladder.floor()) {
        (Some(start), Some(floor)) if ladder.len() > 1 => {
            println!(
                "Levels:         {} ({:.2} down to {:.2})",
                ladder.len(),
                start,
                floor
            );
        }
        (Some(start), _) => println!("Levels:         1 (at {:.2})", start),
        _ => println!("Levels:         0"),
    }
    println!("Initial lot:    {} shares", allocation.initial_lot());
    println!("Total shares:   {}", allocation.total_shares());
    println!(
        "Total spent:    ${:.2} of ${:.2} budget",
        allocation.total_cost, plan.budget
    );
    if allocation.total_shares() > 0 {
        println!(
            "Final avg cost: ${:.2}",
            allocation.total_cost / allocation.total_shares() as f64
        );
    } else {
        println!("Plan buys no shares: the budget cannot cover one share at these levels.");
    }
    println!();
}

fn print_table(levels: &[LevelMetrics]) {
    println!(
        "{:>9} {:>8} {:>10} {:>10} {:>12} {:>12} {:>11}",
        "Price", "Shares", "Avg Cost", "% vs Avg", "Cost", "Cum Invest", "Cum Shares"
    );
    println!("{}", "-".repeat(78));
    for level in levels {
        println!(
            "{:>9.2} {:>8} {:>10.2} {:>10.2} {:>12.2} {:>12.2} {:>11}",
            level.price,
            level.shares,
            level.avg_cost,
            level.pct_diff_vs_avg,
            level.cost,
            level.cumulative_investment,
            level.cumulative_shares
        );
    }
}
