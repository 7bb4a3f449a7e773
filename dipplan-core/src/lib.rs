//! DipPlan Core — ladder construction, allocation search, metrics projection.
//!
//! This crate contains the numeric engine behind the accumulation planner:
//! - Domain types (step rules, price ladders, schedules, per-level metrics)
//! - Ladder builder: descending price levels from a start price to a floor
//! - Allocation search: largest feasible initial lot under a fixed budget,
//!   with a deterministic per-level top-up rule bounding the running
//!   average cost
//! - Metrics projector: per-level running metrics for tabular/chart display
//!
//! Everything is synchronous and pure. The only compute-bound piece, the
//! initial-lot scan, parallelizes across candidates with rayon.

pub mod domain;
pub mod engine;
pub mod round;
