//! DipPlan CLI support — plan configuration and artifact export.
//!
//! The binary in `main.rs` wires these into the engine crate; keeping the
//! config and export layers as a library keeps them testable on their own.

pub mod config;
pub mod export;
