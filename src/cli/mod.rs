//! CLI-specific functionality for the placement tool
//!
//! This module contains argument parsing, configuration discovery and the
//! runners behind each subcommand.

pub mod args;
pub mod config;
pub mod runner;

pub use args::{Args, ExecutionMode, SimulateConfig, TakeConfig};
pub use config::{ConfigDiscovery, PlacementConfig};
pub use runner::{run_results, run_simulate, run_take};
