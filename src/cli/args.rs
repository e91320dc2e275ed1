//! Command line argument parsing
//!
//! This module handles CLI argument parsing with subcommands:
//! - `take`: Run an interactive assessment on the console
//! - `simulate`: Run an assessment against a simulated student
//! - `results`: Print the stored results of a session
//! - `show-config`: Show configuration discovery information

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug)]
pub enum ExecutionMode {
    Take(TakeConfig),
    Simulate(SimulateConfig),
    Results(Uuid),
    ShowConfig,
}

#[derive(Debug)]
pub struct TakeConfig {
    pub program: PathBuf,
    pub student_id: String,
    pub school_id: String,
    pub proctor_id: String,
}

#[derive(Debug)]
pub struct SimulateConfig {
    pub program: PathBuf,
    /// Probability of a correct answer, in [0, 1]
    pub accuracy: f64,
    pub seed: Option<u64>,
    pub student_id: String,
}

#[derive(Debug, Parser)]
#[command(name = "placement")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Adaptive placement and progress assessments for multi-level programs")]
#[command(long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,
    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Take an assessment interactively
    Take {
        /// Program file (TOML or JSON)
        #[arg(short = 'p', long = "program")]
        program: PathBuf,
        /// Student identifier
        #[arg(short = 's', long = "student")]
        student: String,
        /// School identifier
        #[arg(long = "school", default_value = "local")]
        school: String,
        /// Proctor identifier
        #[arg(long = "proctor", default_value = "console")]
        proctor: String,
    },
    /// Run an assessment with a simulated student
    Simulate {
        /// Program file (TOML or JSON)
        #[arg(short = 'p', long = "program")]
        program: PathBuf,
        /// Probability that the simulated student answers correctly
        #[arg(short = 'a', long = "accuracy", default_value_t = 0.7)]
        accuracy: f64,
        /// Seed for the simulated student
        #[arg(long = "seed")]
        seed: Option<u64>,
        /// Student identifier
        #[arg(short = 's', long = "student", default_value = "simulated")]
        student: String,
    },
    /// Print stored results of a session
    Results {
        /// Session ID
        session_id: String,
    },
    /// Show configuration discovery information
    ShowConfig,
}

impl Args {
    pub fn parse() -> Self {
        Parser::parse()
    }

    pub fn mode(&self) -> Result<ExecutionMode, String> {
        match &self.command {
            Some(Commands::Take {
                program,
                student,
                school,
                proctor,
            }) => Ok(ExecutionMode::Take(TakeConfig {
                program: program.clone(),
                student_id: student.clone(),
                school_id: school.clone(),
                proctor_id: proctor.clone(),
            })),
            Some(Commands::Simulate {
                program,
                accuracy,
                seed,
                student,
            }) => {
                if !(0.0..=1.0).contains(accuracy) {
                    return Err(format!("Accuracy must be between 0 and 1, got {}", accuracy));
                }
                Ok(ExecutionMode::Simulate(SimulateConfig {
                    program: program.clone(),
                    accuracy: *accuracy,
                    seed: *seed,
                    student_id: student.clone(),
                }))
            }
            Some(Commands::Results { session_id }) => Uuid::parse_str(session_id)
                .map(ExecutionMode::Results)
                .map_err(|e| format!("Invalid session ID '{}': {}", session_id, e)),
            Some(Commands::ShowConfig) => Ok(ExecutionMode::ShowConfig),
            None => Err(
                "No command specified. Use 'placement --help' to see available commands."
                    .to_string(),
            ),
        }
    }
}
