//! # Adaptive Placement
//!
//! Adaptive placement and progress assessment engine for multi-level learning
//! programs. A session walks a student's estimated level up and down a
//! staircase driven by answer streaks, tracks level oscillation, and stops on
//! the first of several ordered heuristics, keeping a replayable history.
//!
//! ## Architecture Overview
//!
//! - **[`assessment`]**: Pure engine components (pool factory, response
//!   recorder, level progression, oscillation detection, stop conditions)
//! - **[`session`]**: Session lifecycle service with per-session locking,
//!   all-or-nothing commits and pluggable persistence
//! - **[`program`]**: Program catalog and question bank types
//! - **[`cli`]**: Command-line front end and configuration discovery
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use adaptive_placement::program::InMemoryCatalog;
//! use adaptive_placement::session::{
//!     AssessmentService, CreateSessionRequest, MemoryStore, ServiceConfig,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let catalog = Arc::new(InMemoryCatalog::new());
//!     catalog.load_file("programs/english.toml")?;
//!
//!     let service = AssessmentService::new(
//!         ServiceConfig::default(),
//!         catalog,
//!         Arc::new(MemoryStore::new()),
//!     )?;
//!
//!     let session = service
//!         .create_session(CreateSessionRequest {
//!             student_id: "student-1".to_string(),
//!             school_id: "school-1".to_string(),
//!             proctor_id: "proctor-1".to_string(),
//!             program_id: "english".to_string(),
//!             config: None,
//!         })
//!         .await?;
//!
//!     println!("Started session {}", session.id);
//!     Ok(())
//! }
//! ```

/// Adaptive placement engine.
///
/// Session factory, response recording, level progression, oscillation
/// detection and stop-condition evaluation as pure state transformations.
pub mod assessment;

/// Session lifecycle service.
///
/// Creates sessions, delivers questions, scores responses and serializes
/// every mutation per session.
pub mod session;

/// Program catalog and question bank types.
pub mod program;

/// Error taxonomy shared by all operations.
pub mod error;

/// Environment constants and path utilities.
pub mod env;

/// Command-line interface.
pub mod cli;

pub use assessment::{
    AlgorithmState, AnswerInput, AssessmentEngine, AssessmentRules, AssessmentSession,
    AssessmentStatus, SessionConfig, SessionId, StopReason,
};
pub use error::{AssessmentError, ErrorBody, ErrorKind};
pub use program::{InMemoryCatalog, Program, ProgramCatalog};
pub use session::{AssessmentService, FileStore, MemoryStore, ServiceConfig, SessionStore};
