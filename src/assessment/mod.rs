//! Adaptive placement engine.
//!
//! Pure `(state, event) -> state` components that need no persistence layer:
//!
//! - [`SessionFactory`]: snapshots and optionally shuffles the question pool
//! - [`ResponseRecorder`]: appends responses and maintains statistics
//! - [`LevelProgressionEngine`]: streak-driven level staircase
//! - [`OscillationDetector`]: two-level ping-pong tracking
//! - [`StopConditionEvaluator`]: ordered termination heuristics
//! - [`AssessmentEngine`]: the per-response pipeline tying them together

pub mod engine;
pub mod evaluator;
pub mod factory;
pub mod oscillation;
pub mod progression;
pub mod recorder;
pub mod rules;
pub mod stop;
pub mod types;


pub use engine::*;
pub use evaluator::*;
pub use factory::*;
pub use oscillation::*;
pub use progression::*;
pub use recorder::*;
pub use rules::*;
pub use stop::*;
pub use types::*;
