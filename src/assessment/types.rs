use crate::program::{QuestionId, QuestionKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Unique identifier for assessment sessions
pub type SessionId = Uuid;

/// External reference to a student record
pub type StudentId = String;

/// External reference to a school record
pub type SchoolId = String;

/// External reference to the proctor running the session
pub type ProctorId = String;

/// Session status; `Completed` and `Abandoned` are terminal
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    InProgress,
    Completed,
    Abandoned,
}

impl AssessmentStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AssessmentStatus::InProgress)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentStatus::InProgress => "in_progress",
            AssessmentStatus::Completed => "completed",
            AssessmentStatus::Abandoned => "abandoned",
        }
    }
}

impl fmt::Display for AssessmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-session tuning, fixed at creation
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    pub randomize_questions: bool,
    pub max_questions_per_level: u32,
    /// Oscillation cycles (in half-cycle steps) tolerated before stopping
    pub oscillation_tolerance: f64,
    pub min_questions_before_oscillation_stop: u32,
    pub start_level: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            randomize_questions: true,
            max_questions_per_level: 5,
            oscillation_tolerance: 2.0,
            min_questions_before_oscillation_stop: 8,
            start_level: 0,
        }
    }
}

/// Caller-supplied overrides merged onto the service defaults
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfigOverrides {
    pub randomize_questions: Option<bool>,
    pub max_questions_per_level: Option<u32>,
    pub oscillation_tolerance: Option<f64>,
    pub min_questions_before_oscillation_stop: Option<u32>,
    pub start_level: Option<u32>,
}

/// Who the session belongs to
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionOwner {
    pub student_id: StudentId,
    pub school_id: SchoolId,
    pub proctor_id: ProctorId,
}

/// Immutable snapshot of a bank question taken at session creation
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct QuestionPoolEntry {
    pub question_id: QuestionId,
    pub text: String,
    pub kind: QuestionKind,
    pub points: u32,
    pub source_level: u32,
}

/// A submitted answer, resolved against the question type at scoring time
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum AnswerInput {
    /// Rater verdict for verbal evaluation
    Verdict(bool),
    /// Option index for multiple choice
    Choice(usize),
    /// Free text, or the option text for multiple choice
    Text(String),
}

impl fmt::Display for AnswerInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerInput::Verdict(verdict) => write!(f, "{}", verdict),
            AnswerInput::Choice(index) => write!(f, "#{}", index),
            AnswerInput::Text(text) => f.write_str(text),
        }
    }
}

/// Append-only record of one answered question
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResponse {
    pub question_id: QuestionId,
    /// Estimated level of the student when the question was asked
    pub level_number: u32,
    pub question_text: String,
    pub user_answer: AnswerInput,
    pub is_correct: bool,
    /// Seconds
    pub time_spent: f64,
    pub points_earned: u32,
    pub timestamp: DateTime<Utc>,
}

/// Per-level aggregate, created on the first response at that level
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LevelAssessment {
    pub level_number: u32,
    pub questions_answered: u32,
    pub correct_answers: u32,
    pub total_points: u32,
    pub time_spent: f64,
    pub stability_count: u32,
    pub is_stable: bool,
}

impl LevelAssessment {
    pub fn new(level_number: u32) -> Self {
        Self {
            level_number,
            questions_answered: 0,
            correct_answers: 0,
            total_points: 0,
            time_spent: 0.0,
            stability_count: 0,
            is_stable: false,
        }
    }
}

/// Detected ping-pong between two levels
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OscillationPattern {
    /// `[low, high]`
    pub levels: [u32; 2],
    /// Grows by 0.5 per detected alternation
    pub cycles: f64,
    pub questions_in_pattern: u32,
    pub detected: bool,
}

impl OscillationPattern {
    pub fn lower_level(&self) -> u32 {
        self.levels[0]
    }
}

/// Why a level transition happened
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgressionReason {
    #[serde(rename = "high performance streak")]
    HighPerformanceStreak,
    #[serde(rename = "correct streak")]
    CorrectStreak,
    #[serde(rename = "wrong streak")]
    WrongStreak,
}

impl fmt::Display for ProgressionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProgressionReason::HighPerformanceStreak => "high performance streak",
            ProgressionReason::CorrectStreak => "correct streak",
            ProgressionReason::WrongStreak => "wrong streak",
        })
    }
}

/// A level change produced by one response
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LevelTransition {
    pub previous_level: u32,
    pub new_level: u32,
    pub reason: ProgressionReason,
}

/// Termination heuristics, listed in precedence order
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    #[serde(rename = "maximum questions reached")]
    MaximumQuestions,
    #[serde(rename = "maximum performance achieved")]
    MaximumPerformance,
    #[serde(rename = "minimum performance level")]
    MinimumPerformance,
    #[serde(rename = "stable at current level")]
    StableAtLevel,
    #[serde(rename = "oscillation pattern detected")]
    OscillationDetected,
    #[serde(rename = "too many questions at current level")]
    TooManyAtLevel,
    #[serde(rename = "simple bounce pattern detected")]
    SimpleBounce,
    #[serde(rename = "all questions completed")]
    AllQuestionsCompleted,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StopReason::MaximumQuestions => "maximum questions reached",
            StopReason::MaximumPerformance => "maximum performance achieved",
            StopReason::MinimumPerformance => "minimum performance level",
            StopReason::StableAtLevel => "stable at current level",
            StopReason::OscillationDetected => "oscillation pattern detected",
            StopReason::TooManyAtLevel => "too many questions at current level",
            StopReason::SimpleBounce => "simple bounce pattern detected",
            StopReason::AllQuestionsCompleted => "all questions completed",
        })
    }
}

/// Outcome of the stop-condition evaluation when a rule fires
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StopDecision {
    pub reason: StopReason,
    pub final_level: u32,
}

/// Staircase state, mutated exactly once per submitted response
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AlgorithmState {
    pub current_level: u32,
    pub correct_streak: u32,
    pub wrong_streak: u32,
    pub high_performance_streak: u32,
    pub level_history: Vec<u32>,
    pub questions_at_current_level: u32,
    pub oscillation_pattern: Option<OscillationPattern>,
    pub should_stop: bool,
    pub stop_reason: Option<StopReason>,
}

impl AlgorithmState {
    pub fn new(start_level: u32) -> Self {
        Self {
            current_level: start_level,
            correct_streak: 0,
            wrong_streak: 0,
            high_performance_streak: 0,
            level_history: vec![start_level],
            questions_at_current_level: 0,
            oscillation_pattern: None,
            should_stop: false,
            stop_reason: None,
        }
    }
}

/// One adaptive placement-test run; owns all of its child records
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AssessmentSession {
    pub id: SessionId,
    pub owner: SessionOwner,
    pub program_id: String,
    pub subject: String,
    pub config: SessionConfig,
    pub status: AssessmentStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    /// Seconds between start and end, set once terminal
    pub total_duration: Option<i64>,
    pub current_question_index: usize,
    pub final_level: Option<u32>,
    pub total_questions: u32,
    pub total_correct_answers: u32,
    pub accuracy: f64,
    pub average_time_per_question: f64,
    pub question_pool: Vec<QuestionPoolEntry>,
    pub responses: Vec<QuestionResponse>,
    pub level_assessments: BTreeMap<u32, LevelAssessment>,
    pub algorithm_state: AlgorithmState,
}

impl AssessmentSession {
    /// Pool entry the student should answer next
    pub fn current_entry(&self) -> Option<&QuestionPoolEntry> {
        self.question_pool.get(self.current_question_index)
    }

    pub fn is_pool_exhausted(&self) -> bool {
        self.current_question_index >= self.question_pool.len()
    }

    pub fn is_in_progress(&self) -> bool {
        self.status == AssessmentStatus::InProgress
    }

    /// Seconds elapsed, up to the end time for terminal sessions
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> i64 {
        self.total_duration
            .unwrap_or_else(|| (now - self.start_time).num_seconds())
    }

    pub(crate) fn finish(&mut self, status: AssessmentStatus, now: DateTime<Utc>) {
        self.status = status;
        self.end_time = Some(now);
        self.total_duration = Some((now - self.start_time).num_seconds());
    }
}
