//! Request and response shapes for the public session operations.
//!
//! Question projections never carry answer keys.

use crate::assessment::*;
use crate::program::ProgramId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub student_id: StudentId,
    pub school_id: SchoolId,
    pub proctor_id: ProctorId,
    pub program_id: ProgramId,
    #[serde(default)]
    pub config: Option<SessionConfigOverrides>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponseRequest {
    pub question_id: String,
    pub user_answer: AnswerInput,
    /// Seconds, must be positive
    pub time_spent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedSession {
    pub id: SessionId,
    pub subject: String,
    /// Size of the snapshotted question pool
    pub total_questions: usize,
    pub status: AssessmentStatus,
    pub start_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub id: String,
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub level_number: u32,
    pub points: u32,
}

impl From<&QuestionPoolEntry> for QuestionView {
    fn from(entry: &QuestionPoolEntry) -> Self {
        Self {
            id: entry.question_id.clone(),
            text: entry.text.clone(),
            question_type: entry.kind.type_name().to_string(),
            options: entry.kind.public_options(),
            level_number: entry.source_level,
            points: entry.points,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionProgress {
    pub total_questions: u32,
    pub current_question_index: usize,
    pub accuracy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalResults {
    pub final_level: Option<u32>,
    pub total_questions: u32,
    pub total_correct_answers: u32,
    pub accuracy: f64,
    /// Seconds
    pub duration: i64,
}

impl FinalResults {
    pub fn from_session(session: &AssessmentSession, now: DateTime<Utc>) -> Self {
        Self {
            final_level: session.final_level,
            total_questions: session.total_questions,
            total_correct_answers: session.total_correct_answers,
            accuracy: session.accuracy,
            duration: session.elapsed_seconds(now),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextQuestion {
    pub has_next_question: bool,
    pub question: QuestionView,
    pub current_level: u32,
    pub progress: QuestionProgress,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionFinished {
    pub has_next_question: bool,
    pub should_stop: bool,
    /// `None` for abandoned sessions
    pub stop_reason: Option<StopReason>,
    pub status: AssessmentStatus,
    pub final_results: FinalResults,
}

/// Result of asking for the current question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CurrentQuestion {
    Next(NextQuestion),
    Finished(SessionFinished),
}

impl CurrentQuestion {
    pub fn from_session(session: &AssessmentSession, now: DateTime<Utc>) -> Self {
        match session.current_entry() {
            Some(entry) if session.is_in_progress() => CurrentQuestion::Next(NextQuestion {
                has_next_question: true,
                question: QuestionView::from(entry),
                current_level: session.algorithm_state.current_level,
                progress: QuestionProgress {
                    total_questions: session.total_questions,
                    current_question_index: session.current_question_index,
                    accuracy: session.accuracy,
                },
            }),
            _ => CurrentQuestion::Finished(SessionFinished {
                has_next_question: false,
                should_stop: true,
                stop_reason: session.algorithm_state.stop_reason,
                status: session.status,
                final_results: FinalResults::from_session(session, now),
            }),
        }
    }

    pub fn has_next_question(&self) -> bool {
        matches!(self, CurrentQuestion::Next(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitProgress {
    pub total_questions: u32,
    pub total_correct_answers: u32,
    pub accuracy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOutcome {
    pub is_correct: bool,
    pub points_earned: u32,
    pub current_level: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progression: Option<LevelTransition>,
    pub progress: SubmitProgress,
    pub session_complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<StopReason>,
}

impl SubmitOutcome {
    pub fn new(session: &AssessmentSession, outcome: &ResponseOutcome) -> Self {
        Self {
            is_correct: outcome.is_correct,
            points_earned: outcome.points_earned,
            current_level: session.algorithm_state.current_level,
            progression: outcome.transition,
            progress: SubmitProgress {
                total_questions: session.total_questions,
                total_correct_answers: session.total_correct_answers,
                accuracy: session.accuracy,
            },
            session_complete: outcome.stop.is_some(),
            stop_reason: outcome.stop.map(|decision| decision.reason),
        }
    }
}

/// Resolved session configuration as reported in results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfigView {
    pub randomize_questions: bool,
    pub max_questions_per_level: u32,
    pub oscillation_tolerance: f64,
    pub min_questions_before_oscillation_stop: u32,
    pub start_level: u32,
}

impl From<&SessionConfig> for SessionConfigView {
    fn from(config: &SessionConfig) -> Self {
        Self {
            randomize_questions: config.randomize_questions,
            max_questions_per_level: config.max_questions_per_level,
            oscillation_tolerance: config.oscillation_tolerance,
            min_questions_before_oscillation_stop: config.min_questions_before_oscillation_stop,
            start_level: config.start_level,
        }
    }
}

/// Full projection of a session in any status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResults {
    pub id: SessionId,
    pub owner: SessionOwner,
    pub program_id: ProgramId,
    pub subject: String,
    pub config: SessionConfigView,
    pub status: AssessmentStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub total_duration: Option<i64>,
    pub final_level: Option<u32>,
    pub total_questions: u32,
    pub total_correct_answers: u32,
    pub accuracy: f64,
    pub average_time_per_question: f64,
    pub pool_size: usize,
    pub responses: Vec<QuestionResponse>,
    pub level_assessments: Vec<LevelAssessment>,
    pub algorithm_state: AlgorithmState,
}

impl From<&AssessmentSession> for SessionResults {
    fn from(session: &AssessmentSession) -> Self {
        Self {
            id: session.id,
            owner: session.owner.clone(),
            program_id: session.program_id.clone(),
            subject: session.subject.clone(),
            config: SessionConfigView::from(&session.config),
            status: session.status,
            start_time: session.start_time,
            end_time: session.end_time,
            total_duration: session.total_duration,
            final_level: session.final_level,
            total_questions: session.total_questions,
            total_correct_answers: session.total_correct_answers,
            accuracy: session.accuracy,
            average_time_per_question: session.average_time_per_question,
            pool_size: session.question_pool.len(),
            responses: session.responses.clone(),
            level_assessments: session.level_assessments.values().cloned().collect(),
            algorithm_state: session.algorithm_state.clone(),
        }
    }
}

/// One line of a student's assessment history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: SessionId,
    pub program_id: ProgramId,
    pub subject: String,
    pub status: AssessmentStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub final_level: Option<u32>,
    pub total_questions: u32,
    pub accuracy: f64,
}

impl From<&AssessmentSession> for SessionSummary {
    fn from(session: &AssessmentSession) -> Self {
        Self {
            id: session.id,
            program_id: session.program_id.clone(),
            subject: session.subject.clone(),
            status: session.status,
            start_time: session.start_time,
            end_time: session.end_time,
            final_level: session.final_level,
            total_questions: session.total_questions,
            accuracy: session.accuracy,
        }
    }
}
