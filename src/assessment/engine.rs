use crate::assessment::evaluator::{AnswerEvaluator, KeyedAnswerEvaluator};
use crate::assessment::factory::SessionFactory;
use crate::assessment::oscillation::OscillationDetector;
use crate::assessment::progression::LevelProgressionEngine;
use crate::assessment::recorder::ResponseRecorder;
use crate::assessment::rules::AssessmentRules;
use crate::assessment::stop::StopConditionEvaluator;
use crate::assessment::types::*;
use crate::error::{AssessmentError, Result};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info};

/// An answer as submitted for the question at the current pool position
#[derive(Debug, Clone)]
pub struct ResponseSubmission {
    pub question_id: String,
    pub user_answer: AnswerInput,
    pub time_spent: f64,
}

/// What one processed response did to the session
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseOutcome {
    pub is_correct: bool,
    pub points_earned: u32,
    pub transition: Option<LevelTransition>,
    pub stop: Option<StopDecision>,
}

/// Combines the recorder, progression, oscillation and stop components into
/// the per-response pipeline.
///
/// Every method works on a plain [`AssessmentSession`] value; locking and
/// persistence belong to the caller.
#[derive(Clone)]
pub struct AssessmentEngine {
    rules: AssessmentRules,
    factory: SessionFactory,
    recorder: ResponseRecorder,
    progression: LevelProgressionEngine,
    oscillation: OscillationDetector,
    stop: StopConditionEvaluator,
    evaluator: Arc<dyn AnswerEvaluator>,
}

impl AssessmentEngine {
    pub fn new(rules: AssessmentRules) -> Self {
        Self::with_evaluator(rules, Arc::new(KeyedAnswerEvaluator))
    }

    pub fn with_evaluator(rules: AssessmentRules, evaluator: Arc<dyn AnswerEvaluator>) -> Self {
        Self {
            factory: SessionFactory,
            recorder: ResponseRecorder,
            progression: LevelProgressionEngine::new(rules.clone()),
            oscillation: OscillationDetector,
            stop: StopConditionEvaluator::new(rules.clone()),
            rules,
            evaluator,
        }
    }

    pub fn rules(&self) -> &AssessmentRules {
        &self.rules
    }

    pub fn factory(&self) -> &SessionFactory {
        &self.factory
    }

    /// Score and apply one response: record, progress, detect oscillation,
    /// then evaluate stop conditions.
    ///
    /// All validation happens before the first mutation, so an `Err` leaves
    /// `session` untouched.
    pub fn process_response(
        &self,
        session: &mut AssessmentSession,
        submission: &ResponseSubmission,
        now: DateTime<Utc>,
    ) -> Result<ResponseOutcome> {
        ensure_in_progress(session)?;

        let entry = session.current_entry().ok_or_else(|| {
            AssessmentError::InvalidState(format!(
                "session {} has no question left to answer",
                session.id
            ))
        })?;

        if entry.question_id != submission.question_id {
            return Err(AssessmentError::Validation(format!(
                "question {} is not the current question (expected {})",
                submission.question_id, entry.question_id
            )));
        }
        if !submission.time_spent.is_finite() || submission.time_spent <= 0.0 {
            return Err(AssessmentError::Validation(format!(
                "timeSpent must be a positive number of seconds, got {}",
                submission.time_spent
            )));
        }

        let is_correct = self.evaluator.evaluate(&entry.kind, &submission.user_answer)?;
        let points_earned = if is_correct { entry.points } else { 0 };

        let response = QuestionResponse {
            question_id: entry.question_id.clone(),
            level_number: session.algorithm_state.current_level,
            question_text: entry.text.clone(),
            user_answer: submission.user_answer.clone(),
            is_correct,
            time_spent: submission.time_spent,
            points_earned,
            timestamp: now,
        };

        self.recorder.record(session, response)?;
        session.current_question_index += 1;

        let (mut state, transition) = self.progression.apply(&session.algorithm_state, is_correct);
        if transition.is_some() {
            state.oscillation_pattern = self
                .oscillation
                .observe(state.oscillation_pattern.as_ref(), &state.level_history);
        }
        session.algorithm_state = state;

        debug!(
            "Session {} response #{}: correct={}, level={}",
            session.id, session.total_questions, is_correct, session.algorithm_state.current_level
        );

        let stop = self.evaluate_and_maybe_complete(session, now);

        Ok(ResponseOutcome {
            is_correct,
            points_earned,
            transition,
            stop,
        })
    }

    /// Run the stop rules and complete the session when one fires.
    ///
    /// Shared by question delivery and response submission; a no-op on
    /// sessions that are already terminal.
    pub fn evaluate_and_maybe_complete(
        &self,
        session: &mut AssessmentSession,
        now: DateTime<Utc>,
    ) -> Option<StopDecision> {
        if !session.is_in_progress() {
            return None;
        }

        let decision = self.stop.evaluate(session)?;

        session.algorithm_state.should_stop = true;
        session.algorithm_state.stop_reason = Some(decision.reason);
        session.final_level = Some(decision.final_level);
        session.finish(AssessmentStatus::Completed, now);

        info!(
            "Session {} completed: {} (final level {})",
            session.id, decision.reason, decision.final_level
        );
        Some(decision)
    }

    /// Move an in-progress session to `Abandoned`
    pub fn abandon(&self, session: &mut AssessmentSession, now: DateTime<Utc>) -> Result<()> {
        ensure_in_progress(session)?;

        session.final_level = Some(session.algorithm_state.current_level);
        session.finish(AssessmentStatus::Abandoned, now);

        info!("Session {} abandoned", session.id);
        Ok(())
    }
}

fn ensure_in_progress(session: &AssessmentSession) -> Result<()> {
    if session.is_in_progress() {
        Ok(())
    } else {
        Err(AssessmentError::InvalidState(format!(
            "session {} is {}",
            session.id, session.status
        )))
    }
}
