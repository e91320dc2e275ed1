//! Termination heuristics.
//!
//! Rules run in a fixed precedence order and the first match wins:
//!
//! 1. maximum questions reached
//! 2. maximum performance achieved (ceiling level on a correct streak)
//! 3. minimum performance level (floor level on a long wrong streak)
//! 4. stable at current level
//! 5. oscillation pattern detected (tracked pattern, tolerance in cycles)
//! 6. too many questions at current level
//! 7. simple bounce pattern detected (raw history tail, lower threshold)
//! 8. all questions completed
//!
//! Rules 5 and 7 overlap on purpose: 5 reads the accumulated
//! [`OscillationPattern`](crate::assessment::OscillationPattern) while 7 looks
//! only at the last four history entries.

use crate::assessment::oscillation::alternating_pair;
use crate::assessment::rules::AssessmentRules;
use crate::assessment::types::*;

#[derive(Debug, Clone)]
pub struct StopConditionEvaluator {
    rules: AssessmentRules,
}

impl StopConditionEvaluator {
    pub fn new(rules: AssessmentRules) -> Self {
        Self { rules }
    }

    /// Return the first stop rule that fires for `session`, if any
    pub fn evaluate(&self, session: &AssessmentSession) -> Option<StopDecision> {
        let rules = &self.rules;
        let config = &session.config;
        let state = &session.algorithm_state;
        let total = session.total_questions;
        let level = state.current_level;
        let oscillation_min = config.min_questions_before_oscillation_stop;

        let stop = |reason, final_level| Some(StopDecision { reason, final_level });

        if total >= rules.max_total_questions {
            return stop(StopReason::MaximumQuestions, level);
        }

        if level == rules.max_level
            && state.correct_streak >= rules.max_performance_streak
            && total >= rules.max_performance_min_questions
        {
            return stop(StopReason::MaximumPerformance, level);
        }

        if state.wrong_streak >= rules.min_performance_wrong_streak
            && level == 0
            && total >= rules.min_performance_min_questions
        {
            return stop(StopReason::MinimumPerformance, level);
        }

        let stable = session
            .level_assessments
            .get(&level)
            .is_some_and(|assessment| assessment.is_stable);
        if stable && total >= rules.stable_min_questions {
            return stop(StopReason::StableAtLevel, level);
        }

        if total >= oscillation_min
            && let Some(pattern) = &state.oscillation_pattern
            && pattern.cycles >= config.oscillation_tolerance
        {
            return stop(StopReason::OscillationDetected, pattern.lower_level());
        }

        if total >= oscillation_min
            && state.questions_at_current_level
                >= config.max_questions_per_level.saturating_mul(2)
        {
            return stop(StopReason::TooManyAtLevel, level);
        }

        if let Some([low, _]) = alternating_pair(&state.level_history)
            && total >= 4u32.max(oscillation_min.saturating_sub(2))
        {
            return stop(StopReason::SimpleBounce, low);
        }

        if session.is_pool_exhausted() {
            return stop(StopReason::AllQuestionsCompleted, level);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::factory::SessionFactory;
    use crate::program::{Level, Program, Question, QuestionKind};
    use chrono::Utc;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn session_with_pool(pool_size: usize) -> AssessmentSession {
        let program = Program {
            id: "p".to_string(),
            name: "P".to_string(),
            subject: "s".to_string(),
            levels: vec![Level {
                number: 0,
                name: String::new(),
                questions: (0..pool_size)
                    .map(|i| Question {
                        id: format!("q{}", i),
                        text: String::new(),
                        points: 1,
                        kind: QuestionKind::VerbalEvaluation,
                    })
                    .collect(),
            }],
        };
        let config = SessionConfig {
            randomize_questions: false,
            ..Default::default()
        };
        SessionFactory
            .build(
                SessionOwner {
                    student_id: "s".to_string(),
                    school_id: "sc".to_string(),
                    proctor_id: "p".to_string(),
                },
                &program,
                config,
                Utc::now(),
                &mut StdRng::seed_from_u64(0),
            )
            .unwrap()
    }

    fn answered(session: &mut AssessmentSession, count: u32) {
        session.total_questions = count;
        session.current_question_index = count as usize;
    }

    fn evaluator() -> StopConditionEvaluator {
        StopConditionEvaluator::new(AssessmentRules::default())
    }

    #[test]
    fn test_fresh_session_continues() {
        let session = session_with_pool(40);
        assert_eq!(evaluator().evaluate(&session), None);
    }

    #[test]
    fn test_maximum_questions_wins_over_everything() {
        let mut session = session_with_pool(40);
        answered(&mut session, 35);
        session.algorithm_state.wrong_streak = 4;

        let decision = evaluator().evaluate(&session).unwrap();
        assert_eq!(decision.reason, StopReason::MaximumQuestions);
        assert_eq!(decision.final_level, 0);
    }

    #[test]
    fn test_maximum_performance() {
        let mut session = session_with_pool(40);
        answered(&mut session, 15);
        session.algorithm_state.current_level = 9;
        session.algorithm_state.correct_streak = 2;

        let decision = evaluator().evaluate(&session).unwrap();
        assert_eq!(decision.reason, StopReason::MaximumPerformance);
        assert_eq!(decision.final_level, 9);

        answered(&mut session, 14);
        assert_ne!(
            evaluator().evaluate(&session).map(|d| d.reason),
            Some(StopReason::MaximumPerformance)
        );
    }

    #[test]
    fn test_minimum_performance_at_floor() {
        let mut session = session_with_pool(40);
        answered(&mut session, 10);
        session.algorithm_state.wrong_streak = 4;
        session.algorithm_state.questions_at_current_level = 4;

        let decision = evaluator().evaluate(&session).unwrap();
        assert_eq!(
            decision,
            StopDecision {
                reason: StopReason::MinimumPerformance,
                final_level: 0,
            }
        );
    }

    #[test]
    fn test_stable_level_requires_twelve_questions() {
        let mut session = session_with_pool(40);
        let mut level = LevelAssessment::new(0);
        level.stability_count = 5;
        level.is_stable = true;
        session.level_assessments.insert(0, level);

        answered(&mut session, 11);
        assert_eq!(evaluator().evaluate(&session), None);

        answered(&mut session, 12);
        let decision = evaluator().evaluate(&session).unwrap();
        assert_eq!(decision.reason, StopReason::StableAtLevel);
    }

    #[test]
    fn test_oscillation_stops_at_lower_level() {
        let mut session = session_with_pool(40);
        answered(&mut session, 9);
        session.algorithm_state.current_level = 4;
        session.algorithm_state.level_history = vec![3, 4, 3, 4, 5, 4];
        session.algorithm_state.oscillation_pattern = Some(OscillationPattern {
            levels: [3, 4],
            cycles: 2.0,
            questions_in_pattern: 4,
            detected: true,
        });

        let decision = evaluator().evaluate(&session).unwrap();
        assert_eq!(decision.reason, StopReason::OscillationDetected);
        assert_eq!(decision.final_level, 3);
    }

    #[test]
    fn test_oscillation_below_tolerance_continues() {
        let mut session = session_with_pool(40);
        answered(&mut session, 9);
        session.algorithm_state.level_history = vec![0, 1, 2];
        session.algorithm_state.current_level = 2;
        session.algorithm_state.oscillation_pattern = Some(OscillationPattern {
            levels: [3, 4],
            cycles: 1.5,
            questions_in_pattern: 3,
            detected: true,
        });

        assert_eq!(evaluator().evaluate(&session), None);
    }

    #[test]
    fn test_too_many_questions_at_level() {
        let mut session = session_with_pool(40);
        answered(&mut session, 10);
        session.algorithm_state.current_level = 2;
        session.algorithm_state.questions_at_current_level = 10;

        let decision = evaluator().evaluate(&session).unwrap();
        assert_eq!(decision.reason, StopReason::TooManyAtLevel);
        assert_eq!(decision.final_level, 2);
    }

    #[test]
    fn test_per_level_limit_saturates() {
        let mut session = session_with_pool(40);
        session.config.max_questions_per_level = 3_000_000_000;
        answered(&mut session, 10);
        session.algorithm_state.current_level = 2;
        session.algorithm_state.questions_at_current_level = 10;

        assert_eq!(evaluator().evaluate(&session), None);

        session.algorithm_state.questions_at_current_level = u32::MAX;
        assert_eq!(
            evaluator().evaluate(&session).map(|d| d.reason),
            Some(StopReason::TooManyAtLevel)
        );
    }

    #[test]
    fn test_simple_bounce_uses_lower_threshold() {
        let mut session = session_with_pool(40);
        session.algorithm_state.current_level = 1;
        session.algorithm_state.level_history = vec![0, 1, 2, 1, 2, 1];

        answered(&mut session, 5);
        assert_eq!(evaluator().evaluate(&session), None);

        answered(&mut session, 6);
        let decision = evaluator().evaluate(&session).unwrap();
        assert_eq!(decision.reason, StopReason::SimpleBounce);
        assert_eq!(decision.final_level, 1);
    }

    #[test]
    fn test_simple_bounce_floor_of_four() {
        let mut session = session_with_pool(40);
        session.config.min_questions_before_oscillation_stop = 2;
        session.algorithm_state.current_level = 1;
        session.algorithm_state.level_history = vec![1, 2, 1, 2, 1];

        answered(&mut session, 3);
        assert_eq!(evaluator().evaluate(&session), None);

        answered(&mut session, 4);
        assert_eq!(
            evaluator().evaluate(&session).map(|d| d.reason),
            Some(StopReason::SimpleBounce)
        );
    }

    #[test]
    fn test_pool_exhaustion() {
        let mut session = session_with_pool(3);
        answered(&mut session, 3);

        let decision = evaluator().evaluate(&session).unwrap();
        assert_eq!(decision.reason, StopReason::AllQuestionsCompleted);
        assert_eq!(decision.final_level, 0);
    }
}
