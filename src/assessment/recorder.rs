use crate::assessment::types::*;
use crate::error::{AssessmentError, Result};

/// Appends responses and maintains the roll-up and per-level statistics
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseRecorder;

impl ResponseRecorder {
    pub fn record(&self, session: &mut AssessmentSession, response: QuestionResponse) -> Result<()> {
        if !response.time_spent.is_finite() || response.time_spent <= 0.0 {
            return Err(AssessmentError::Validation(format!(
                "timeSpent must be a positive number of seconds, got {}",
                response.time_spent
            )));
        }

        session.total_questions += 1;
        if response.is_correct {
            session.total_correct_answers += 1;
        }
        session.accuracy = accuracy(session.total_correct_answers, session.total_questions);

        let current_level = session.algorithm_state.current_level;
        let max_per_level = session.config.max_questions_per_level;

        let level = session
            .level_assessments
            .entry(response.level_number)
            .or_insert_with(|| LevelAssessment::new(response.level_number));
        level.questions_answered += 1;
        if response.is_correct {
            level.correct_answers += 1;
        }
        level.total_points += response.points_earned;
        level.time_spent += response.time_spent;
        if response.level_number == current_level {
            level.stability_count += 1;
            level.is_stable = level.stability_count >= max_per_level;
        }

        session.responses.push(response);

        let total_time: f64 = session.responses.iter().map(|r| r.time_spent).sum();
        session.average_time_per_question = total_time / session.responses.len() as f64;

        Ok(())
    }
}

/// Percentage of correct answers; 0 when nothing has been answered
pub fn accuracy(correct: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * correct as f64 / total as f64
    }
}
