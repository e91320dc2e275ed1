use crate::assessment::types::*;
use crate::error::{AssessmentError, Result};
use crate::program::Program;
use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::BTreeMap;
use tracing::debug;

/// Builds fresh sessions from a program snapshot
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionFactory;

impl SessionFactory {
    /// Flatten every level's questions into one pool and initialize the
    /// algorithm state at the configured start level.
    ///
    /// Pool order carries no level semantics once shuffled; the level walk is
    /// driven by [`AlgorithmState`] alone.
    pub fn build<R: Rng + ?Sized>(
        &self,
        owner: SessionOwner,
        program: &Program,
        config: SessionConfig,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<AssessmentSession> {
        if !program.has_questions() {
            return Err(AssessmentError::NotFound {
                entity: "program levels with questions",
                id: program.id.clone(),
            });
        }

        let mut question_pool = flatten_pool(program);
        if config.randomize_questions {
            question_pool.shuffle(rng);
        }

        debug!(
            "Built pool of {} questions for program {} (randomized: {})",
            question_pool.len(),
            program.id,
            config.randomize_questions
        );

        let algorithm_state = AlgorithmState::new(config.start_level);

        Ok(AssessmentSession {
            id: SessionId::new_v4(),
            owner,
            program_id: program.id.clone(),
            subject: program.subject.clone(),
            config,
            status: AssessmentStatus::InProgress,
            start_time: now,
            end_time: None,
            total_duration: None,
            current_question_index: 0,
            final_level: None,
            total_questions: 0,
            total_correct_answers: 0,
            accuracy: 0.0,
            average_time_per_question: 0.0,
            question_pool,
            responses: Vec::new(),
            level_assessments: BTreeMap::new(),
            algorithm_state,
        })
    }
}

/// Copy each bank question into a pool entry tagged with its level
fn flatten_pool(program: &Program) -> Vec<QuestionPoolEntry> {
    program
        .levels
        .iter()
        .flat_map(|level| {
            level.questions.iter().map(move |question| QuestionPoolEntry {
                question_id: question.id.clone(),
                text: question.text.clone(),
                kind: question.kind.clone(),
                points: question.points,
                source_level: level.number,
            })
        })
        .collect()
}
