//! Streak-driven staircase that moves the estimated level.
//!
//! Rules are checked in order (skip-ahead, advance, regress) and the first
//! match wins. The high-performance streak is cleared only by an incorrect
//! answer or a skip-ahead; ordinary advances and regressions leave it intact.

use crate::assessment::rules::AssessmentRules;
use crate::assessment::types::*;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct LevelProgressionEngine {
    rules: AssessmentRules,
}

impl LevelProgressionEngine {
    pub fn new(rules: AssessmentRules) -> Self {
        Self { rules }
    }

    /// Apply one response outcome to `state`, returning the next state and the
    /// transition it caused, if any.
    pub fn apply(
        &self,
        state: &AlgorithmState,
        is_correct: bool,
    ) -> (AlgorithmState, Option<LevelTransition>) {
        let mut next = state.clone();
        let level = state.current_level;

        if is_correct {
            next.correct_streak += 1;
            next.wrong_streak = 0;
            if level >= self.rules.upper_band_start {
                next.high_performance_streak += 1;
            }
        } else {
            next.wrong_streak += 1;
            next.correct_streak = 0;
            next.high_performance_streak = 0;
        }
        next.questions_at_current_level += 1;

        let transition = self.select_transition(&next);

        if let Some(transition) = transition {
            next.current_level = transition.new_level;
            next.level_history.push(transition.new_level);
            next.correct_streak = 0;
            next.wrong_streak = 0;
            next.questions_at_current_level = 0;
            if transition.reason == ProgressionReason::HighPerformanceStreak {
                next.high_performance_streak = 0;
            }

            debug!(
                "Level {} -> {} ({})",
                transition.previous_level, transition.new_level, transition.reason
            );
        }

        (next, transition)
    }

    fn select_transition(&self, state: &AlgorithmState) -> Option<LevelTransition> {
        let level = state.current_level;
        let rules = &self.rules;

        let (new_level, reason) = if state.high_performance_streak >= rules.skip_streak
            && (rules.skip_band_min..=rules.skip_band_max).contains(&level)
            && level < rules.max_level
        {
            (
                (level + rules.skip_step).min(rules.max_level),
                ProgressionReason::HighPerformanceStreak,
            )
        } else if state.correct_streak >= rules.advance_streak && level < rules.max_level {
            (level + 1, ProgressionReason::CorrectStreak)
        } else if state.wrong_streak >= rules.regress_streak && level > 0 {
            (level - 1, ProgressionReason::WrongStreak)
        } else {
            return None;
        };

        Some(LevelTransition {
            previous_level: level,
            new_level,
            reason,
        })
    }
}
