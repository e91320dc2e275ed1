use crate::assessment::types::{SessionConfig, SessionConfigOverrides};
use crate::error::{AssessmentError, Result};
use serde::{Deserialize, Serialize};

/// Engine-wide thresholds for level progression and stopping
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AssessmentRules {
    /// Ceiling level; the floor is always 0
    pub max_level: u32,
    /// Levels at or above this count toward the high-performance streak
    pub upper_band_start: u32,
    pub skip_band_min: u32,
    pub skip_band_max: u32,
    pub skip_streak: u32,
    pub skip_step: u32,
    pub advance_streak: u32,
    pub regress_streak: u32,
    pub max_total_questions: u32,
    pub max_performance_streak: u32,
    pub max_performance_min_questions: u32,
    pub min_performance_wrong_streak: u32,
    pub min_performance_min_questions: u32,
    pub stable_min_questions: u32,
}

impl Default for AssessmentRules {
    fn default() -> Self {
        Self {
            max_level: 9,
            upper_band_start: 5,
            skip_band_min: 6,
            skip_band_max: 8,
            skip_streak: 3,
            skip_step: 2,
            advance_streak: 2,
            regress_streak: 2,
            max_total_questions: 35,
            max_performance_streak: 2,
            max_performance_min_questions: 15,
            min_performance_wrong_streak: 4,
            min_performance_min_questions: 10,
            stable_min_questions: 12,
        }
    }
}

impl AssessmentRules {
    pub fn validate(&self) -> Result<()> {
        if self.skip_band_min > self.skip_band_max {
            return Err(AssessmentError::Validation(format!(
                "skip band is empty: {}..={}",
                self.skip_band_min, self.skip_band_max
            )));
        }
        if self.advance_streak == 0 || self.regress_streak == 0 || self.skip_streak == 0 {
            return Err(AssessmentError::Validation(
                "streak thresholds must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Merge caller overrides onto `base` and check the result against these rules
    pub fn resolve_config(
        &self,
        base: &SessionConfig,
        overrides: Option<&SessionConfigOverrides>,
    ) -> Result<SessionConfig> {
        let mut config = base.clone();

        if let Some(o) = overrides {
            if let Some(v) = o.randomize_questions {
                config.randomize_questions = v;
            }
            if let Some(v) = o.max_questions_per_level {
                config.max_questions_per_level = v;
            }
            if let Some(v) = o.oscillation_tolerance {
                config.oscillation_tolerance = v;
            }
            if let Some(v) = o.min_questions_before_oscillation_stop {
                config.min_questions_before_oscillation_stop = v;
            }
            if let Some(v) = o.start_level {
                config.start_level = v;
            }
        }

        if config.max_questions_per_level == 0 {
            return Err(AssessmentError::Validation(
                "maxQuestionsPerLevel must be at least 1".to_string(),
            ));
        }
        if !config.oscillation_tolerance.is_finite() || config.oscillation_tolerance <= 0.0 {
            return Err(AssessmentError::Validation(
                "oscillationTolerance must be a positive number".to_string(),
            ));
        }
        if config.start_level > self.max_level {
            return Err(AssessmentError::Validation(format!(
                "startLevel {} exceeds the highest level {}",
                config.start_level, self.max_level
            )));
        }

        Ok(config)
    }
}
