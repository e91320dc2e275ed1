use crate::assessment::types::OscillationPattern;
use tracing::debug;

/// Number of trailing history entries inspected for an A,B,A,B alternation
const WINDOW: usize = 4;

/// Tracks ping-pong between two levels in the level history
#[derive(Debug, Clone, Copy, Default)]
pub struct OscillationDetector;

impl OscillationDetector {
    /// Fold the latest level history into the stored pattern.
    ///
    /// A pattern is only ever extended for the pair it was created for; an
    /// alternation between a different pair leaves it untouched.
    pub fn observe(
        &self,
        current: Option<&OscillationPattern>,
        level_history: &[u32],
    ) -> Option<OscillationPattern> {
        let Some(pair) = alternating_pair(level_history) else {
            return current.cloned();
        };

        match current {
            None => {
                debug!("Oscillation detected between levels {:?}", pair);
                Some(OscillationPattern {
                    levels: pair,
                    cycles: 0.5,
                    questions_in_pattern: 1,
                    detected: true,
                })
            }
            Some(pattern) if pattern.levels == pair => {
                let mut pattern = pattern.clone();
                pattern.cycles += 0.5;
                pattern.questions_in_pattern += 1;
                debug!(
                    "Oscillation between {:?} now at {} cycles",
                    pattern.levels, pattern.cycles
                );
                Some(pattern)
            }
            Some(pattern) => Some(pattern.clone()),
        }
    }
}

/// `[low, high]` if the last four entries read exactly A,B,A,B with A != B
pub fn alternating_pair(level_history: &[u32]) -> Option<[u32; 2]> {
    if level_history.len() < WINDOW {
        return None;
    }

    let tail = &level_history[level_history.len() - WINDOW..];
    let (a, b) = (tail[0], tail[1]);
    if a != b && tail[2] == a && tail[3] == b {
        Some([a.min(b), a.max(b)])
    } else {
        None
    }
}
