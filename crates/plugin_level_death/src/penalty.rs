//! Death penalty rules and the experience arithmetic.

use serde::{Deserialize, Serialize};

/// An inclusive level interval mapped to a penalty percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelRange {
    pub min_level: i32,
    pub max_level: i32,
    pub percent: i32,
}

impl LevelRange {
    pub fn contains(&self, level: i32) -> bool {
        (self.min_level..=self.max_level).contains(&level)
    }
}

/// How the penalty percent is chosen for a dying player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PenaltyRule {
    /// `percent` applies from `start_level` upwards.
    Threshold { start_level: i32, percent: i32 },
    /// The first range containing the level wins; no match means no penalty.
    Ranges { ranges: Vec<LevelRange> },
    Disabled,
}

impl PenaltyRule {
    /// Signed penalty percent for a player dying at `level`.
    pub fn penalty_percent(&self, level: i32) -> i32 {
        match self {
            PenaltyRule::Threshold {
                start_level,
                percent,
            } => {
                if level >= *start_level {
                    *percent
                } else {
                    0
                }
            }
            PenaltyRule::Ranges { ranges } => ranges
                .iter()
                .find(|range| range.contains(level))
                .map_or(0, |range| range.percent),
            PenaltyRule::Disabled => 0,
        }
    }

    pub fn evaluate(&self, level: i32, current_exp: i32) -> PenaltyOutcome {
        apply_percent(current_exp, self.penalty_percent(level))
    }
}

/// Result of applying a penalty percent to a player's experience.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PenaltyOutcome {
    pub percent: i32,
    /// Signed change in experience; negative for a loss.
    pub exp_penalty: i32,
    /// Experience the player is left with, never negative.
    pub new_exp: i32,
}

impl PenaltyOutcome {
    pub fn is_penalty(&self) -> bool {
        self.percent != 0
    }

    /// Magnitude of the change, for display.
    pub fn exp_lost(&self) -> u32 {
        self.exp_penalty.unsigned_abs()
    }
}

/// `exp_penalty = floor(current_exp * percent / 100)`,
/// `new_exp = max(0, current_exp + exp_penalty)`.
pub fn apply_percent(current_exp: i32, percent: i32) -> PenaltyOutcome {
    let current = i64::from(current_exp);
    let exp_penalty = (current * i64::from(percent)).div_euclid(100);
    let new_exp = (current + exp_penalty).clamp(0, i64::from(i32::MAX));

    PenaltyOutcome {
        percent,
        exp_penalty: exp_penalty.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32,
        new_exp: new_exp as i32,
    }
}
