//! Weights and thresholds for the synapse priority score.

use serde::{Deserialize, Serialize};
use synapse_common::{Result, SynapseError};

/// Missing fields take their default, so a config may override any subset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynapseWeights {
    /// Points per unit of reliability (reliability 1.0 → 50 points).
    pub reliability_points: f64,
    /// Reliability assumed when a study reports none.
    pub default_reliability: f64,
    /// Points per cross-document entity match.
    pub points_per_link: f64,
    /// Matches beyond this count add nothing.
    pub max_links: usize,
    /// Score strictly above this is Critical.
    pub critical_above: i64,
    /// Score strictly above this is High.
    pub high_above: i64,
}

impl Default for SynapseWeights {
    fn default() -> Self {
        Self {
            reliability_points: 50.0,
            default_reliability: 0.5,
            points_per_link: 10.0,
            max_links: 5,
            critical_above: 90,
            high_above: 75,
        }
    }
}

impl SynapseWeights {
    /// Upper bound of the connection bonus.
    pub fn max_bonus(&self) -> f64 {
        self.points_per_link * self.max_links as f64
    }

    /// Highest score a study with reliability 1.0 can reach.
    pub fn max_score(&self) -> f64 {
        self.reliability_points + self.max_bonus()
    }

    /// Weights must be non-negative, thresholds ordered, and the Critical
    /// tier reachable.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(SynapseError::Config(format!("scoring weights: {msg}")));
        if self.reliability_points < 0.0 || self.points_per_link < 0.0 {
            return fail("points must be non-negative".to_string());
        }
        if !(0.0..=1.0).contains(&self.default_reliability) {
            return fail(format!("default_reliability {} is outside [0, 1]", self.default_reliability));
        }
        if self.critical_above <= self.high_above {
            return fail(format!(
                "critical_above ({}) must exceed high_above ({})",
                self.critical_above, self.high_above
            ));
        }
        if self.critical_above as f64 >= self.max_score() {
            return fail(format!(
                "critical_above ({}) is unreachable; the maximum score is {}",
                self.critical_above,
                self.max_score()
            ));
        }
        Ok(())
    }
}
