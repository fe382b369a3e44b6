use thiserror::Error;

/// Global constants for one growth run. Never mutated while growing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GrowthConfig {
    /// An attractor at or below this distance from its nearest node is
    /// consumed and permanently removed.
    pub kill_distance: f32,
    /// An attractor within this distance (but outside the kill
    /// distance) pulls on its nearest node.
    pub influence_distance: f32,
    /// Length of the step a node takes toward the averaged pull.
    pub growth_step: f32,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            kill_distance: 0.1,
            influence_distance: 1.0,
            growth_step: 0.1,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("kill_distance ({kill}) must not exceed influence_distance ({influence})")]
    KillExceedsInfluence { kill: f32, influence: f32 },
    #[error("growth_step must be positive and finite, got {0}")]
    InvalidStep(f32),
    #[error("distances must be non-negative and finite (kill {kill}, influence {influence})")]
    InvalidDistance { kill: f32, influence: f32 },
}

impl GrowthConfig {
    /// Checks the configuration before any growth happens, so a bad
    /// setup never produces a partially grown tree.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.kill_distance.is_finite()
            || !self.influence_distance.is_finite()
            || self.kill_distance < 0.0
            || self.influence_distance < 0.0
        {
            return Err(ConfigError::InvalidDistance {
                kill: self.kill_distance,
                influence: self.influence_distance,
            });
        }
        if self.kill_distance > self.influence_distance {
            return Err(ConfigError::KillExceedsInfluence {
                kill: self.kill_distance,
                influence: self.influence_distance,
            });
        }
        if !self.growth_step.is_finite() || self.growth_step <= 0.0 {
            return Err(ConfigError::InvalidStep(self.growth_step));
        }
        Ok(())
    }
}
