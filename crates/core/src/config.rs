//! Simulation parameters

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Parameters shared by every propagator and the engine loop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Time advanced per generation
    pub delta_time: f64,
    /// Ticks a solid cell burns before it is exhausted; 0 disables combustion
    pub max_burning_time: u32,
    /// Last generation to compute; the run ends once it is published
    /// (`None` runs until stopped)
    pub max_generations: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            delta_time: 0.5,
            max_burning_time: 60,
            max_generations: None,
        }
    }
}

impl SimulationConfig {
    /// # Errors
    ///
    /// [`ConfigError::InvalidDeltaTime`] if `delta_time` is not finite and positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.delta_time.is_finite() || self.delta_time <= 0.0 {
            return Err(ConfigError::InvalidDeltaTime(self.delta_time));
        }
        Ok(())
    }

    /// Whether any cell may ever ignite
    #[inline]
    pub fn combustion_enabled(&self) -> bool {
        self.max_burning_time != 0
    }
}
