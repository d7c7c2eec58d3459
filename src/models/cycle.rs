use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::models::Formula;

pub const DEFAULT_CYCLE_SECS: f64 = 60.0;
pub const DEFAULT_ACTIVE_SECS: f64 = 10.0;

/// What fraction of each repeating cycle the device spends diffusing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CycleConfig {
    /// Total cycle length in seconds; must be positive.
    pub cycle_secs: f64,
    /// Diffusing portion of the cycle, within `[0, cycle_secs]`.
    pub active_secs: f64,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            cycle_secs: DEFAULT_CYCLE_SECS,
            active_secs: DEFAULT_ACTIVE_SECS,
        }
    }
}

impl CycleConfig {
    pub fn new(cycle_secs: f64, active_secs: f64) -> Result<Self, ClientError> {
        let config = Self {
            cycle_secs,
            active_secs,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        if !self.cycle_secs.is_finite() || self.cycle_secs <= 0.0 {
            return Err(ClientError::Validation(format!(
                "cycle length must be a positive number of seconds, got {}",
                self.cycle_secs
            )));
        }
        if !self.active_secs.is_finite()
            || self.active_secs < 0.0
            || self.active_secs > self.cycle_secs
        {
            return Err(ClientError::Validation(format!(
                "diffusion duration must be within 0..={}s, got {}",
                self.cycle_secs, self.active_secs
            )));
        }
        Ok(())
    }

    /// Fraction of the cycle spent diffusing, clamped to `[0, 1]`.
    pub fn active_portion(&self) -> f64 {
        if self.cycle_secs <= 0.0 || !self.cycle_secs.is_finite() {
            return 0.0;
        }
        (self.active_secs / self.cycle_secs).clamp(0.0, 1.0)
    }
}

/// Local view of the device's cycle. Provisional until the next successful
/// status fetch overwrites the anchor with the server's `cycle_start_time`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleState {
    pub formula: Formula,
    pub config: CycleConfig,
    /// Absolute start of the current repeating cycle, epoch seconds.
    pub cycle_start_epoch_secs: f64,
    /// True once the anchor came from the server rather than an optimistic
    /// local activation.
    pub server_anchored: bool,
}
