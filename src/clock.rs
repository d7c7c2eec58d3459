use std::sync::Arc;

use chrono::Utc;

/// Injectable time source so phase computation can be tested without real
/// delays. Epoch seconds keep the same base the backend uses for
/// `cycle_start_time`.
pub trait Clock: Send + Sync {
    fn now_epoch_secs(&self) -> f64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_secs(&self) -> f64 {
        Utc::now().timestamp_millis() as f64 / 1000.0
    }
}

pub type SharedClock = Arc<dyn Clock>;
