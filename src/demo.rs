use log::{info, warn};
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::models::{CycleConfig, Formula, DEFAULT_CYCLE_SECS};
use crate::sync::ProgressSynchronizer;

/// Demo tour order.
pub const DEMO_SEQUENCE: [Formula; 4] = [
    Formula::Yellow,
    Formula::Green,
    Formula::Blue,
    Formula::Red,
];

const DEMO_STEP: Duration = Duration::from_secs(5);
const DEMO_ACTIVE_SECS: f64 = 5.0;

/// Cycle through every formula for five seconds each, then deactivate.
/// Cancelling mid-tour still deactivates.
pub async fn run_demo(sync: &ProgressSynchronizer, cancel: &CancellationToken) -> Result<()> {
    let config = CycleConfig {
        cycle_secs: DEFAULT_CYCLE_SECS,
        active_secs: DEMO_ACTIVE_SECS,
    };

    for formula in DEMO_SEQUENCE {
        if cancel.is_cancelled() {
            break;
        }
        info!("demo step: {}", formula.display_name());
        if let Err(err) = sync.activate(formula, config).await {
            // A failed step should not end the tour; the notifier already
            // surfaced the error.
            warn!("demo step {formula} failed: {err}");
        }

        tokio::select! {
            _ = tokio::time::sleep(DEMO_STEP) => {}
            _ = cancel.cancelled() => break,
        }
    }

    sync.deactivate().await?;
    Ok(())
}
