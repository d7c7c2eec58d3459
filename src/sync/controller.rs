use std::sync::Arc;

use log::{error, info};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::api::SharedApi;
use crate::clock::SharedClock;
use crate::error::{ClientError, Result};
use crate::models::{ActivateRequest, ActivationResponse, CycleConfig, DeviceStatus, Formula};
use crate::notify::SharedNotifier;
use crate::sync::loop_worker::sync_loop;
use crate::sync::state::{ReconcileOutcome, SyncState};
use crate::sync::surface::SharedSurface;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(33);

struct Worker {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Keeps the on-screen progress indicator consistent with server-reported
/// cycle timing. Owns a single animation/poll task as an explicit cancellable
/// handle, spawned on first use and kept alive until [`shutdown`]: polling
/// continues while idle so a device that starts later is picked up. All
/// collaborators are injected so tests can substitute doubles.
///
/// [`shutdown`]: ProgressSynchronizer::shutdown
pub struct ProgressSynchronizer {
    state: Arc<Mutex<SyncState>>,
    api: SharedApi,
    notifier: SharedNotifier,
    clock: SharedClock,
    surface: SharedSurface,
    worker: Mutex<Option<Worker>>,
    frame_interval: Duration,
    poll_interval: Duration,
}

impl ProgressSynchronizer {
    pub fn new(
        api: SharedApi,
        notifier: SharedNotifier,
        clock: SharedClock,
        surface: SharedSurface,
    ) -> Self {
        Self::with_intervals(
            api,
            notifier,
            clock,
            surface,
            DEFAULT_FRAME_INTERVAL,
            DEFAULT_POLL_INTERVAL,
        )
    }

    pub fn with_intervals(
        api: SharedApi,
        notifier: SharedNotifier,
        clock: SharedClock,
        surface: SharedSurface,
        frame_interval: Duration,
        poll_interval: Duration,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(SyncState::new())),
            api,
            notifier,
            clock,
            surface,
            worker: Mutex::new(None),
            frame_interval,
            poll_interval,
        }
    }

    /// Activate a formula. Renders optimistically before the request
    /// resolves; on failure the prior state is restored and the error
    /// surfaced through the notifier.
    pub async fn activate(
        &self,
        formula: Formula,
        config: CycleConfig,
    ) -> Result<ActivationResponse> {
        config.validate()?;

        let prior = {
            let mut guard = self.state.lock().await;
            let prior = guard.clone();
            guard.begin_activation(formula, config, self.clock.now_epoch_secs());
            prior
        };
        self.ensure_worker().await;

        match self.api.activate(&ActivateRequest::new(formula, config)).await {
            Ok(response) => {
                self.state.lock().await.confirm_running();
                self.notifier.success(&format!(
                    "{} formula activated ({:.0}s of {:.0}s)",
                    formula.display_name(),
                    config.active_secs,
                    config.cycle_secs
                ));
                if let Some(paused) = &response.paused_schedule {
                    self.notifier.warning(&format!(
                        "schedule for {} paused while the manual formula runs",
                        paused.formula.display_name()
                    ));
                }
                Ok(response)
            }
            Err(err) => {
                self.notify_request_failure("activate formula", &err);
                let was_running = prior.is_running();
                {
                    let mut guard = self.state.lock().await;
                    *guard = prior;
                    if was_running {
                        // The reverted formula's arc needs redrawing.
                        guard.mark_arc_dirty();
                    }
                }
                if !was_running {
                    self.surface.clear();
                }
                Err(err)
            }
        }
    }

    /// Clear local state and the widget, then tell the backend. The worker
    /// keeps polling; a failed request or a later activation re-syncs.
    pub async fn deactivate(&self) -> Result<ActivationResponse> {
        self.state.lock().await.clear();
        self.surface.clear();

        match self.api.deactivate().await {
            Ok(response) => {
                self.notifier.success("All formulas deactivated");
                Ok(response)
            }
            Err(err) => {
                self.notify_request_failure("deactivate formulas", &err);
                Err(err)
            }
        }
    }

    /// Change the diffusing duration while running. The cycle restarts and
    /// the indicator snaps to phase 0 by design; the arc is recomputed.
    pub async fn set_active_duration(&self, active_secs: f64) -> Result<ActivationResponse> {
        let (formula, config) = {
            let guard = self.state.lock().await;
            match (guard.formula(), guard.config()) {
                (Some(formula), Some(config)) if guard.is_running() => (formula, config),
                _ => {
                    return Err(ClientError::State(
                        "no active formula to reconfigure".into(),
                    ))
                }
            }
        };

        let updated = CycleConfig::new(config.cycle_secs, active_secs)?;
        info!(
            "restarting cycle with duration {:.0}s of {:.0}s",
            updated.active_secs, updated.cycle_secs
        );
        self.activate(formula, updated).await
    }

    /// Fold a status record into local state (poll path and the opportunistic
    /// path after writes whose responses carry status fields).
    pub async fn reconcile(&self, status: &DeviceStatus) -> ReconcileOutcome {
        let outcome = {
            let mut guard = self.state.lock().await;
            guard.reconcile(status, self.clock.now_epoch_secs())
        };
        if outcome == ReconcileOutcome::Stopped {
            self.surface.clear();
        }
        // Polling continues either way; an idle device can start again later.
        self.ensure_worker().await;
        outcome
    }

    /// Seed local state from a persisted session before the first status
    /// fetch. Provisional like any optimistic activation; the next successful
    /// poll supersedes it.
    pub async fn restore(&self, formula: Formula, config: CycleConfig) {
        let now = self.clock.now_epoch_secs();
        {
            let mut guard = self.state.lock().await;
            guard.begin_activation(formula, config, now);
            guard.confirm_running();
        }
        self.ensure_worker().await;
    }

    /// Fetch status once and reconcile. Fetch failures notify and leave the
    /// last known state rendered; polling starts regardless, so the next
    /// successful poll recovers.
    pub async fn refresh(&self) -> Result<ReconcileOutcome> {
        self.ensure_worker().await;
        match self.api.status().await {
            Ok(status) => Ok(self.reconcile(&status).await),
            Err(err) => {
                error!("status refresh failed: {err}");
                if err.is_network() {
                    self.notifier
                        .error("Cannot connect to the scent controller");
                }
                Err(err)
            }
        }
    }

    /// Current state, for display and tests.
    pub async fn snapshot(&self) -> SyncState {
        self.state.lock().await.clone()
    }

    /// Cancel the worker task on teardown.
    pub async fn shutdown(&self) {
        self.stop_worker().await;
    }

    async fn ensure_worker(&self) {
        let mut guard = self.worker.lock().await;
        if let Some(worker) = guard.as_ref() {
            if !worker.handle.is_finished() {
                return;
            }
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(sync_loop(
            self.state.clone(),
            self.api.clone(),
            self.surface.clone(),
            self.clock.clone(),
            cancel.clone(),
            self.frame_interval,
            self.poll_interval,
        ));
        *guard = Some(Worker { cancel, handle });
    }

    async fn stop_worker(&self) {
        let worker = self.worker.lock().await.take();
        if let Some(worker) = worker {
            worker.cancel.cancel();
            if let Err(err) = worker.handle.await {
                error!("sync loop task failed to join: {err}");
            }
        }
    }

    fn notify_request_failure(&self, action: &str, err: &ClientError) {
        if err.is_network() {
            self.notifier.error(
                "Connection error: cannot reach the scent controller. Check that the server is running.",
            );
        } else {
            self.notifier.error(&format!("Failed to {action}: {err}"));
        }
    }
}
