use std::sync::Arc;

use log::{debug, error, warn};
use tokio::sync::Mutex;
use tokio::time::{Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::api::SharedApi;
use crate::clock::SharedClock;
use crate::sync::phase::PhaseStep;
use crate::sync::state::{ReconcileOutcome, SyncState};
use crate::sync::surface::{indicator_position, SharedSurface};

/// Animation and poll loop, owned for the synchronizer's whole lifetime.
/// Frames reposition the indicator while a cycle is running; polls re-anchor
/// against the backend unconditionally, so an idle widget still observes the
/// next server-side activation (a schedule firing, another client). Only
/// cancellation ends the loop.
pub async fn sync_loop(
    state: Arc<Mutex<SyncState>>,
    api: SharedApi,
    surface: SharedSurface,
    clock: SharedClock,
    cancel: CancellationToken,
    frame_interval: Duration,
    poll_interval: Duration,
) {
    let mut frame_ticker = tokio::time::interval(frame_interval);
    frame_ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut poll_ticker = tokio::time::interval(poll_interval);
    poll_ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The caller just reconciled or activated; skip the immediate first poll.
    poll_ticker.tick().await;

    loop {
        tokio::select! {
            _ = frame_ticker.tick() => {
                render_frame(&state, &surface, &clock).await;
            }
            _ = poll_ticker.tick() => {
                match api.status().await {
                    Ok(status) => {
                        let now = clock.now_epoch_secs();
                        let mut guard = state.lock().await;
                        let was_running = guard.is_running();
                        let outcome = guard.reconcile(&status, now);
                        drop(guard);
                        if outcome == ReconcileOutcome::Stopped && was_running {
                            surface.clear();
                            debug!("status poll reports inactive; idling until the next poll");
                        }
                    }
                    // Poll failures never tear the widget down; the last
                    // known state stays on screen until a poll succeeds.
                    Err(err) => error!("status poll failed: {err}"),
                }
            }
            _ = cancel.cancelled() => {
                debug!("sync loop shutting down");
                break;
            }
        }
    }
}

/// Renders one frame. A no-op while nothing is animating.
async fn render_frame(
    state: &Arc<Mutex<SyncState>>,
    surface: &SharedSurface,
    clock: &SharedClock,
) {
    let mut guard = state.lock().await;
    if !guard.is_running() {
        return;
    }

    let now = clock.now_epoch_secs();
    let Some(phase) = guard.phase_at(now) else {
        return;
    };

    // Layout is read live every frame; the track resizes with the viewport.
    let layout = surface.layout();
    if layout.is_degenerate() {
        return;
    }

    if let Some(arc) = guard.take_dirty_arc() {
        surface.apply_arc(arc);
    }

    if guard.observe_phase(phase) == PhaseStep::Jump {
        // Drift signal, not a failure: the next reconcile re-anchors.
        warn!(
            "indicator jump detected: phase {:.3} at epoch {:.3}, anchor {:?}",
            phase,
            now,
            guard.cycle.map(|c| c.cycle_start_epoch_secs)
        );
    }

    match indicator_position(phase, layout) {
        Some(point) => surface.place_indicator(point),
        None => warn!("skipping frame: non-finite indicator position"),
    }
}
