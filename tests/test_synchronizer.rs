//! End-to-end flows through the progress synchronizer with every
//! collaborator replaced by a test double: activation (optimistic and
//! failing), reconciliation against polled status, rapid formula switches,
//! duration changes, and layout edge cases.

mod common;

use std::sync::Arc;

use tokio::time::Duration;

use common::{anchored_status, inactive_status, ManualClock, RecordingNotifier, RecordingSurface, ScriptedApi};
use scentctl::error::ClientError;
use scentctl::models::{CycleConfig, Formula};
use scentctl::sync::{ProgressSynchronizer, ReconcileOutcome, SyncPhase};

const FRAME: Duration = Duration::from_millis(5);
const SLOW_POLL: Duration = Duration::from_secs(3600);

struct Harness {
    api: Arc<ScriptedApi>,
    notifier: Arc<RecordingNotifier>,
    clock: Arc<ManualClock>,
    surface: Arc<RecordingSurface>,
    sync: ProgressSynchronizer,
}

fn harness_with_poll(poll: Duration) -> Harness {
    let api = Arc::new(ScriptedApi::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let clock = Arc::new(ManualClock::at(1_000_000.0));
    let surface = Arc::new(RecordingSurface::sized(200.0, 200.0));
    let sync = ProgressSynchronizer::with_intervals(
        api.clone(),
        notifier.clone(),
        clock.clone(),
        surface.clone(),
        FRAME,
        poll,
    );
    Harness {
        api,
        notifier,
        clock,
        surface,
        sync,
    }
}

fn harness() -> Harness {
    harness_with_poll(SLOW_POLL)
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(60)).await;
}

#[tokio::test]
async fn activation_renders_before_the_request_resolves() {
    let h = harness();

    h.sync
        .activate(Formula::Red, CycleConfig::default())
        .await
        .unwrap();
    settle().await;

    let state = h.sync.snapshot().await;
    assert_eq!(state.phase, SyncPhase::Running);
    assert_eq!(state.formula(), Some(Formula::Red));
    assert!(!state.cycle.unwrap().server_anchored);

    assert!(h.surface.point_count() > 0, "frames should have rendered");
    assert_eq!(h.surface.arc_count(), 1, "arc drawn once, not per frame");
    assert!(h.notifier.successes()[0].contains("Crimson"));

    h.sync.shutdown().await;
}

#[tokio::test]
async fn failed_activation_reverts_and_surfaces_the_error() {
    let h = harness();
    h.api
        .queue_activate(Err(ClientError::Network("connection refused".into())));

    let err = h
        .sync
        .activate(Formula::Blue, CycleConfig::default())
        .await
        .unwrap_err();
    assert!(err.is_network());

    let state = h.sync.snapshot().await;
    assert_eq!(state.phase, SyncPhase::Idle);
    assert!(state.cycle.is_none());
    assert!(h.surface.clears() > 0, "widget should be cleared");
    assert!(h.notifier.errors()[0].contains("Connection error"));

    h.sync.shutdown().await;
}

#[tokio::test]
async fn failed_activation_keeps_a_previously_running_formula() {
    let h = harness();

    h.sync
        .activate(Formula::Red, CycleConfig::default())
        .await
        .unwrap();
    settle().await;
    let arcs_before = h.surface.arc_count();

    h.api
        .queue_activate(Err(ClientError::Network("connection refused".into())));
    let _ = h.sync.activate(Formula::Green, CycleConfig::default()).await;
    settle().await;

    let state = h.sync.snapshot().await;
    assert_eq!(state.formula(), Some(Formula::Red), "prior state restored");
    assert!(state.is_running());
    assert!(
        h.surface.arc_count() > arcs_before,
        "reverted formula's arc is redrawn"
    );

    h.sync.shutdown().await;
}

#[tokio::test]
async fn deactivate_clears_state_and_stops_frames() {
    let h = harness();
    h.sync
        .activate(Formula::Yellow, CycleConfig::default())
        .await
        .unwrap();

    h.sync.deactivate().await.unwrap();

    let state = h.sync.snapshot().await;
    assert_eq!(state.phase, SyncPhase::Idle);
    assert!(h.surface.clears() > 0);

    // Nothing renders against an idle state.
    let frames = h.surface.point_count();
    settle().await;
    assert_eq!(h.surface.point_count(), frames);

    h.sync.shutdown().await;
}

#[tokio::test]
async fn reconcile_inactive_always_stops_the_animation() {
    let h = harness();
    h.sync
        .activate(Formula::Green, CycleConfig::default())
        .await
        .unwrap();
    settle().await;

    let outcome = h.sync.reconcile(&inactive_status()).await;
    assert_eq!(outcome, ReconcileOutcome::Stopped);

    let state = h.sync.snapshot().await;
    assert_eq!(state.phase, SyncPhase::Idle);
    assert!(state.cycle.is_none());

    let frames = h.surface.point_count();
    settle().await;
    assert_eq!(h.surface.point_count(), frames, "no frames after stop");

    h.sync.shutdown().await;
}

#[tokio::test]
async fn idle_synchronizer_observes_a_later_activation() {
    let h = harness_with_poll(Duration::from_millis(20));
    h.api.set_status(inactive_status());

    // Startup against an idle device leaves the widget blank but polling.
    let outcome = h.sync.refresh().await.unwrap();
    assert_eq!(outcome, ReconcileOutcome::Stopped);
    settle().await;
    assert_eq!(h.sync.snapshot().await.phase, SyncPhase::Idle);
    assert_eq!(h.surface.point_count(), 0);

    // A schedule fires server-side.
    h.api
        .set_status(anchored_status(Formula::Blue, 1_000_000.0, 60.0, 10.0));
    settle().await;

    let state = h.sync.snapshot().await;
    assert_eq!(state.phase, SyncPhase::Running);
    assert_eq!(state.formula(), Some(Formula::Blue));
    assert!(h.surface.point_count() > 0, "animation starts from idle");

    h.sync.shutdown().await;
}

#[tokio::test]
async fn polling_resumes_after_the_device_goes_inactive() {
    let h = harness_with_poll(Duration::from_millis(20));

    h.sync
        .activate(Formula::Red, CycleConfig::default())
        .await
        .unwrap();
    h.api.set_status(inactive_status());
    settle().await;
    assert_eq!(h.sync.snapshot().await.phase, SyncPhase::Idle);

    // The device starts again; the same widget picks it up.
    h.api
        .set_status(anchored_status(Formula::Green, 1_000_000.0, 60.0, 10.0));
    settle().await;

    let state = h.sync.snapshot().await;
    assert_eq!(state.formula(), Some(Formula::Green));
    assert!(state.is_running());

    h.sync.shutdown().await;
}

#[tokio::test]
async fn restored_session_renders_until_a_poll_supersedes_it() {
    let h = harness_with_poll(Duration::from_millis(20));
    h.api
        .set_status(anchored_status(Formula::Blue, 999_990.0, 60.0, 10.0));

    h.sync.restore(Formula::Red, CycleConfig::default()).await;
    let state = h.sync.snapshot().await;
    assert_eq!(state.formula(), Some(Formula::Red));
    assert!(state.is_running());
    assert!(!state.cycle.unwrap().server_anchored);

    settle().await;
    let state = h.sync.snapshot().await;
    assert_eq!(
        state.formula(),
        Some(Formula::Blue),
        "poll supersedes the restored session"
    );
    assert!(state.cycle.unwrap().server_anchored);
    assert!(h.surface.point_count() > 0);

    h.sync.shutdown().await;
}

#[tokio::test]
async fn poll_overwrites_the_optimistic_anchor() {
    let h = harness_with_poll(Duration::from_millis(20));
    h.api
        .set_status(anchored_status(Formula::Red, 999_990.0, 60.0, 10.0));

    h.sync
        .activate(Formula::Red, CycleConfig::default())
        .await
        .unwrap();
    settle().await;

    let cycle = h.sync.snapshot().await.cycle.unwrap();
    assert!(cycle.server_anchored, "server anchor should win");
    assert_eq!(cycle.cycle_start_epoch_secs, 999_990.0);

    h.sync.shutdown().await;
}

#[tokio::test]
async fn rapid_switch_settles_on_the_second_formula() {
    let h = harness_with_poll(Duration::from_millis(20));

    h.sync
        .activate(Formula::Red, CycleConfig::default())
        .await
        .unwrap();
    h.sync
        .activate(Formula::Blue, CycleConfig::default())
        .await
        .unwrap();

    // The backend ends up running blue; polls report it.
    h.api
        .set_status(anchored_status(Formula::Blue, 1_000_000.0, 60.0, 10.0));
    settle().await;

    let state = h.sync.snapshot().await;
    assert_eq!(state.formula(), Some(Formula::Blue));
    assert_eq!(state.phase, SyncPhase::Running);

    h.sync.shutdown().await;
}

#[tokio::test]
async fn duration_change_restarts_the_cycle_at_phase_zero() {
    let h = harness();

    h.sync
        .activate(Formula::Red, CycleConfig::default())
        .await
        .unwrap();
    settle().await;
    h.clock.advance(30.0); // mid-cycle

    let arcs_before = h.surface.arc_count();
    h.sync.set_active_duration(20.0).await.unwrap();
    settle().await;

    let state = h.sync.snapshot().await;
    let cycle = state.cycle.unwrap();
    assert_eq!(cycle.config.active_secs, 20.0);
    // Anchor snapped to "now": phase restarts from zero by design.
    assert_eq!(cycle.cycle_start_epoch_secs, 1_000_030.0);
    assert!(state.phase_at(1_000_030.0).unwrap() < 1e-9);
    assert!(h.surface.arc_count() > arcs_before, "arc recomputed");

    h.sync.shutdown().await;
}

#[tokio::test]
async fn duration_change_without_activation_is_a_state_error() {
    let h = harness();
    let err = h.sync.set_active_duration(15.0).await.unwrap_err();
    assert!(matches!(err, ClientError::State(_)));
}

#[tokio::test]
async fn invalid_cycle_config_is_rejected_before_any_request() {
    let h = harness();
    let err = h
        .sync
        .activate(Formula::Red, CycleConfig {
            cycle_secs: 60.0,
            active_secs: 90.0,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
    assert!(h.api.recorded_calls().is_empty(), "nothing sent on the wire");
}

#[tokio::test]
async fn zero_size_layout_skips_frames_until_it_renders() {
    let h = harness();
    h.surface.set_layout(0.0, 0.0);

    h.sync
        .activate(Formula::Blue, CycleConfig::default())
        .await
        .unwrap();
    settle().await;
    assert_eq!(h.surface.point_count(), 0, "no frames against a hidden track");
    assert!(h.sync.snapshot().await.is_running(), "state still advances");

    h.surface.set_layout(320.0, 320.0);
    settle().await;
    assert!(h.surface.point_count() > 0, "frames resume once visible");

    // All rendered coordinates are finite.
    for point in h.surface.points.lock().unwrap().iter() {
        assert!(point.x.is_finite() && point.y.is_finite());
    }

    h.sync.shutdown().await;
}

#[tokio::test]
async fn refresh_adopts_a_running_device_on_startup() {
    let h = harness();
    h.api
        .set_status(anchored_status(Formula::Yellow, 999_900.0, 60.0, 15.0));

    let outcome = h.sync.refresh().await.unwrap();
    assert_eq!(outcome, ReconcileOutcome::Running);

    let state = h.sync.snapshot().await;
    assert_eq!(state.formula(), Some(Formula::Yellow));
    assert_eq!(state.config().unwrap().active_secs, 15.0);

    h.sync.shutdown().await;
}
