use crate::models::{CycleConfig, CycleState, DeviceStatus, Formula};
use crate::sync::phase::{classify_step, progress_phase, PhaseStep};
use crate::sync::surface::ArcSpec;

/// Lifecycle of the synchronizer. `Running` re-enters itself on reconcile
/// (silent re-anchor) and on parameter change (snap to phase 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    /// Optimistically rendering while the activation request is in flight.
    Activating,
    Running,
}

/// Result of folding a status fetch into local state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Animation continues (anchor possibly rewritten).
    Running,
    /// Server reports inactive; state was cleared.
    Stopped,
}

/// The one shared mutable record. Touched only under the controller's lock,
/// so the cooperative model has no data races to coordinate.
#[derive(Debug, Clone)]
pub struct SyncState {
    pub phase: SyncPhase,
    pub cycle: Option<CycleState>,
    last_phase: f64,
    arc_dirty: bool,
}

impl Default for SyncState {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncState {
    pub fn new() -> Self {
        Self {
            phase: SyncPhase::Idle,
            cycle: None,
            last_phase: 0.0,
            arc_dirty: false,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, SyncPhase::Activating | SyncPhase::Running)
    }

    pub fn formula(&self) -> Option<Formula> {
        self.cycle.map(|cycle| cycle.formula)
    }

    pub fn config(&self) -> Option<CycleConfig> {
        self.cycle.map(|cycle| cycle.config)
    }

    /// Optimistic local activation: anchor at `now`, provisional until the
    /// next successful status fetch.
    pub fn begin_activation(&mut self, formula: Formula, config: CycleConfig, now_epoch_secs: f64) {
        self.phase = SyncPhase::Activating;
        self.cycle = Some(CycleState {
            formula,
            config,
            cycle_start_epoch_secs: now_epoch_secs,
            server_anchored: false,
        });
        self.last_phase = 0.0;
        self.arc_dirty = true;
    }

    /// The activation request was accepted; keep the optimistic anchor until
    /// the next poll reports the authoritative `cycle_start_time`.
    pub fn confirm_running(&mut self) {
        if self.phase == SyncPhase::Activating {
            self.phase = SyncPhase::Running;
        }
    }

    /// Fold a freshly fetched status in. The server is the single source of
    /// truth: an authoritative anchor always overwrites the local one, and an
    /// inactive report always clears, regardless of prior state.
    pub fn reconcile(&mut self, status: &DeviceStatus, now_epoch_secs: f64) -> ReconcileOutcome {
        if let Some((formula, start, config)) = status.cycle_anchor() {
            let params_changed = self
                .cycle
                .map(|cycle| cycle.formula != formula || cycle.config != config)
                .unwrap_or(true);
            if params_changed {
                self.arc_dirty = true;
                self.last_phase = 0.0;
            }
            self.phase = SyncPhase::Running;
            self.cycle = Some(CycleState {
                formula,
                config,
                cycle_start_epoch_secs: start,
                server_anchored: true,
            });
            return ReconcileOutcome::Running;
        }

        if let Some(formula) = status.active_formula {
            // Active but the backend has not reported cycle timing yet
            // (activation accepted, device thread not fired). Keep an
            // existing anchor; otherwise start one locally.
            let already_running = self.is_running() && self.formula() == Some(formula);
            if !already_running {
                let config = self.config().unwrap_or_default();
                self.begin_activation(formula, config, now_epoch_secs);
                self.phase = SyncPhase::Running;
            }
            return ReconcileOutcome::Running;
        }

        self.clear();
        ReconcileOutcome::Stopped
    }

    pub fn clear(&mut self) {
        self.phase = SyncPhase::Idle;
        self.cycle = None;
        self.last_phase = 0.0;
        self.arc_dirty = false;
    }

    /// Phase for the current tick, or `None` when nothing is animating.
    pub fn phase_at(&self, now_epoch_secs: f64) -> Option<f64> {
        let cycle = self.cycle?;
        if !self.is_running() {
            return None;
        }
        Some(progress_phase(
            now_epoch_secs,
            cycle.cycle_start_epoch_secs,
            cycle.config.cycle_secs,
        ))
    }

    /// Record a rendered phase sample and classify the step from the last one.
    pub fn observe_phase(&mut self, phase: f64) -> PhaseStep {
        let step = classify_step(self.last_phase, phase);
        self.last_phase = phase;
        step
    }

    /// Arc to redraw, if activation parameters changed since the last frame.
    pub fn take_dirty_arc(&mut self) -> Option<ArcSpec> {
        if !self.arc_dirty {
            return None;
        }
        self.arc_dirty = false;
        self.config().map(ArcSpec::for_config)
    }

    /// Force an arc redraw on the next frame.
    pub fn mark_arc_dirty(&mut self) {
        self.arc_dirty = true;
    }
}
