pub mod controller;
pub mod loop_worker;
pub mod phase;
pub mod state;
pub mod surface;

pub use controller::{ProgressSynchronizer, DEFAULT_FRAME_INTERVAL, DEFAULT_POLL_INTERVAL};
pub use phase::{classify_step, progress_phase, PhaseStep};
pub use state::{ReconcileOutcome, SyncPhase, SyncState};
pub use surface::{
    indicator_position, ArcSpec, IndicatorPoint, IndicatorSurface, SharedSurface, TrackLayout,
    REFERENCE_SIZE, TRACK_RADIUS,
};
