use std::f64::consts::PI;
use std::sync::Arc;

use crate::models::CycleConfig;

/// Track radius in the widget's reference coordinate space.
pub const TRACK_RADIUS: f64 = 85.0;
/// Size of the reference coordinate space the radius is defined against.
pub const REFERENCE_SIZE: f64 = 200.0;

/// Live size of the indicator track's container. Queried every frame because
/// the track is responsive; never cached by the synchronizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackLayout {
    pub width: f64,
    pub height: f64,
}

impl TrackLayout {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// A not-yet-rendered container reports zero size; frames are skipped
    /// rather than computing a degenerate position.
    pub fn is_degenerate(&self) -> bool {
        !self.width.is_finite() || !self.height.is_finite() || self.width <= 0.0 || self.height <= 0.0
    }
}

/// Cartesian position for the indicator, in the same units as the layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorPoint {
    pub x: f64,
    pub y: f64,
}

/// Static colored arc denoting the active fraction of the cycle, expressed as
/// a dash pair over the track circumference and anchored at 12 o'clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcSpec {
    pub filled: f64,
    pub gap: f64,
}

impl ArcSpec {
    /// Arc for a cycle configuration, in reference-space units.
    pub fn for_config(config: CycleConfig) -> Self {
        let circumference = 2.0 * PI * TRACK_RADIUS;
        let filled = circumference * config.active_portion();
        Self {
            filled,
            gap: circumference - filled,
        }
    }

    /// Cleared arc shown when nothing is active.
    pub fn empty() -> Self {
        Self {
            filled: 0.0,
            gap: 2.0 * PI * TRACK_RADIUS,
        }
    }
}

/// Position on the track for a phase, against the live layout. Angle starts
/// at the 12-o'clock point and proceeds clockwise. Returns `None` when the
/// layout is degenerate or the result would not be finite.
pub fn indicator_position(phase: f64, layout: TrackLayout) -> Option<IndicatorPoint> {
    if layout.is_degenerate() || !phase.is_finite() {
        return None;
    }

    let size = layout.width;
    let radius = TRACK_RADIUS * (size / REFERENCE_SIZE);
    let center = size / 2.0;

    let angle = phase * 2.0 * PI - PI / 2.0;
    let x = center + radius * angle.cos();
    let y = center + radius * angle.sin();

    if !x.is_finite() || !y.is_finite() {
        return None;
    }
    Some(IndicatorPoint { x, y })
}

/// Render target for the progress widget. Implementations own the actual
/// drawing (terminal bar, SVG elements, test recorder).
pub trait IndicatorSurface: Send + Sync {
    /// Current on-screen size of the track container.
    fn layout(&self) -> TrackLayout;

    /// Move the indicator to a new position.
    fn place_indicator(&self, point: IndicatorPoint);

    /// Redraw the static arc; called only when activation parameters change.
    fn apply_arc(&self, arc: ArcSpec);

    /// Hide the widget and reset the arc.
    fn clear(&self);
}

pub type SharedSurface = Arc<dyn IndicatorSurface>;
