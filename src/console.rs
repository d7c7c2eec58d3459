use std::f64::consts::PI;

use indicatif::{ProgressBar, ProgressStyle};

use crate::sync::{ArcSpec, IndicatorPoint, IndicatorSurface, TrackLayout, TRACK_RADIUS};

const BAR_SCALE: u64 = 1000;

/// Terminal stand-in for the circular progress widget: the track becomes an
/// indicatif bar, one lap per cycle.
pub struct ConsoleSurface {
    bar: ProgressBar,
    size: f64,
}

impl ConsoleSurface {
    pub fn new() -> Self {
        let bar = ProgressBar::new(BAR_SCALE);
        bar.set_style(
            ProgressStyle::with_template("{msg:>24} [{bar:40}] {percent:>3}%")
                .expect("static template")
                .progress_chars("=> "),
        );
        bar.set_message("idle");
        Self { bar, size: 200.0 }
    }

    /// Recover the phase from the indicator's track position.
    fn phase_of(&self, point: IndicatorPoint) -> f64 {
        let center = self.size / 2.0;
        let angle = (point.y - center).atan2(point.x - center);
        (angle / (2.0 * PI) + 0.25).rem_euclid(1.0)
    }
}

impl Default for ConsoleSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl IndicatorSurface for ConsoleSurface {
    fn layout(&self) -> TrackLayout {
        TrackLayout::new(self.size, self.size)
    }

    fn place_indicator(&self, point: IndicatorPoint) {
        let phase = self.phase_of(point);
        self.bar.set_position((phase * BAR_SCALE as f64) as u64);
    }

    fn apply_arc(&self, arc: ArcSpec) {
        let circumference = 2.0 * PI * TRACK_RADIUS;
        let percent = (arc.filled / circumference * 100.0).round();
        self.bar
            .set_message(format!("diffusing {percent:.0}% of cycle"));
    }

    fn clear(&self) {
        self.bar.set_position(0);
        self.bar.set_message("idle");
    }
}
