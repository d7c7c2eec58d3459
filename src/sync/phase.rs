/// Fractional position within the current cycle.
///
/// Always lands in `[0, 1)`. Degenerate inputs (non-positive or non-finite
/// cycle length, non-finite timestamps) collapse to `0.0` instead of leaking
/// NaN or infinity into rendering; the next reconcile corrects the anchor.
pub fn progress_phase(now_epoch_secs: f64, cycle_start_epoch_secs: f64, cycle_secs: f64) -> f64 {
    if !cycle_secs.is_finite() || cycle_secs <= 0.0 {
        return 0.0;
    }

    let elapsed = (now_epoch_secs - cycle_start_epoch_secs).rem_euclid(cycle_secs);
    let phase = elapsed / cycle_secs;

    // rem_euclid can round up to exactly `cycle_secs` for tiny negative
    // inputs, and clock anomalies can produce NaN.
    if !phase.is_finite() || phase < 0.0 || phase >= 1.0 {
        return 0.0;
    }
    phase
}

/// Classification of two consecutive phase samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseStep {
    /// Ordinary forward motion.
    Smooth,
    /// Normal cycle completion (>0.8 wrapping to <0.2).
    Wrapped,
    /// Discontinuity larger than half a cycle; drift signal worth logging,
    /// corrected by the next reconcile rather than treated as an error.
    Jump,
}

pub fn classify_step(previous: f64, current: f64) -> PhaseStep {
    if previous > 0.8 && current < 0.2 {
        return PhaseStep::Wrapped;
    }
    if previous > 0.0 && (current - previous).abs() > 0.5 {
        return PhaseStep::Jump;
    }
    PhaseStep::Smooth
}
