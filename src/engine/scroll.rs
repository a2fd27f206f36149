// Scroll progress source.
//
// Mouse-wheel deltas accumulate into a raw page offset; the offset the rest
// of the app sees chases it with a short time constant, the way a damped
// page scroller feels. The camera rig and the per-page reveal logic both
// consume `progress()`, a scalar in [0, 1].

/// Pages the vignette spans. Progress 1.0 means "scrolled to the last page".
pub const PAGE_COUNT: f32 = 2.0;

/// Wheel lines per full page of travel.
const LINES_PER_PAGE: f32 = 12.0;

/// Time constant (seconds) of the damped approach to the raw offset.
const DAMPING: f32 = 0.12;

pub struct ScrollTracker {
    /// Where the wheel has put us, in pages, clamped to [0, PAGE_COUNT - 1].
    raw: f32,
    /// Smoothed offset that trails `raw`.
    smoothed: f32,
}

impl ScrollTracker {
    pub fn new() -> Self {
        Self {
            raw: 0.0,
            smoothed: 0.0,
        }
    }

    /// Feed this frame's accumulated wheel delta (positive = scroll up).
    pub fn push_wheel(&mut self, lines: f32) {
        self.raw -= lines / LINES_PER_PAGE;
        self.raw = self.raw.clamp(0.0, PAGE_COUNT - 1.0);
    }

    /// Close part of the gap to the raw offset; frame-rate independent.
    pub fn update(&mut self, dt: f32) {
        let k = 1.0 - (-dt / DAMPING).exp();
        self.smoothed += (self.raw - self.smoothed) * k;
    }

    /// Normalized scroll progress in [0, 1].
    pub fn progress(&self) -> f32 {
        (self.smoothed / (PAGE_COUNT - 1.0)).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_stays_in_unit_range() {
        let mut s = ScrollTracker::new();
        for _ in 0..100 {
            s.push_wheel(-30.0);
            s.update(1.0 / 60.0);
            assert!(s.progress() >= 0.0 && s.progress() <= 1.0);
        }
        for _ in 0..100 {
            s.push_wheel(30.0);
            s.update(1.0 / 60.0);
            assert!(s.progress() >= 0.0 && s.progress() <= 1.0);
        }
    }

    #[test]
    fn smoothed_offset_trails_then_reaches_the_wheel() {
        let mut s = ScrollTracker::new();
        s.push_wheel(-LINES_PER_PAGE); // one full page down
        s.update(1.0 / 60.0);
        let early = s.progress();
        assert!(early > 0.0 && early < 1.0, "should trail, got {early}");
        for _ in 0..600 {
            s.update(1.0 / 60.0);
        }
        assert!((s.progress() - 1.0).abs() < 1e-3);
    }
}
