//! Platform-agnostic time utilities
//!
//! Provides a unified way to get elapsed time in seconds since app start.
//! Only used for reporting (FPS, run duration); the simulation itself is
//! driven by frames, not wall-clock time.

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
pub fn now_seconds() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now() / 1000.0)
        .unwrap_or(0.0)
}

#[cfg(not(all(target_arch = "wasm32", feature = "wasm")))]
pub fn now_seconds() -> f64 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static START: OnceLock<Instant> = OnceLock::new();
    START.get_or_init(Instant::now).elapsed().as_secs_f64()
}

/// Rolling frames-per-second over the last 60 ticks
pub struct FpsCounter {
    frames: Vec<f64>,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self {
            frames: Vec::with_capacity(60),
        }
    }

    pub fn tick(&mut self) {
        self.tick_at(now_seconds());
    }

    /// Record a tick at an explicit time (seconds)
    pub fn tick_at(&mut self, now: f64) {
        self.frames.push(now);
        if self.frames.len() > 60 {
            self.frames.remove(0);
        }
    }

    pub fn fps(&self) -> f64 {
        let (Some(first), Some(last)) = (self.frames.first(), self.frames.last()) else {
            return 0.0;
        };
        let elapsed = last - first;
        if self.frames.len() < 2 || elapsed <= 0.0 {
            return 0.0;
        }
        (self.frames.len() as f64 - 1.0) / elapsed
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fps_needs_two_ticks() {
        let mut counter = FpsCounter::new();
        assert_eq!(counter.fps(), 0.0);
        counter.tick_at(1.0);
        assert_eq!(counter.fps(), 0.0);
    }

    #[test]
    fn fps_from_regular_ticks() {
        let mut counter = FpsCounter::new();
        for i in 0..31 {
            counter.tick_at(i as f64 / 30.0);
        }
        assert!((counter.fps() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn window_keeps_last_sixty() {
        let mut counter = FpsCounter::new();
        // 100 ticks at 10 fps then the rate doubles; only the tail counts
        for i in 0..100 {
            counter.tick_at(i as f64 * 0.1);
        }
        let base = 99.0 * 0.1;
        for i in 1..=60 {
            counter.tick_at(base + i as f64 * 0.05);
        }
        assert!((counter.fps() - 20.0).abs() < 1e-6);
    }

    #[test]
    fn now_is_monotonic() {
        let a = now_seconds();
        let b = now_seconds();
        assert!(b >= a);
    }
}
