//! Frame clock
//!
//! Turns the scheduler's millisecond timestamps into the dimensionless
//! deltaTime the step expects (1.0 per nominal frame). There is no fixed-step
//! accumulator: every frame gets whatever delta it produced, capped.

use crate::consts::{FRAME_MS, MAX_DELTA};

#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<f64>,
    frame_ms: f32,
    max_delta: f32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(FRAME_MS, MAX_DELTA)
    }
}

impl FrameClock {
    pub fn new(frame_ms: f32, max_delta: f32) -> Self {
        Self {
            last: None,
            frame_ms,
            max_delta,
        }
    }

    /// Record `timestamp_ms` and return the delta since the previous call,
    /// clamped to `[0, max_delta]`. The first call returns 0.
    pub fn advance(&mut self, timestamp_ms: f64) -> f32 {
        let Some(last) = self.last.replace(timestamp_ms) else {
            return 0.0;
        };

        let elapsed = timestamp_ms - last;
        if !elapsed.is_finite() || elapsed <= 0.0 {
            return 0.0;
        }

        ((elapsed / self.frame_ms as f64) as f32).min(self.max_delta)
    }

    /// Forget the previous timestamp (e.g. after the game was paused)
    pub fn reset(&mut self) {
        self.last = None;
    }
}
