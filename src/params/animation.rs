//! Tweens for animated parameters.

use std::time::Duration;

use crate::types::Range;

/// Linear interpolation of one numeric parameter towards a target
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    pub from: f64,
    pub to: f64,
    pub elapsed: Duration,
    pub duration: Duration,
}

impl Tween {
    pub fn new(from: f64, to: f64, duration: Duration) -> Self {
        Self {
            from,
            to,
            elapsed: Duration::ZERO,
            duration,
        }
    }

    /// Tween over a modular range, travelling the shorter way round.
    ///
    /// The returned `to` may lie outside the range; callers wrap each frame.
    pub fn modular(from: f64, to: f64, range: &Range, duration: Duration) -> Self {
        let span = range.span();
        let mut delta = to - from;
        if span > 0.0 {
            delta = delta.rem_euclid(span);
            if delta > span / 2.0 {
                delta -= span;
            }
        }
        Self::new(from, from + delta, duration)
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Advance by `dt` and return the interpolated value
    pub fn advance(&mut self, dt: Duration) -> f64 {
        self.elapsed = (self.elapsed + dt).min(self.duration);
        self.value()
    }

    pub fn value(&self) -> f64 {
        if self.duration.is_zero() {
            return self.to;
        }
        let t = self.elapsed.as_secs_f64() / self.duration.as_secs_f64();
        self.from + (self.to - self.from) * t.clamp(0.0, 1.0)
    }
}
