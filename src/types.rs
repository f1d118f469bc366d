//! Numeric primitives for doodle geometry.
//!
//! - `Range`: closed interval with clamping and modular ("clock") wraparound
//! - `AngleRange`: circular interval of angles that may straddle 0/2π
//! - `polar`: clock-convention polar helpers on `DVec2`
//! - `Colour`: rgba paint colour

use std::f64::consts::{PI, TAU};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Error type for invalid numeric values
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericError {
    /// Value is NaN
    NaN,
    /// Value is infinite
    Infinite,
    /// Lower bound exceeds upper bound
    Inverted,
}

impl fmt::Display for NumericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericError::NaN => write!(f, "value is NaN"),
            NumericError::Infinite => write!(f, "value is infinite"),
            NumericError::Inverted => write!(f, "minimum is greater than maximum"),
        }
    }
}

impl std::error::Error for NumericError {}

fn check_finite(val: f64) -> Result<f64, NumericError> {
    if val.is_nan() {
        Err(NumericError::NaN)
    } else if val.is_infinite() {
        Err(NumericError::Infinite)
    } else {
        Ok(val)
    }
}

/// Where the seam of a modular range sits.
///
/// A `Top` clock reports values in `[min, max)`, a `Bottom` clock in `(min, max]`.
/// Ophthalmic axes use `Bottom`, so a horizontal axis reads 180 rather than 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Clock {
    #[default]
    Top,
    Bottom,
}

/// Closed numeric interval
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    /// Create a range without validation (const-friendly).
    /// Use `try_new` for host-supplied bounds.
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Create a range, rejecting non-finite or inverted bounds
    pub fn try_new(min: f64, max: f64) -> Result<Self, NumericError> {
        let min = check_finite(min)?;
        let max = check_finite(max)?;
        if min > max {
            return Err(NumericError::Inverted);
        }
        Ok(Self { min, max })
    }

    pub fn set_min_and_max(&mut self, min: f64, max: f64) {
        self.min = min;
        self.max = max;
    }

    #[inline]
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    #[inline]
    pub fn includes(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Clamp `value` into the range
    #[inline]
    pub fn constrain(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// Bring `value` into the range by whole multiples of the span.
    pub fn wrap(&self, value: f64, clock: Clock) -> f64 {
        let span = self.span();
        if span <= 0.0 {
            return self.min;
        }
        let offset = (value - self.min).rem_euclid(span);
        match clock {
            Clock::Top => self.min + offset,
            Clock::Bottom if offset == 0.0 => self.max,
            Clock::Bottom => self.min + offset,
        }
    }
}

/// Circular interval of angles in radians, swept clockwise from `start` to `end`.
///
/// When `start > end` the interval wraps through 0/2π, so `[350°, 10°]` covers 20°.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleRange {
    pub start: f64,
    pub end: f64,
}

impl AngleRange {
    /// A sweep of a full turn or more is the full circle.
    pub fn new(start: f64, end: f64) -> Self {
        if (end - start).abs() >= TAU {
            return Self::full();
        }
        Self {
            start: normalize_angle(start),
            end: normalize_angle(end),
        }
    }

    pub fn from_degrees(start: f64, end: f64) -> Self {
        Self::new(start.to_radians(), end.to_radians())
    }

    /// Full circle; every angle is accepted
    pub fn full() -> Self {
        Self { start: 0.0, end: TAU }
    }

    fn is_full(&self) -> bool {
        self.end - self.start >= TAU
    }

    pub fn wraps(&self) -> bool {
        self.start > self.end
    }

    pub fn includes(&self, angle: f64) -> bool {
        if self.is_full() {
            return true;
        }
        let a = normalize_angle(angle);
        if self.wraps() {
            a >= self.start || a <= self.end
        } else {
            a >= self.start && a <= self.end
        }
    }

    /// Snap an angle outside the interval to whichever bound is angularly closer.
    pub fn constrain(&self, angle: f64) -> f64 {
        let a = normalize_angle(angle);
        if self.includes(a) {
            return a;
        }
        if angular_distance(a, self.start) <= angular_distance(a, self.end) {
            self.start
        } else {
            self.end
        }
    }
}

/// Normalise an angle to `[0, 2π)`
pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if a >= TAU { 0.0 } else { a }
}

/// Shortest unsigned angular distance between two angles
pub fn angular_distance(a: f64, b: f64) -> f64 {
    let d = (normalize_angle(a) - normalize_angle(b)).abs();
    d.min(TAU - d)
}

/// Polar helpers using the clock convention.
///
/// Angle 0 points to 12 o'clock (−y in y-down space) and increases clockwise,
/// so `from_polar(r, π/2)` lies on +x.
pub mod polar {
    use glam::{DVec2, dvec2};

    use super::normalize_angle;

    pub fn from_polar(length: f64, angle: f64) -> DVec2 {
        dvec2(length * angle.sin(), -length * angle.cos())
    }

    /// Clock-convention angle of `p` around the origin, in `[0, 2π)`
    pub fn direction(p: DVec2) -> f64 {
        normalize_angle(p.x.atan2(-p.y))
    }

    /// Control point on the tangent through `p`, `phi` radians further round.
    ///
    /// Placing control points this way on consecutive handles at `2π/(3n)`
    /// keeps a closed n-point curve close to circular.
    pub fn tangential_control_point(p: DVec2, phi: f64) -> DVec2 {
        let r = p.length() / phi.cos();
        from_polar(r, direction(p) + phi)
    }
}

/// RGBA paint colour; alpha in `[0, 1]`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Colour {
    pub const BLACK: Colour = Colour::rgb(0, 0, 0);
    pub const BLUE: Colour = Colour::rgb(0, 0, 255);
    pub const RED: Colour = Colour::rgb(255, 0, 0);
    pub const GRAY: Colour = Colour::rgb(128, 128, 128);
    pub const BROWN: Colour = Colour::rgb(165, 42, 42);
    pub const TRANSPARENT: Colour = Colour::rgba(0, 0, 0, 0.0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub fn is_transparent(&self) -> bool {
        self.a <= 0.0
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

/// Degrees in a half turn, for axis conversions
pub const HALF_TURN_DEGREES: f64 = 180.0;

/// Radians → degrees without the float noise of `to_degrees` on exact multiples of π
pub fn degrees(radians: f64) -> f64 {
    HALF_TURN_DEGREES * radians / PI
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::dvec2;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    // ==================== Range tests ====================

    #[test]
    fn range_try_new_rejects_nan_and_inverted() {
        assert_eq!(Range::try_new(f64::NAN, 1.0), Err(NumericError::NaN));
        assert_eq!(Range::try_new(0.0, f64::INFINITY), Err(NumericError::Infinite));
        assert_eq!(Range::try_new(2.0, 1.0), Err(NumericError::Inverted));
        assert!(Range::try_new(-1.0, 1.0).is_ok());
    }

    #[test]
    fn range_constrain_clamps_both_ends() {
        let r = Range::new(50.0, 290.0);
        assert_eq!(r.constrain(500.0), 290.0);
        assert_eq!(r.constrain(10.0), 50.0);
        assert_eq!(r.constrain(80.0), 80.0);
    }

    #[test]
    fn range_wrap_top_clock() {
        let r = Range::new(0.0, 180.0);
        assert!(close(r.wrap(190.0, Clock::Top), 10.0));
        assert!(close(r.wrap(-10.0, Clock::Top), 170.0));
        assert!(close(r.wrap(180.0, Clock::Top), 0.0));
        assert!(close(r.wrap(360.0, Clock::Top), 0.0));
    }

    #[test]
    fn range_wrap_bottom_clock_puts_seam_at_max() {
        let r = Range::new(0.0, 180.0);
        assert!(close(r.wrap(0.0, Clock::Bottom), 180.0));
        assert!(close(r.wrap(180.0, Clock::Bottom), 180.0));
        assert!(close(r.wrap(45.0, Clock::Bottom), 45.0));
    }

    // ==================== AngleRange tests ====================

    #[test]
    fn angle_range_wraps_across_zero() {
        let r = AngleRange::from_degrees(350.0, 10.0);
        assert!(r.wraps());
        assert!(r.includes(355f64.to_radians()));
        assert!(r.includes(5f64.to_radians()));
        assert!(!r.includes(180f64.to_radians()));
    }

    #[test]
    fn angle_range_constrain_snaps_to_nearer_bound() {
        let r = AngleRange::from_degrees(350.0, 10.0);
        assert!(close(r.constrain(30f64.to_radians()), 10f64.to_radians()));
        assert!(close(r.constrain(300f64.to_radians()), 350f64.to_radians()));
        assert!(close(r.constrain(5f64.to_radians()), 5f64.to_radians()));
    }

    #[test]
    fn angle_range_full_accepts_everything() {
        let r = AngleRange::full();
        for deg in [0.0, 90.0, 180.0, 359.0] {
            assert!(r.includes(f64::to_radians(deg)));
        }
    }

    #[test]
    fn angle_range_of_a_full_turn_is_full() {
        assert_eq!(AngleRange::new(0.0, TAU), AngleRange::full());
        assert_eq!(AngleRange::from_degrees(10.0, 400.0), AngleRange::full());
        let r = AngleRange::new(0.0, TAU);
        assert_eq!(r.constrain(PI), PI);
    }

    // ==================== polar tests ====================

    #[test]
    fn polar_uses_clock_convention() {
        let p = polar::from_polar(80.0, 0.0);
        assert!(close(p.x, 0.0) && close(p.y, -80.0));
        let p = polar::from_polar(80.0, PI / 2.0);
        assert!(close(p.x, 80.0) && close(p.y, 0.0));
    }

    #[test]
    fn polar_direction_inverts_from_polar() {
        for deg in [0.0, 45.0, 90.0, 200.0, 315.0] {
            let a = f64::to_radians(deg);
            let p = polar::from_polar(10.0, a);
            assert!(close(polar::direction(p), a), "angle {deg}");
        }
    }

    #[test]
    fn tangential_control_point_lies_on_tangent() {
        let p = dvec2(0.0, -80.0);
        let cp = polar::tangential_control_point(p, PI / 6.0);
        // Tangent at 12 o'clock is horizontal, so y is unchanged
        assert!(close(cp.y, -80.0));
        assert!(cp.x > 0.0);
    }

    // ==================== Colour tests ====================

    #[test]
    fn colour_display_is_css_rgba() {
        assert_eq!(Colour::rgba(255, 255, 0, 0.8).to_string(), "rgba(255, 255, 0, 0.8)");
        assert!(Colour::TRANSPARENT.is_transparent());
    }
}
