//! Default ranges, sizes and timings

use std::time::Duration;

use crate::types::Range;

/// Origin range for every doodle, in doodle-plane units
pub const ORIGIN_RANGE: Range = Range::new(-1000.0, 1000.0);
pub const SCALE_RANGE: Range = Range::new(0.5, 4.0);
pub const APEX_RANGE: Range = Range::new(-500.0, 500.0);

/// How long an animated parameter takes to reach its new value
pub const ANIMATION_DURATION: Duration = Duration::from_millis(200);

pub const POPUP_ADDED_DELAY: Duration = Duration::from_millis(50);
pub const POPUP_SELECTED_DELAY: Duration = Duration::from_millis(150);
pub const POPUP_CLOSED_DELAY: Duration = Duration::ZERO;

pub const LINE_WIDTH: f64 = 4.0;
/// Radius of a painted handle marker
pub const HANDLE_RADIUS: f64 = 15.0;
pub const LABEL_FONT: &str = "px sans-serif";

/// Segments used when flattening one bezier for hit testing
pub const BEZIER_SEGMENTS: usize = 16;
/// Segments used when flattening a full circle for hit testing
pub const ARC_SEGMENTS_PER_TURN: usize = 64;

/// Length of the shared pseudo-random sequence handed to doodles
pub const RANDOM_SEQUENCE_LEN: usize = 500;
pub const RANDOM_SEED: u64 = 0x5EED;
