//! Interactive control points.
//!
//! A [`Handle`] is a reference, not a value: where it sits is always derived
//! from the doodle's current parameters and squiggles. What dragging it does is
//! decided by its [`HandleMode`], after the proposed point has been clamped
//! through the handle's optional [`VectorRange`].

use glam::DVec2;

use crate::types::{AngleRange, Range, polar};

/// What dragging a handle edits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleMode {
    /// Moves point `i` of squiggle 0
    Handles,
    /// Moves the apex parameters
    Apex,
    /// Scales the doodle by the ratio of distances from the origin
    Scale,
    /// Rotates the doodle by the change in angle about the origin
    Rotate,
}

/// Length and clockwise angular sector a handle may be dragged within,
/// both measured about the doodle origin in local space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorRange {
    pub length: Range,
    pub angle: AngleRange,
}

impl VectorRange {
    pub fn new(length: Range, angle: AngleRange) -> Self {
        Self { length, angle }
    }

    /// Bring `p` inside the range via its polar form
    pub fn clamp(&self, p: DVec2) -> DVec2 {
        let length = self.length.constrain(p.length());
        let angle = self.angle.constrain(polar::direction(p));
        polar::from_polar(length, angle)
    }

    pub fn includes(&self, p: DVec2) -> bool {
        self.length.includes(p.length()) && self.angle.includes(polar::direction(p))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    pub mode: HandleMode,
    pub is_visible: bool,
    /// Painted as a rotation marker
    pub is_rotatable: bool,
    pub range: Option<VectorRange>,
}

impl Handle {
    pub fn new(mode: HandleMode, is_visible: bool) -> Self {
        Self {
            mode,
            is_visible,
            is_rotatable: mode == HandleMode::Rotate,
            range: None,
        }
    }

    pub fn visible(mode: HandleMode) -> Self {
        Self::new(mode, true)
    }

    pub fn with_range(mut self, range: VectorRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn rotatable(mut self) -> Self {
        self.is_rotatable = true;
        self
    }

    /// Apply the vector range, if any
    pub fn clamp(&self, p: DVec2) -> DVec2 {
        match &self.range {
            Some(range) => range.clamp(p),
            None => p,
        }
    }
}

/// Number of handle slots every doodle starts with
pub const BASE_HANDLE_COUNT: usize = 5;
/// Slot of the apex handle in the base layout
pub const APEX_HANDLE: usize = 4;

/// The base layout: four scale corners then the apex, all hidden
pub fn base_handles() -> Vec<Handle> {
    let mut handles = vec![Handle::new(HandleMode::Scale, false); APEX_HANDLE];
    handles.push(Handle::new(HandleMode::Apex, false));
    handles
}
