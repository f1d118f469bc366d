//! What a doodle may ask of the drawing that hosts it.
//!
//! Doodles never reach for global state. Everything shared across a drawing
//! (eye, random sequence, chart layout) arrives through a [`DrawingContext`]
//! or a [`Surface`] query.

use std::time::Duration;

use glam::{DVec2, dvec2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::render::defaults;

/// Which eye the drawing describes; mirrored variants flip their defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Eye {
    #[default]
    Right,
    Left,
}

impl Eye {
    /// Horizontal direction of "further out" for this eye
    pub fn outward(self) -> f64 {
        match self {
            Eye::Right => -1.0,
            Eye::Left => 1.0,
        }
    }
}

/// Reproducible sequence of uniform values in `[0, 1)`
#[derive(Debug, Clone, PartialEq)]
pub struct RandomSequence {
    values: Vec<f64>,
}

impl RandomSequence {
    pub fn seeded(seed: u64, len: usize) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let values = (0..len.max(1)).map(|_| rng.r#gen::<f64>()).collect();
        Self { values }
    }

    pub fn from_values(values: Vec<f64>) -> Self {
        if values.is_empty() {
            return Self { values: vec![0.0] };
        }
        Self { values }
    }

    /// Value `i`, cycling when `i` runs past the end
    pub fn get(&self, i: usize) -> f64 {
        self.values[i % self.values.len()]
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Default for RandomSequence {
    fn default() -> Self {
        Self::seeded(defaults::RANDOM_SEED, defaults::RANDOM_SEQUENCE_LEN)
    }
}

/// Placement of the dental chart relative to pointer coordinates.
///
/// A pointer point maps into a tooth cell as
/// `x = p.x − (originX + origin_offset)·scale − displacement.x`,
/// `y = p.y − displacement.y`. The cell is then split at `near` and `far`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionLayout {
    pub origin_offset: f64,
    pub scale: f64,
    pub displacement: DVec2,
    pub near: f64,
    pub far: f64,
}

impl Default for RegionLayout {
    fn default() -> Self {
        Self {
            origin_offset: 1500.0,
            scale: 60.0 / 200.0,
            displacement: dvec2(20.0, 70.0),
            near: 15.0,
            far: 45.0,
        }
    }
}

impl RegionLayout {
    /// Pointer point in the cell of a doodle whose origin is at `origin_x`
    pub fn to_cell(&self, point: DVec2, origin_x: f64) -> DVec2 {
        dvec2(
            point.x - (origin_x + self.origin_offset) * self.scale - self.displacement.x,
            point.y - self.displacement.y,
        )
    }
}

/// Shared per-drawing state threaded into every doodle operation
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingContext {
    pub eye: Eye,
    pub random: RandomSequence,
    pub region_layout: RegionLayout,
    pub animation_duration: Duration,
}

impl Default for DrawingContext {
    fn default() -> Self {
        Self {
            eye: Eye::default(),
            random: RandomSequence::default(),
            region_layout: RegionLayout::default(),
            animation_duration: defaults::ANIMATION_DURATION,
        }
    }
}

impl DrawingContext {
    pub fn for_eye(eye: Eye) -> Self {
        Self {
            eye,
            ..Self::default()
        }
    }
}

/// A cell of the dental chart
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartBox {
    pub number: u32,
    pub position: DVec2,
}

/// Host queries available to doodles while they are placed
pub trait Surface {
    fn context(&self) -> &DrawingContext;

    fn eye(&self) -> Eye {
        self.context().eye
    }

    /// Whether any doodle of the named class is on the drawing
    fn has_doodle_of_class(&self, class: &str) -> bool;

    /// Origin of the most recently added doodle of the named class
    fn last_origin_of_class(&self, class: &str) -> Option<DVec2>;

    /// Take the next free chart cell, if the drawing has a chart
    fn claim_chart_box(&mut self) -> Option<ChartBox>;

    /// The chart cell at `position`, if any
    fn chart_box_at(&self, _position: DVec2) -> Option<ChartBox> {
        None
    }
}

/// A surface with nothing on it, for building doodles outside a drawing
#[derive(Debug, Clone, Default)]
pub struct EmptySurface {
    pub context: DrawingContext,
}

impl EmptySurface {
    pub fn new(context: DrawingContext) -> Self {
        Self { context }
    }
}

impl Surface for EmptySurface {
    fn context(&self) -> &DrawingContext {
        &self.context
    }

    fn has_doodle_of_class(&self, _class: &str) -> bool {
        false
    }

    fn last_origin_of_class(&self, _class: &str) -> Option<DVec2> {
        None
    }

    fn claim_chart_box(&mut self) -> Option<ChartBox> {
        None
    }
}
