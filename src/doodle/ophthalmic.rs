//! Fundus and anterior segment doodles

use std::f64::consts::{PI, TAU};

use glam::{DVec2, dvec2};

use super::{ClassName, DoodleBehaviour, DoodleState, default_handle_point};
use crate::handles::{APEX_HANDLE, Handle, HandleMode, VectorRange};
use crate::params::{Constraint, DependentValues, ParameterDescriptor, ParameterEngine, ParameterValue, names};
use crate::render::{Canvas, Path, Style};
use crate::squiggle::{Squiggle, closed_curve};
use crate::surface::{DrawingContext, Eye, Surface};
use crate::types::{AngleRange, Clock, Colour, Range, degrees, polar};

// ============================================================================
// FocalChoroiditis
// ============================================================================

const PIGMENTED: &str = "pigmented";

/// Free-form lesion whose outline is a smooth curve through its handles
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FocalChoroiditis;

impl FocalChoroiditis {
    pub const NUMBER_OF_HANDLES: usize = 4;
    pub const INITIAL_RADIUS: f64 = 80.0;
    pub const LENGTH_RANGE: Range = Range::new(50.0, 290.0);

    /// Sector handle `i` may move in: centred on its starting angle, one
    /// handle-spacing wide
    pub fn angle_range(i: usize) -> AngleRange {
        let n = Self::NUMBER_OF_HANDLES as f64;
        let i = i as f64;
        AngleRange::new(
            ((2.0 * n - 1.0) * TAU / (2.0 * n) + i * TAU / n) % TAU,
            (TAU / (2.0 * n) + i * TAU / n) % TAU,
        )
    }
}

impl DoodleBehaviour for FocalChoroiditis {
    fn class_name(&self) -> ClassName {
        ClassName::FocalChoroiditis
    }

    fn configure(&self, state: &mut DoodleState) {
        let n = Self::NUMBER_OF_HANDLES;
        let mut handles: Vec<Handle> = (0..n)
            .map(|i| {
                Handle::visible(HandleMode::Handles)
                    .with_range(VectorRange::new(Self::LENGTH_RANGE, Self::angle_range(i)))
            })
            .collect();
        handles[0] = handles[0].rotatable();
        // The apex keeps its base slot, after the curve handles
        handles.push(Handle::new(HandleMode::Apex, false));
        state.handles = handles;

        state.params.set_range(names::APEX_X, 0.0, 0.0);
        state.params.set_range(names::APEX_Y, -50.0, 50.0);
        state.params.register(
            PIGMENTED,
            ParameterDescriptor::derived(Constraint::Boolean).displayed(),
            false,
        );
        state.flags.add_at_back = true;

        state.seed_ring(
            Squiggle::new(Colour::rgba(100, 100, 100, 1.0), 4.0, true),
            n,
            Self::INITIAL_RADIUS,
        );
    }

    fn place(&mut self, state: &mut DoodleState, surface: &mut dyn Surface) {
        let _ = state.params.assign(names::APEX_Y, 50.0);
        state.set_origin_with_displacements(surface, 200.0, 150.0);
    }

    fn saved_parameters(&self) -> &'static [&'static str] {
        &[
            PIGMENTED,
            names::ORIGIN_X,
            names::ORIGIN_Y,
            names::APEX_X,
            names::APEX_Y,
            names::ROTATION,
        ]
    }

    fn boundary(&self, state: &DoodleState) -> (Path, Style) {
        let points = state.squiggles.first().map(|s| s.points.as_slice()).unwrap_or(&[]);
        let style = if state.params.flag(PIGMENTED) {
            Style::new(Colour::rgba(255, 255, 200, 0.8), Colour::BROWN, 8.0)
        } else {
            let yellow = Colour::rgba(255, 255, 0, 0.8);
            Style::new(yellow, yellow, 8.0)
        };
        (closed_curve(points), style)
    }

    fn description(&self, _state: &DoodleState) -> String {
        "Focal choroiditis".to_string()
    }
}

// ============================================================================
// TrialLens
// ============================================================================

const AXIS: &str = "axis";

/// Annular trial frame lens whose orientation is read as an axis in degrees
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrialLens;

impl TrialLens {
    const OUTER_RADIUS: f64 = 360.0;
    const INNER_RADIUS: f64 = 180.0;

    /// Axis in degrees for a rotation in radians
    pub fn axis_for_rotation(rotation: f64) -> f64 {
        (360.0 - degrees(rotation)) % 180.0
    }

    pub fn rotation_for_axis(axis: f64) -> f64 {
        (180.0 - axis) * PI / 180.0
    }
}

impl DoodleBehaviour for TrialLens {
    fn class_name(&self) -> ClassName {
        ClassName::TrialLens
    }

    fn configure(&self, state: &mut DoodleState) {
        state.flags.is_deletable = false;
        state.flags.is_moveable = false;
        state.flags.add_at_back = true;
        state.flags.is_unique = true;
        state.params.register(
            AXIS,
            ParameterDescriptor::derived(Constraint::modular(0.0, 180.0, Clock::Bottom)).animated(),
            180.0,
        );
    }

    fn place(&mut self, state: &mut DoodleState, _surface: &mut dyn Surface) {
        let _ = state
            .params
            .set_parameter_from_string(AXIS, "0", |p, n, v| self.dependent_parameter_values(p, n, v));
    }

    fn saved_parameters(&self) -> &'static [&'static str] {
        &[names::ROTATION]
    }

    fn dependent_parameter_values(&self, _params: &ParameterEngine, name: &str, value: &ParameterValue) -> DependentValues {
        let Some(v) = value.as_number() else {
            return Vec::new();
        };
        match name {
            names::ROTATION => vec![(AXIS, Self::axis_for_rotation(v).into())],
            AXIS => vec![(names::ROTATION, Self::rotation_for_axis(v).into())],
            _ => Vec::new(),
        }
    }

    fn boundary(&self, _state: &DoodleState) -> (Path, Style) {
        let (ro, ri) = (Self::OUTER_RADIUS, Self::INNER_RADIUS);
        let mut path = Path::new();
        // Opposite directions leave the centre unfilled
        path.arc(DVec2::ZERO, ro, 0.0, TAU, true);
        path.move_to(dvec2(ri, 0.0));
        path.arc(DVec2::ZERO, ri, TAU, 0.0, false);
        (path, Style::new(Colour::rgba(255, 100, 100, 1.0), Colour::GRAY, 4.0))
    }

    fn decorate(&self, _state: &DoodleState, _ctx: &DrawingContext, canvas: &mut dyn Canvas) {
        let (ro, ri, d) = (Self::OUTER_RADIUS, Self::INNER_RADIUS, 20.0);
        let mut marks = Path::new();
        marks
            .move_to(dvec2(ro - d, 0.0))
            .line_to(dvec2(ri + d, 0.0))
            .move_to(dvec2(-ro + d, 0.0))
            .line_to(dvec2(-ri - d, 0.0));
        canvas.stroke_path(&marks, Colour::BLACK, 16.0);
    }
}

// ============================================================================
// KeraticPrecipitates
// ============================================================================

/// Scatter of precipitates across the cornea; apexX sets spot size, apexY count
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KeraticPrecipitates;

impl KeraticPrecipitates {
    const RADIUS: f64 = 200.0;
    const SPOT_FILL: Colour = Colour::rgba(110, 110, 110, 0.5);
    /// Offset into the random sequence of the spot angles
    const ANGLE_OFFSET: usize = 100;

    pub fn spot_count(state: &DoodleState) -> usize {
        40 + (state.params.number(names::APEX_Y) / 2.0).floor().abs() as usize
    }

    /// Spot centres and radius, in local space
    pub fn spots(state: &DoodleState, ctx: &DrawingContext) -> (Vec<DVec2>, f64) {
        let apex = state.apex();
        let radius = 10.0 * ((apex.x + 20.0) / 20.0) / state.scale().x;
        let centres = (0..Self::spot_count(state))
            .map(|i| {
                polar::from_polar(
                    Self::RADIUS * ctx.random.get(i),
                    TAU * ctx.random.get(i + Self::ANGLE_OFFSET),
                )
            })
            .collect();
        (centres, radius)
    }
}

impl DoodleBehaviour for KeraticPrecipitates {
    fn class_name(&self) -> ClassName {
        ClassName::KeraticPrecipitates
    }

    fn configure(&self, state: &mut DoodleState) {
        state.handles[2] = Handle::visible(HandleMode::Scale);
        state.handles[APEX_HANDLE] = Handle::visible(HandleMode::Apex);
        state.flags.is_rotatable = false;
        state.flags.is_unique = true;
        state.params.set_range(names::APEX_X, 0.0, 40.0);
        state.params.set_range(names::APEX_Y, -160.0, 0.0);
        state.params.set_range(names::SCALE_X, 0.5, 1.5);
        state.params.set_range(names::SCALE_Y, 0.5, 1.5);
    }

    /// Sits to one side and at half size when a fundus is drawn
    fn place(&mut self, state: &mut DoodleState, surface: &mut dyn Surface) {
        if surface.has_doodle_of_class("Fundus") {
            let x = match surface.eye() {
                Eye::Right => -100.0,
                Eye::Left => 100.0,
            };
            state.set_origin(dvec2(x, state.origin().y));
            let _ = state.params.assign(names::SCALE_X, 0.5);
            let _ = state.params.assign(names::SCALE_Y, 0.5);
        }
    }

    fn saved_parameters(&self) -> &'static [&'static str] {
        &[names::APEX_X, names::APEX_Y, names::SCALE_X, names::SCALE_Y]
    }

    fn boundary(&self, _state: &DoodleState) -> (Path, Style) {
        let mut path = Path::new();
        path.circle(DVec2::ZERO, Self::RADIUS).close();
        (path, Style::invisible())
    }

    fn decorate(&self, state: &DoodleState, ctx: &DrawingContext, canvas: &mut dyn Canvas) {
        let (centres, radius) = Self::spots(state, ctx);
        let mut spots = Path::new();
        for c in centres {
            spots.move_to(c + dvec2(radius, 0.0));
            spots.circle(c, radius);
        }
        canvas.fill_path(&spots, Self::SPOT_FILL);
    }

    fn handle_point(&self, state: &DoodleState, index: usize) -> DVec2 {
        match index {
            2 => dvec2(Self::RADIUS * 0.7, -Self::RADIUS * 0.7),
            _ => default_handle_point(state, index),
        }
    }

    fn description(&self, state: &DoodleState) -> String {
        if state.params.number(names::APEX_X) > 20.0 {
            "Mutton fat keratic precipitates".to_string()
        } else {
            "Keratic precipitates".to_string()
        }
    }
}

// ============================================================================
// HardExudate
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HardExudate;

impl DoodleBehaviour for HardExudate {
    fn class_name(&self) -> ClassName {
        ClassName::HardExudate
    }

    fn configure(&self, _state: &mut DoodleState) {}

    fn place(&mut self, state: &mut DoodleState, surface: &mut dyn Surface) {
        state.set_origin_with_displacements(surface, 50.0, 30.0);
    }

    fn saved_parameters(&self) -> &'static [&'static str] {
        &[names::ORIGIN_X, names::ORIGIN_Y]
    }

    fn boundary(&self, _state: &DoodleState) -> (Path, Style) {
        let mut path = Path::new();
        path.circle(DVec2::ZERO, 14.0);
        let yellow = Colour::rgba(220, 220, 0, 1.0);
        (path, Style::new(yellow, yellow, 1.0))
    }

    fn group_description(&self, _state: &DoodleState) -> Option<String> {
        Some("Hard exudates".to_string())
    }
}
