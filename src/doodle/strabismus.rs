//! Strabismus surgery doodles

use std::f64::consts::PI;

use glam::{DVec2, dvec2};

use super::{ClassName, DoodleBehaviour, DoodleState};
use crate::params::names;
use crate::render::{Canvas, Path, Style};
use crate::surface::{DrawingContext, Eye, Surface};
use crate::types::Colour;

/// Dashed guide line tilted towards the nose
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct APattern;

impl APattern {
    const START_Y: f64 = -500.0;
    const DASH: f64 = 4.0;
    const GAP: f64 = 4.0;
}

impl DoodleBehaviour for APattern {
    fn class_name(&self) -> ClassName {
        ClassName::APattern
    }

    fn configure(&self, state: &mut DoodleState) {
        let flags = &mut state.flags;
        flags.is_selectable = false;
        flags.is_orientated = false;
        flags.is_scaleable = false;
        flags.is_squeezable = false;
        flags.is_moveable = false;
        flags.is_rotatable = false;
    }

    fn place(&mut self, state: &mut DoodleState, surface: &mut dyn Surface) {
        let rotation = match surface.eye() {
            Eye::Right => PI / 8.0,
            Eye::Left => -PI / 8.0,
        };
        let _ = state.params.assign(names::ROTATION, rotation);
    }

    fn saved_parameters(&self) -> &'static [&'static str] {
        &[names::ROTATION]
    }

    fn boundary(&self, _state: &DoodleState) -> (Path, Style) {
        let mut path = Path::new();
        let mut length = 0.0;
        path.move_to(dvec2(0.0, Self::START_Y));
        while length < -2.0 * Self::START_Y {
            length += Self::DASH;
            path.line_to(dvec2(0.0, Self::START_Y + length));
            length += Self::GAP;
            path.move_to(dvec2(0.0, Self::START_Y + length));
        }
        path.close();
        (path, Style::stroked(Colour::rgba(80, 80, 80, 1.0), 4.0))
    }
}

/// Cornea with the four rectus insertions, as a backdrop for muscle surgery
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StrabOpTemplate;

impl StrabOpTemplate {
    const CORNEA_RADIUS: f64 = 80.0;
    const PUPIL_RADIUS: f64 = 30.0;
    const INSERTION_DISTANCE: f64 = 200.0;
    const INSERTION_HALF_WIDTH: f64 = 70.0;
}

impl DoodleBehaviour for StrabOpTemplate {
    fn class_name(&self) -> ClassName {
        ClassName::StrabOpTemplate
    }

    fn configure(&self, state: &mut DoodleState) {
        state.flags.is_selectable = false;
        state.flags.is_unique = true;
        state.flags.is_deletable = false;
    }

    fn saved_parameters(&self) -> &'static [&'static str] {
        &[names::ORIGIN_X, names::ORIGIN_Y]
    }

    fn boundary(&self, _state: &DoodleState) -> (Path, Style) {
        let mut path = Path::new();
        path.circle(DVec2::ZERO, Self::CORNEA_RADIUS).close();
        (
            path,
            Style::new(Colour::rgba(100, 200, 250, 0.75), Colour::BLUE, 4.0),
        )
    }

    fn decorate(&self, _state: &DoodleState, _ctx: &DrawingContext, canvas: &mut dyn Canvas) {
        let mut pupil = Path::new();
        pupil.circle(DVec2::ZERO, Self::PUPIL_RADIUS);
        canvas.fill_path(&pupil, Colour::BLACK);

        let (d, w) = (Self::INSERTION_DISTANCE, Self::INSERTION_HALF_WIDTH);
        let mut insertions = Path::new();
        insertions
            .move_to(dvec2(-w, -d))
            .line_to(dvec2(w, -d))
            .move_to(dvec2(-d, -w))
            .line_to(dvec2(-d, w))
            .move_to(dvec2(-w, d))
            .line_to(dvec2(w, d))
            .move_to(dvec2(d, -w))
            .line_to(dvec2(d, w));
        canvas.stroke_path(&insertions, Colour::BROWN, 16.0);
    }
}
