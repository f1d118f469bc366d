//! Dental chart doodles.
//!
//! Each occupies one cell of the chart: a 200×200 box claimed from the surface
//! when the doodle is added. None of them can be moved off their cell.

use bitflags::bitflags;
use glam::{DVec2, dvec2};

use super::{ClassName, DoodleBehaviour, DoodleState};
use crate::handles::{Handle, HandleMode};
use crate::log::{debug, warn};
use crate::notify::{EventFilter, EventName, Notification};
use crate::params::{Constraint, ParameterChange, ParameterDescriptor, names};
use crate::render::{Canvas, Label, Path, Style};
use crate::surface::{DrawingContext, RegionLayout, Surface};
use crate::types::Colour;

const BOX_DIMENSION: f64 = 200.0;
const BOX_LINE_WIDTH: f64 = 6.0;
/// Handle slot that rotates a tooth doodle
const ROTATE_HANDLE: usize = 2;
/// Where a tooth doodle goes when the drawing has no chart
const FALLBACK_ORIGIN: DVec2 = DVec2::new(0.0, -400.0);

const LOCATIONS: &str = "locations";
const TYPE: &str = "type";

fn tooth_boundary() -> (Path, Style) {
    let mut path = Path::new();
    let d = BOX_DIMENSION;
    path.rect(dvec2(-d / 2.0, -d / 2.0), dvec2(d, d));
    (
        path,
        Style::new(Colour::rgba(255, 255, 255, 0.0), Colour::BLUE, BOX_LINE_WIDTH),
    )
}

fn configure_tooth(state: &mut DoodleState) {
    state.handles[ROTATE_HANDLE] = Handle::visible(HandleMode::Rotate);
    state.flags.is_moveable = false;
}

/// Claim the next chart cell and move onto it
fn place_in_chart(state: &mut DoodleState, surface: &mut dyn Surface) -> Option<u32> {
    match surface.claim_chart_box() {
        Some(cell) => {
            state.set_origin(cell.position);
            Some(cell.number)
        }
        None => {
            warn!(class = %state.params.class(), "no free chart cell, using fallback position");
            state.set_origin(FALLBACK_ORIGIN);
            None
        }
    }
}

fn tooth_after_restore(state: &DoodleState, surface: &dyn Surface) -> Option<u32> {
    surface.chart_box_at(state.origin()).map(|cell| cell.number)
}

fn tooth_label(tooth: Option<u32>) -> String {
    tooth.map_or_else(|| "?".to_string(), |n| n.to_string())
}

// ============================================================================
// Caries
// ============================================================================

bitflags! {
    /// Tooth surfaces, one bit each, as stored in the `locations` parameter
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ToothSurfaces: u32 {
        const DISTAL = 1;
        const BUCCAL = 2;
        const MESIAL = 4;
        const PALATAL = 8;
        const OCCLUSAL = 16;
    }
}

impl ToothSurfaces {
    /// Surfaces in description order, with the spot drawn for each
    const SPOTS: [(ToothSurfaces, &'static str, DVec2); 5] = [
        (ToothSurfaces::DISTAL, "distal", DVec2::new(-76.0, 0.0)),
        (ToothSurfaces::BUCCAL, "buccal", DVec2::new(0.0, -76.0)),
        (ToothSurfaces::MESIAL, "mesial", DVec2::new(76.0, 0.0)),
        (ToothSurfaces::PALATAL, "palatal", DVec2::new(0.0, 76.0)),
        (ToothSurfaces::OCCLUSAL, "occlusal", DVec2::new(0.0, 0.0)),
    ];

    /// Which surface a point in the tooth cell falls on.
    ///
    /// Horizontal extremes win over the vertical thirds.
    pub fn at(cell: DVec2, layout: &RegionLayout) -> ToothSurfaces {
        if cell.x <= layout.near {
            ToothSurfaces::DISTAL
        } else if cell.x >= layout.far {
            ToothSurfaces::MESIAL
        } else if cell.y <= layout.near {
            ToothSurfaces::BUCCAL
        } else if cell.y < layout.far {
            ToothSurfaces::OCCLUSAL
        } else {
            ToothSurfaces::PALATAL
        }
    }

    fn from_parameter(value: f64) -> ToothSurfaces {
        ToothSurfaces::from_bits_truncate(value.max(0.0) as u32)
    }
}

const SPOT_RADIUS: f64 = 14.0;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Caries {
    tooth_number: Option<u32>,
}

impl Caries {
    pub fn surfaces(state: &DoodleState) -> ToothSurfaces {
        ToothSurfaces::from_parameter(state.params.number(LOCATIONS))
    }
}

impl DoodleBehaviour for Caries {
    fn class_name(&self) -> ClassName {
        ClassName::Caries
    }

    fn configure(&self, state: &mut DoodleState) {
        configure_tooth(state);
        state.params.register(
            LOCATIONS,
            ParameterDescriptor::simple(Constraint::int(0.0, ToothSurfaces::all().bits() as f64)),
            ToothSurfaces::OCCLUSAL.bits() as f64,
        );
    }

    fn place(&mut self, state: &mut DoodleState, surface: &mut dyn Surface) {
        self.tooth_number = place_in_chart(state, surface);
    }

    fn restored(&mut self, state: &DoodleState, surface: &dyn Surface) {
        self.tooth_number = tooth_after_restore(state, surface);
    }

    fn saved_parameters(&self) -> &'static [&'static str] {
        &[names::ORIGIN_X, names::ORIGIN_Y, LOCATIONS]
    }

    fn boundary(&self, _state: &DoodleState) -> (Path, Style) {
        tooth_boundary()
    }

    fn decorate(&self, state: &DoodleState, _ctx: &DrawingContext, canvas: &mut dyn Canvas) {
        let surfaces = Self::surfaces(state);
        let mut spots = Path::new();
        for (surface, _, at) in ToothSurfaces::SPOTS {
            if surfaces.contains(surface) {
                spots.move_to(at + dvec2(SPOT_RADIUS, 0.0));
                spots.circle(at, SPOT_RADIUS);
            }
        }
        if !spots.is_empty() {
            canvas.fill_path(&spots, Colour::RED);
        }
    }

    fn description(&self, state: &DoodleState) -> String {
        let surfaces = Self::surfaces(state);
        let positions: String = ToothSurfaces::SPOTS
            .iter()
            .filter(|(s, _, _)| surfaces.contains(*s))
            .map(|(_, name, _)| format!("{name} "))
            .collect();
        format!("{} has caries in the {positions}position", tooth_label(self.tooth_number))
    }

    fn subscriptions(&self) -> Option<EventFilter> {
        Some(EventFilter::only([EventName::MouseDown]))
    }

    /// Toggle the surface under the pointer, but only while selected
    fn on_notification(
        &mut self,
        state: &mut DoodleState,
        notification: &Notification,
        ctx: &DrawingContext,
    ) -> Vec<ParameterChange> {
        if notification.event != EventName::MouseDown || !state.flags.is_selected {
            return Vec::new();
        }
        let Some(point) = notification.point() else {
            return Vec::new();
        };

        let layout = &ctx.region_layout;
        let cell = layout.to_cell(point, state.params.number(names::ORIGIN_X));
        let hit = ToothSurfaces::at(cell, layout);
        let toggled = Self::surfaces(state) ^ hit;
        debug!(?hit, locations = toggled.bits(), "toggled caries surface");

        match state
            .params
            .set_parameter(LOCATIONS, toggled.bits() as f64, |_, _, _| Vec::new())
        {
            Ok(changes) => changes,
            Err(err) => {
                warn!(error = %err, "caries surface toggle rejected");
                Vec::new()
            }
        }
    }
}

// ============================================================================
// Labelled tooth doodles
// ============================================================================

const BRIDGE_TYPES: [&str; 3] = ["Temporary", "Porcelain", "Metal"];

fn register_type(state: &mut DoodleState) {
    state.params.register(
        TYPE,
        ParameterDescriptor::derived(Constraint::list(BRIDGE_TYPES)).displayed(),
        BRIDGE_TYPES[0],
    );
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BridgeRetainer {
    tooth_number: Option<u32>,
}

impl DoodleBehaviour for BridgeRetainer {
    fn class_name(&self) -> ClassName {
        ClassName::BridgeRetainer
    }

    fn configure(&self, state: &mut DoodleState) {
        configure_tooth(state);
        register_type(state);
    }

    fn place(&mut self, state: &mut DoodleState, surface: &mut dyn Surface) {
        self.tooth_number = place_in_chart(state, surface);
    }

    fn restored(&mut self, state: &DoodleState, surface: &dyn Surface) {
        self.tooth_number = tooth_after_restore(state, surface);
    }

    fn saved_parameters(&self) -> &'static [&'static str] {
        &[names::ORIGIN_X, names::ORIGIN_Y, TYPE]
    }

    fn boundary(&self, _state: &DoodleState) -> (Path, Style) {
        tooth_boundary()
    }

    fn decorate(&self, _state: &DoodleState, _ctx: &DrawingContext, canvas: &mut dyn Canvas) {
        canvas.fill_text(&Label::new("Br R", dvec2(0.0, 22.0), 72.0, Colour::BLACK));
    }

    // Retainers are reported as part of their bridge
    fn description(&self, _state: &DoodleState) -> String {
        String::new()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceLoss {
    tooth_number: Option<u32>,
}

impl DoodleBehaviour for SurfaceLoss {
    fn class_name(&self) -> ClassName {
        ClassName::SurfaceLoss
    }

    fn configure(&self, state: &mut DoodleState) {
        configure_tooth(state);
        register_type(state);
    }

    fn place(&mut self, state: &mut DoodleState, surface: &mut dyn Surface) {
        self.tooth_number = place_in_chart(state, surface);
    }

    fn restored(&mut self, state: &DoodleState, surface: &dyn Surface) {
        self.tooth_number = tooth_after_restore(state, surface);
    }

    fn saved_parameters(&self) -> &'static [&'static str] {
        &[names::ORIGIN_X, names::ORIGIN_Y]
    }

    fn boundary(&self, _state: &DoodleState) -> (Path, Style) {
        tooth_boundary()
    }

    fn decorate(&self, _state: &DoodleState, _ctx: &DrawingContext, canvas: &mut dyn Canvas) {
        canvas.fill_text(&Label::new("TSL", dvec2(0.0, 22.0), 72.0, Colour::BLACK));
    }

    fn description(&self, _state: &DoodleState) -> String {
        format!("{} has surface loss", tooth_label(self.tooth_number))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fracture {
    tooth_number: Option<u32>,
}

impl DoodleBehaviour for Fracture {
    fn class_name(&self) -> ClassName {
        ClassName::Fracture
    }

    fn configure(&self, state: &mut DoodleState) {
        configure_tooth(state);
        state.flags.is_rotatable = false;
    }

    fn place(&mut self, state: &mut DoodleState, surface: &mut dyn Surface) {
        self.tooth_number = place_in_chart(state, surface);
    }

    fn restored(&mut self, state: &DoodleState, surface: &dyn Surface) {
        self.tooth_number = tooth_after_restore(state, surface);
    }

    fn saved_parameters(&self) -> &'static [&'static str] {
        &[names::ORIGIN_X, names::ORIGIN_Y]
    }

    fn boundary(&self, _state: &DoodleState) -> (Path, Style) {
        tooth_boundary()
    }

    fn decorate(&self, _state: &DoodleState, _ctx: &DrawingContext, canvas: &mut dyn Canvas) {
        canvas.fill_text(&Label::new("#", dvec2(0.0, 42.0), 128.0, Colour::GRAY));
    }

    fn description(&self, _state: &DoodleState) -> String {
        format!("{} is fractured", tooth_label(self.tooth_number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::notify::Payload;

    fn press(at: DVec2) -> Notification {
        Notification::new(EventName::MouseDown, Duration::ZERO, Payload::Point(at))
    }

    fn selected_caries() -> (Caries, DoodleState) {
        let caries = Caries::default();
        let mut state = DoodleState::new(ClassName::Caries);
        caries.configure(&mut state);
        state.flags.is_selected = true;
        (caries, state)
    }

    #[test]
    fn press_on_distal_surface_toggles_it() {
        let (mut caries, mut state) = selected_caries();
        let changes = caries.on_notification(&mut state, &press(dvec2(480.0, 100.0)), &DrawingContext::default());
        assert_eq!(changes.len(), 1);
        assert_eq!(state.params.number(LOCATIONS), 17.0);
    }

    #[test]
    fn rejected_toggle_reports_no_change() {
        let (mut caries, mut state) = selected_caries();
        state
            .params
            .register(LOCATIONS, ParameterDescriptor::simple(Constraint::Boolean), true);
        let changes = caries.on_notification(&mut state, &press(dvec2(480.0, 100.0)), &DrawingContext::default());
        assert!(changes.is_empty());
        assert!(state.params.flag(LOCATIONS));
    }

    #[test]
    fn region_decision_order() {
        let layout = RegionLayout::default();
        assert_eq!(ToothSurfaces::at(dvec2(10.0, 30.0), &layout), ToothSurfaces::DISTAL);
        // Horizontal extremes are checked before the vertical thirds
        assert_eq!(ToothSurfaces::at(dvec2(50.0, 0.0), &layout), ToothSurfaces::MESIAL);
        assert_eq!(ToothSurfaces::at(dvec2(30.0, 15.0), &layout), ToothSurfaces::BUCCAL);
        assert_eq!(ToothSurfaces::at(dvec2(30.0, 30.0), &layout), ToothSurfaces::OCCLUSAL);
        assert_eq!(ToothSurfaces::at(dvec2(30.0, 45.0), &layout), ToothSurfaces::PALATAL);
    }

    #[test]
    fn xor_toggles_single_bits() {
        let mut locations = ToothSurfaces::empty();
        locations ^= ToothSurfaces::DISTAL;
        locations ^= ToothSurfaces::DISTAL;
        assert_eq!(locations.bits(), 0);
        locations ^= ToothSurfaces::DISTAL;
        locations ^= ToothSurfaces::MESIAL;
        assert_eq!(locations.bits(), 5);
    }

    #[test]
    fn unknown_bits_are_dropped() {
        assert_eq!(ToothSurfaces::from_parameter(63.0), ToothSurfaces::all());
        assert_eq!(ToothSurfaces::from_parameter(-4.0), ToothSurfaces::empty());
    }
}
