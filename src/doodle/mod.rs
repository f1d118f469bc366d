//! Doodles: interactive shapes placed on a drawing.
//!
//! A [`Doodle`] pairs its variant ([`DoodleKind`]) with the state every doodle
//! has ([`DoodleState`]): parameters, flags, handles and squiggles. Variants
//! supply behaviour through [`DoodleBehaviour`] and never own geometry state of
//! their own, apart from the little that comes from the host (a tooth number).
//!
//! Each variant's `boundary` is the single source of its outline. Painting
//! fills and strokes it; hit testing checks containment against it.

mod dental;
mod ophthalmic;
mod strabismus;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use enum_dispatch::enum_dispatch;
use glam::{DVec2, dvec2};
use serde::{Deserialize, Serialize};

pub use dental::{BridgeRetainer, Caries, Fracture, SurfaceLoss, ToothSurfaces};
pub use ophthalmic::{FocalChoroiditis, HardExudate, KeraticPrecipitates, TrialLens};
pub use strabismus::{APattern, StrabOpTemplate};

use crate::errors::{DoodleError, Result};
use crate::handles::{self, Handle, HandleMode};
use crate::log::{debug, warn};
use crate::notify::{DoodleSummary, EventFilter, Notification};
use crate::params::{DependentValues, ParameterChange, ParameterEngine, ParameterValue, SavedParameters, names};
use crate::render::{Canvas, Path, RecordingCanvas, Style, paint};
use crate::squiggle::Squiggle;
use crate::surface::{DrawingContext, Surface};
use crate::transform::Transform;
use crate::types::polar;

// ============================================================================
// Identity
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClassName {
    Caries,
    BridgeRetainer,
    SurfaceLoss,
    Fracture,
    FocalChoroiditis,
    TrialLens,
    KeraticPrecipitates,
    HardExudate,
    APattern,
    StrabOpTemplate,
}

impl ClassName {
    pub const ALL: [ClassName; 10] = [
        ClassName::Caries,
        ClassName::BridgeRetainer,
        ClassName::SurfaceLoss,
        ClassName::Fracture,
        ClassName::FocalChoroiditis,
        ClassName::TrialLens,
        ClassName::KeraticPrecipitates,
        ClassName::HardExudate,
        ClassName::APattern,
        ClassName::StrabOpTemplate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ClassName::Caries => "Caries",
            ClassName::BridgeRetainer => "BridgeRetainer",
            ClassName::SurfaceLoss => "SurfaceLoss",
            ClassName::Fracture => "Fracture",
            ClassName::FocalChoroiditis => "FocalChoroiditis",
            ClassName::TrialLens => "TrialLens",
            ClassName::KeraticPrecipitates => "KeraticPrecipitates",
            ClassName::HardExudate => "HardExudate",
            ClassName::APattern => "APattern",
            ClassName::StrabOpTemplate => "StrabOpTemplate",
        }
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassName {
    type Err = DoodleError;

    fn from_str(s: &str) -> Result<Self> {
        ClassName::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| DoodleError::UnknownClass { name: s.to_string() })
    }
}

/// Identifier assigned by the drawing that owns a doodle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DoodleId(pub u32);

impl fmt::Display for DoodleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ============================================================================
// State shared by every variant
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoodleFlags {
    pub is_selected: bool,
    pub is_locked: bool,
    pub is_selectable: bool,
    pub is_moveable: bool,
    pub is_rotatable: bool,
    pub is_scaleable: bool,
    pub is_deletable: bool,
    /// At most one per drawing
    pub is_unique: bool,
    /// Rotation follows position about the drawing centre
    pub is_orientated: bool,
    /// Scales each axis independently
    pub is_squeezable: bool,
    /// Inserted beneath existing doodles
    pub add_at_back: bool,
}

impl Default for DoodleFlags {
    fn default() -> Self {
        Self {
            is_selected: false,
            is_locked: false,
            is_selectable: true,
            is_moveable: true,
            is_rotatable: true,
            is_scaleable: true,
            is_deletable: true,
            is_unique: false,
            is_orientated: false,
            is_squeezable: false,
            add_at_back: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DoodleState {
    pub params: ParameterEngine,
    pub flags: DoodleFlags,
    pub handles: Vec<Handle>,
    pub squiggles: Vec<Squiggle>,
    pub is_clicked: bool,
}

impl DoodleState {
    fn new(class: ClassName) -> Self {
        Self {
            params: ParameterEngine::with_base_parameters(class),
            flags: DoodleFlags::default(),
            handles: handles::base_handles(),
            squiggles: Vec::new(),
            is_clicked: false,
        }
    }

    pub fn origin(&self) -> DVec2 {
        dvec2(self.params.number(names::ORIGIN_X), self.params.number(names::ORIGIN_Y))
    }

    pub fn rotation(&self) -> f64 {
        self.params.number(names::ROTATION)
    }

    pub fn scale(&self) -> DVec2 {
        dvec2(self.params.number(names::SCALE_X), self.params.number(names::SCALE_Y))
    }

    pub fn apex(&self) -> DVec2 {
        dvec2(self.params.number(names::APEX_X), self.params.number(names::APEX_Y))
    }

    /// Local → doodle-plane transform, rebuilt from the current parameters
    pub fn transform(&self) -> Transform {
        Transform::for_doodle(self.origin(), self.rotation(), self.scale())
    }

    /// Store an origin, clamped to the origin ranges
    pub fn set_origin(&mut self, origin: DVec2) {
        // Base descriptors always exist and are numeric, so neither can fail
        let _ = self.params.assign(names::ORIGIN_X, origin.x);
        let _ = self.params.assign(names::ORIGIN_Y, origin.y);
    }

    /// Place a new doodle relative to the last one of the same class.
    ///
    /// The first goes at `(dir·first, −first)`; later ones step `(dir·next, next)`
    /// from the previous, where `dir` points outward for the drawing's eye.
    pub fn set_origin_with_displacements(&mut self, surface: &dyn Surface, first: f64, next: f64) {
        let dir = surface.eye().outward();
        let class = self.params.class();
        let origin = match surface.last_origin_of_class(class.as_str()) {
            Some(last) => last + dvec2(dir * next, next),
            None => dvec2(dir * first, -first),
        };
        self.set_origin(origin);
    }

    /// Squiggle 0 seeded with `n` points evenly round a circle
    pub fn seed_ring(&mut self, squiggle: Squiggle, n: usize, radius: f64) {
        let mut squiggle = squiggle;
        for i in 0..n {
            squiggle.push_point(polar::from_polar(radius, i as f64 * std::f64::consts::TAU / n as f64));
        }
        self.squiggles = vec![squiggle];
    }
}

/// Local position of handle `index` for variants that use the base layout
pub fn default_handle_point(state: &DoodleState, index: usize) -> DVec2 {
    const CORNERS: [DVec2; 4] = [
        DVec2::new(-100.0, -100.0),
        DVec2::new(100.0, -100.0),
        DVec2::new(100.0, 100.0),
        DVec2::new(-100.0, 100.0),
    ];

    match state.handles.get(index).map(|h| h.mode) {
        Some(HandleMode::Handles) => state
            .squiggles
            .first()
            .and_then(|s| s.points.get(index).copied())
            .unwrap_or(DVec2::ZERO),
        Some(HandleMode::Apex) => state.apex(),
        Some(HandleMode::Scale | HandleMode::Rotate) => CORNERS.get(index).copied().unwrap_or(DVec2::ZERO),
        None => DVec2::ZERO,
    }
}

// ============================================================================
// Variant behaviour
// ============================================================================

/// What each doodle variant supplies
#[enum_dispatch]
pub trait DoodleBehaviour {
    fn class_name(&self) -> ClassName;

    /// Flags, handles, ranges and extra descriptors; run for every doodle
    fn configure(&self, state: &mut DoodleState);

    /// Defaults for a doodle newly added to a drawing
    fn place(&mut self, _state: &mut DoodleState, _surface: &mut dyn Surface) {}

    /// Recover host-derived variant data after a restore
    fn restored(&mut self, _state: &DoodleState, _surface: &dyn Surface) {}

    /// Parameters persisted by the host
    fn saved_parameters(&self) -> &'static [&'static str];

    /// Values of the parameters that depend on `name`, given its new `value`
    fn dependent_parameter_values(&self, _params: &ParameterEngine, _name: &str, _value: &ParameterValue) -> DependentValues {
        Vec::new()
    }

    /// Outline in local space plus how to paint it
    fn boundary(&self, state: &DoodleState) -> (Path, Style);

    /// Paint-only extras drawn after the boundary, in local space
    fn decorate(&self, _state: &DoodleState, _ctx: &DrawingContext, _canvas: &mut dyn Canvas) {}

    /// Local position of handle `index`
    fn handle_point(&self, state: &DoodleState, index: usize) -> DVec2 {
        default_handle_point(state, index)
    }

    fn description(&self, _state: &DoodleState) -> String {
        String::new()
    }

    /// Summary shared by all doodles of the class, used once per report
    fn group_description(&self, _state: &DoodleState) -> Option<String> {
        None
    }

    /// Events this variant listens to
    fn subscriptions(&self) -> Option<EventFilter> {
        None
    }

    fn on_notification(
        &mut self,
        _state: &mut DoodleState,
        _notification: &Notification,
        _ctx: &DrawingContext,
    ) -> Vec<ParameterChange> {
        Vec::new()
    }
}

#[enum_dispatch(DoodleBehaviour)]
#[derive(Debug, Clone, PartialEq)]
pub enum DoodleKind {
    Caries,
    BridgeRetainer,
    SurfaceLoss,
    Fracture,
    FocalChoroiditis,
    TrialLens,
    KeraticPrecipitates,
    HardExudate,
    APattern,
    StrabOpTemplate,
}

impl DoodleKind {
    pub fn for_class(class: ClassName) -> Self {
        match class {
            ClassName::Caries => Caries::default().into(),
            ClassName::BridgeRetainer => BridgeRetainer::default().into(),
            ClassName::SurfaceLoss => SurfaceLoss::default().into(),
            ClassName::Fracture => Fracture::default().into(),
            ClassName::FocalChoroiditis => FocalChoroiditis.into(),
            ClassName::TrialLens => TrialLens.into(),
            ClassName::KeraticPrecipitates => KeraticPrecipitates.into(),
            ClassName::HardExudate => HardExudate.into(),
            ClassName::APattern => APattern.into(),
            ClassName::StrabOpTemplate => StrabOpTemplate.into(),
        }
    }
}

// ============================================================================
// Doodle
// ============================================================================

/// Persisted form of a doodle: its class and the flat name → value mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedDoodle {
    pub class_name: ClassName,
    pub parameters: SavedParameters,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub squiggles: Vec<Squiggle>,
}

#[derive(Debug, Clone)]
pub struct Doodle {
    kind: DoodleKind,
    state: DoodleState,
}

impl Doodle {
    fn from_kind(kind: DoodleKind) -> Self {
        let mut state = DoodleState::new(kind.class_name());
        kind.configure(&mut state);
        debug_assert!(
            kind.saved_parameters().iter().all(|n| state.params.contains(n)),
            "{} saves a parameter it never registers",
            kind.class_name()
        );
        Self { kind, state }
    }

    /// Flags a newly configured doodle of `class` starts with
    pub fn default_flags(class: ClassName) -> DoodleFlags {
        Self::from_kind(DoodleKind::for_class(class)).state.flags
    }

    /// A doodle added interactively, placed using the surface
    pub fn new(class: ClassName, surface: &mut dyn Surface) -> Self {
        let mut doodle = Self::from_kind(DoodleKind::for_class(class));
        doodle.state.params.set_animation_duration(surface.context().animation_duration);
        doodle.kind.place(&mut doodle.state, surface);
        doodle.state.params.settle();
        debug!(class = %class, "placed doodle");
        doodle
    }

    /// Rebuild a doodle from its persisted form.
    ///
    /// Initial values apply first, then every saved name present in `saved`
    /// overrides them; names the class does not save are ignored. Derived
    /// parameters are recomputed from the restored values.
    pub fn restore(saved: &SavedDoodle, surface: &dyn Surface) -> Result<Self> {
        let mut doodle = Self::from_kind(DoodleKind::for_class(saved.class_name));
        doodle.state.params.set_animation_duration(surface.context().animation_duration);

        let names = doodle.kind.saved_parameters();
        for (name, value) in &saved.parameters {
            if !names.contains(&name.as_str()) {
                debug!(parameter = %name, class = %saved.class_name, "ignoring unsaved parameter");
                continue;
            }
            doodle.state.params.assign(name, value.clone())?;
        }
        for name in names {
            if let Some(value) = doodle.state.params.value(name).cloned() {
                doodle.set_parameter(name, value)?;
            }
        }
        doodle.state.params.settle();

        if let Some(first) = saved.squiggles.first() {
            let expected = doodle.state.squiggles.first().map(Squiggle::len);
            if expected.is_none_or(|n| n == first.len()) {
                doodle.state.squiggles = saved.squiggles.clone();
            } else {
                warn!(class = %saved.class_name, "saved squiggle has the wrong number of points; keeping default");
            }
        }

        doodle.kind.restored(&doodle.state, surface);
        Ok(doodle)
    }

    pub fn class_name(&self) -> ClassName {
        self.kind.class_name()
    }

    pub fn kind(&self) -> &DoodleKind {
        &self.kind
    }

    pub fn state(&self) -> &DoodleState {
        &self.state
    }

    pub fn flags(&self) -> &DoodleFlags {
        &self.state.flags
    }

    pub fn flags_mut(&mut self) -> &mut DoodleFlags {
        &mut self.state.flags
    }

    pub fn params(&self) -> &ParameterEngine {
        &self.state.params
    }

    pub fn squiggles(&self) -> &[Squiggle] {
        &self.state.squiggles
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterValue> {
        self.state.params.value(name)
    }

    /// Numeric parameter value, 0 when unset
    pub fn number(&self, name: &str) -> f64 {
        self.state.params.number(name)
    }

    pub fn origin(&self) -> DVec2 {
        self.state.origin()
    }

    pub fn transform(&self) -> Transform {
        self.state.transform()
    }

    pub fn is_clicked(&self) -> bool {
        self.state.is_clicked
    }

    pub fn summary(&self, id: DoodleId) -> DoodleSummary {
        DoodleSummary {
            id,
            class: self.class_name(),
            is_locked: self.state.flags.is_locked,
            is_selected: self.state.flags.is_selected,
        }
    }

    /// Validate, store and propagate a parameter value
    pub fn set_parameter(&mut self, name: &str, value: impl Into<ParameterValue>) -> Result<Vec<ParameterChange>> {
        let kind = &self.kind;
        self.state
            .params
            .set_parameter(name, value, |p, n, v| kind.dependent_parameter_values(p, n, v))
    }

    pub fn set_parameter_from_string(&mut self, name: &str, text: &str) -> Result<Vec<ParameterChange>> {
        let kind = &self.kind;
        self.state
            .params
            .set_parameter_from_string(name, text, |p, n, v| kind.dependent_parameter_values(p, n, v))
    }

    /// Step parameter tweens; true while any remain
    pub fn advance(&mut self, dt: Duration) -> bool {
        self.state.params.advance(dt)
    }

    // ------------------------------------------------------------------------
    // Handles
    // ------------------------------------------------------------------------

    pub fn handles(&self) -> &[Handle] {
        &self.state.handles
    }

    fn handle_or_err(&self, index: usize) -> Result<Handle> {
        self.state
            .handles
            .get(index)
            .copied()
            .ok_or(DoodleError::UnknownHandle {
                index,
                class: self.class_name(),
            })
    }

    /// Where handle `index` sits in the doodle plane, derived on every call
    pub fn handle_location(&self, index: usize) -> Result<DVec2> {
        self.handle_or_err(index)?;
        Ok(self.transform().apply(self.kind.handle_point(&self.state, index)))
    }

    /// Drag handle `index` to `proposed`, given in local space.
    ///
    /// The point is clamped through the handle's vector range first. A locked
    /// doodle ignores the drag.
    pub fn drag_handle(&mut self, index: usize, proposed: DVec2) -> Result<Vec<ParameterChange>> {
        let handle = self.handle_or_err(index)?;
        if self.state.flags.is_locked {
            debug!(class = %self.class_name(), index, "drag ignored on locked doodle");
            return Ok(Vec::new());
        }
        let p = handle.clamp(proposed);

        match handle.mode {
            HandleMode::Handles => {
                let moved = self
                    .state
                    .squiggles
                    .first_mut()
                    .is_some_and(|s| s.set_point(index, p));
                if !moved {
                    return Err(DoodleError::UnknownHandle {
                        index,
                        class: self.class_name(),
                    });
                }
                Ok(Vec::new())
            }
            HandleMode::Apex => {
                let mut changes = self.set_parameter(names::APEX_X, p.x)?;
                changes.extend(self.set_parameter(names::APEX_Y, p.y)?);
                Ok(changes)
            }
            HandleMode::Scale => {
                if !self.state.flags.is_scaleable {
                    return Ok(Vec::new());
                }
                let current = self.kind.handle_point(&self.state, index);
                let scale = self.state.scale();
                let new_scale = if self.state.flags.is_squeezable {
                    dvec2(ratio(p.x, current.x) * scale.x, ratio(p.y, current.y) * scale.y)
                } else {
                    scale * ratio(p.length(), current.length())
                };
                let mut changes = self.set_parameter(names::SCALE_X, new_scale.x)?;
                changes.extend(self.set_parameter(names::SCALE_Y, new_scale.y)?);
                Ok(changes)
            }
            HandleMode::Rotate => {
                if !self.state.flags.is_rotatable {
                    return Ok(Vec::new());
                }
                let current = self.kind.handle_point(&self.state, index);
                let delta = polar::direction(p) - polar::direction(current);
                let rotation = self.state.rotation() + delta;
                self.set_parameter(names::ROTATION, rotation)
            }
        }
    }

    /// Drag handle `index` to a point in the doodle plane
    pub fn drag_handle_to(&mut self, index: usize, point: DVec2) -> Result<Vec<ParameterChange>> {
        let local = self.transform().inverse_apply(point);
        self.drag_handle(index, local)
    }

    // ------------------------------------------------------------------------
    // Painting and hit testing
    // ------------------------------------------------------------------------

    /// Paint the doodle, or hit-test it when `hit_point` is given.
    ///
    /// `hit_point` must already be in local space. In hit-test mode nothing is
    /// painted and `is_clicked` is set to the result. Both modes return the
    /// current `is_clicked`.
    pub fn render(&mut self, canvas: &mut dyn Canvas, ctx: &DrawingContext, hit_point: Option<DVec2>) -> bool {
        let (path, style) = self.kind.boundary(&self.state);

        match hit_point {
            Some(p) => {
                self.state.is_clicked = path.contains(p);
            }
            None => {
                canvas.save();
                canvas.transform(&self.transform());
                paint(canvas, &path, &style);
                self.kind.decorate(&self.state, ctx, canvas);
                canvas.restore();

                if self.state.flags.is_selected {
                    self.draw_handles(canvas);
                }
            }
        }
        self.state.is_clicked
    }

    /// Hit-test a local-space point
    pub fn hit_test(&mut self, ctx: &DrawingContext, local: DVec2) -> bool {
        self.render(&mut RecordingCanvas::new(), ctx, Some(local))
    }

    /// Boundary path in local space, as painted and hit-tested
    pub fn boundary(&self) -> Path {
        self.kind.boundary(&self.state).0
    }

    fn draw_handles(&self, canvas: &mut dyn Canvas) {
        for (i, handle) in self.state.handles.iter().enumerate() {
            if !handle.is_visible {
                continue;
            }
            let at = self.transform().apply(self.kind.handle_point(&self.state, i));
            canvas.draw_handle(at, handle.is_rotatable);
        }
    }

    // ------------------------------------------------------------------------
    // Reporting and persistence
    // ------------------------------------------------------------------------

    pub fn description(&self) -> String {
        self.kind.description(&self.state)
    }

    pub fn group_description(&self) -> Option<String> {
        self.kind.group_description(&self.state)
    }

    pub fn saved(&self) -> SavedDoodle {
        let has_handle_squiggle = self.state.handles.iter().any(|h| h.mode == HandleMode::Handles);
        SavedDoodle {
            class_name: self.class_name(),
            parameters: self.state.params.snapshot(self.kind.saved_parameters()),
            squiggles: if has_handle_squiggle {
                self.state.squiggles.clone()
            } else {
                Vec::new()
            },
        }
    }

    // ------------------------------------------------------------------------
    // Notifications
    // ------------------------------------------------------------------------

    pub fn subscriptions(&self) -> Option<EventFilter> {
        self.kind.subscriptions()
    }

    pub fn notify(&mut self, notification: &Notification, ctx: &DrawingContext) -> Vec<ParameterChange> {
        self.kind.on_notification(&mut self.state, notification, ctx)
    }
}

fn ratio(proposed: f64, current: f64) -> f64 {
    if current == 0.0 { 1.0 } else { proposed / current }
}
