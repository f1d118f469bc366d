//! Per-doodle parameter registry.
//!
//! Every parameter has a [`ParameterDescriptor`]. Setting a parameter validates
//! it, stores it, then asks the doodle variant for the values of any parameters
//! that depend on it. Animated dependents are tweened by [`ParameterEngine::advance`];
//! the rest are assigned before `set_parameter` returns.

pub mod animation;
pub mod descriptor;
pub mod value;

use std::collections::BTreeMap;
use std::time::Duration;

pub use animation::Tween;
pub use descriptor::{Constraint, ParameterDescriptor, ParameterKind};
pub use value::{DependentValues, ParameterValue, SavedParameters};

use crate::doodle::ClassName;
use crate::errors::{DoodleError, Result};
use crate::log::{debug, trace};
use crate::render::defaults;
use crate::types::Clock;

/// Names of the parameters every doodle carries
pub mod names {
    pub const ORIGIN_X: &str = "originX";
    pub const ORIGIN_Y: &str = "originY";
    pub const ROTATION: &str = "rotation";
    pub const SCALE_X: &str = "scaleX";
    pub const SCALE_Y: &str = "scaleY";
    pub const APEX_X: &str = "apexX";
    pub const APEX_Y: &str = "apexY";
}

/// A parameter that changed value, as reported to the host
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterChange {
    pub name: String,
    pub value: ParameterValue,
}

#[derive(Debug, Clone)]
pub struct ParameterEngine {
    class: ClassName,
    descriptors: BTreeMap<String, ParameterDescriptor>,
    values: BTreeMap<String, ParameterValue>,
    tweens: BTreeMap<String, Tween>,
    animation_duration: Duration,
}

impl ParameterEngine {
    /// Empty engine with no parameters registered
    pub fn new(class: ClassName) -> Self {
        Self {
            class,
            descriptors: BTreeMap::new(),
            values: BTreeMap::new(),
            tweens: BTreeMap::new(),
            animation_duration: defaults::ANIMATION_DURATION,
        }
    }

    /// Engine pre-loaded with the geometric parameters shared by all doodles
    pub fn with_base_parameters(class: ClassName) -> Self {
        let mut engine = Self::new(class);
        let origin = defaults::ORIGIN_RANGE;
        let scale = defaults::SCALE_RANGE;
        let apex = defaults::APEX_RANGE;

        engine.register(names::ORIGIN_X, ParameterDescriptor::simple(Constraint::float(origin.min, origin.max)), 0.0);
        engine.register(names::ORIGIN_Y, ParameterDescriptor::simple(Constraint::float(origin.min, origin.max)), 0.0);
        engine.register(
            names::ROTATION,
            ParameterDescriptor::simple(Constraint::modular(0.0, std::f64::consts::TAU, Clock::Top)),
            0.0,
        );
        engine.register(names::SCALE_X, ParameterDescriptor::simple(Constraint::float(scale.min, scale.max)), 1.0);
        engine.register(names::SCALE_Y, ParameterDescriptor::simple(Constraint::float(scale.min, scale.max)), 1.0);
        engine.register(names::APEX_X, ParameterDescriptor::simple(Constraint::float(apex.min, apex.max)), 0.0);
        engine.register(names::APEX_Y, ParameterDescriptor::simple(Constraint::float(apex.min, apex.max)), 0.0);
        engine
    }

    pub fn class(&self) -> ClassName {
        self.class
    }

    pub fn set_animation_duration(&mut self, duration: Duration) {
        self.animation_duration = duration;
    }

    /// Register (or replace) a parameter with an initial value.
    ///
    /// The initial value is run through the descriptor; if it is rejected the
    /// descriptor is still registered and the parameter starts unset.
    pub fn register(&mut self, name: &str, descriptor: ParameterDescriptor, initial: impl Into<ParameterValue>) {
        let initial = initial.into();
        match descriptor.validate(name, &initial) {
            Ok(v) => {
                self.values.insert(name.to_string(), v);
            }
            Err(_) => {
                debug!(parameter = name, "initial value rejected by its own descriptor");
            }
        }
        self.descriptors.insert(name.to_string(), descriptor);
    }

    pub fn descriptor(&self, name: &str) -> Option<&ParameterDescriptor> {
        self.descriptors.get(name)
    }

    pub fn descriptors(&self) -> impl Iterator<Item = (&str, &ParameterDescriptor)> {
        self.descriptors.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.descriptors.contains_key(name)
    }

    /// Narrow a numeric range and re-validate the current value against it
    pub fn set_range(&mut self, name: &str, min: f64, max: f64) {
        let Some(descriptor) = self.descriptors.get_mut(name) else {
            debug!(parameter = name, "set_range on unknown parameter");
            return;
        };
        if let Some(range) = descriptor.constraint.range_mut() {
            range.set_min_and_max(min, max);
        }
        if let Some(current) = self.values.get(name).cloned() {
            if let Ok(v) = descriptor.validate(name, &current) {
                self.values.insert(name.to_string(), v);
            }
        }
    }

    pub fn value(&self, name: &str) -> Option<&ParameterValue> {
        self.values.get(name)
    }

    pub fn values(&self) -> &BTreeMap<String, ParameterValue> {
        &self.values
    }

    /// Numeric value of `name`, or 0 if unset or not numeric
    pub fn number(&self, name: &str) -> f64 {
        self.values.get(name).and_then(ParameterValue::as_number).unwrap_or(0.0)
    }

    pub fn flag(&self, name: &str) -> bool {
        self.values.get(name).and_then(ParameterValue::as_bool).unwrap_or(false)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(ParameterValue::as_text)
    }

    fn descriptor_or_err(&self, name: &str) -> Result<&ParameterDescriptor> {
        self.descriptors.get(name).ok_or_else(|| DoodleError::UnknownParameter {
            parameter: name.to_string(),
            class: self.class,
        })
    }

    /// Validate and store a value without consulting dependents.
    ///
    /// Cancels any tween running on the parameter.
    pub fn assign(&mut self, name: &str, value: impl Into<ParameterValue>) -> Result<ParameterValue> {
        let validated = self.descriptor_or_err(name)?.validate(name, &value.into())?;
        self.tweens.remove(name);
        self.values.insert(name.to_string(), validated.clone());
        Ok(validated)
    }

    /// Set a parameter and propagate to its dependents.
    ///
    /// `dependents` is the variant's pure dependent-value function; it sees the
    /// engine after the new value is stored. Dependent assignments do not
    /// cascade further. Every dependent is validated before anything is kept,
    /// so a rejected dependent leaves the engine as it was. Returns the
    /// immediate changes in application order.
    pub fn set_parameter<F>(
        &mut self,
        name: &str,
        value: impl Into<ParameterValue>,
        dependents: F,
    ) -> Result<Vec<ParameterChange>>
    where
        F: FnOnce(&ParameterEngine, &str, &ParameterValue) -> DependentValues,
    {
        let stored = self.descriptor_or_err(name)?.validate(name, &value.into())?;
        let previous = self.values.insert(name.to_string(), stored.clone());
        let previous_tween = self.tweens.remove(name);

        let staged = dependents(self, name, &stored)
            .into_iter()
            .map(|(dependent, proposed)| -> Result<_> {
                let descriptor = self.descriptor_or_err(dependent)?;
                let target = descriptor.validate(dependent, &proposed)?;
                Ok((dependent, descriptor.clone(), target))
            })
            .collect::<Result<Vec<_>>>();

        let staged = match staged {
            Ok(staged) => staged,
            Err(err) => {
                debug!(parameter = name, error = %err, "dependent rejected; restoring prior value");
                match previous {
                    Some(v) => self.values.insert(name.to_string(), v),
                    None => self.values.remove(name),
                };
                if let Some(tween) = previous_tween {
                    self.tweens.insert(name.to_string(), tween);
                }
                return Err(err);
            }
        };

        let mut changes = vec![ParameterChange {
            name: name.to_string(),
            value: stored,
        }];

        for (dependent, descriptor, target) in staged {
            match (&descriptor.constraint, descriptor.animate, target.as_number()) {
                (constraint, true, Some(to)) => {
                    let from = self.number(dependent);
                    let tween = match constraint {
                        Constraint::Modular { range, .. } => {
                            Tween::modular(from, to, range, self.animation_duration)
                        }
                        _ => Tween::new(from, to, self.animation_duration),
                    };
                    trace!(parameter = dependent, from, to, "starting tween");
                    self.tweens.insert(dependent.to_string(), tween);
                }
                _ => {
                    self.tweens.remove(dependent);
                    self.values.insert(dependent.to_string(), target.clone());
                    changes.push(ParameterChange {
                        name: dependent.to_string(),
                        value: target,
                    });
                }
            }
        }

        Ok(changes)
    }

    /// Parse `text` per the parameter's constraint, then [`set_parameter`](Self::set_parameter)
    pub fn set_parameter_from_string<F>(&mut self, name: &str, text: &str, dependents: F) -> Result<Vec<ParameterChange>>
    where
        F: FnOnce(&ParameterEngine, &str, &ParameterValue) -> DependentValues,
    {
        let value = self.descriptor_or_err(name)?.parse(name, text)?;
        self.set_parameter(name, value, dependents)
    }

    pub fn is_animating(&self) -> bool {
        !self.tweens.is_empty()
    }

    /// Target of a running tween, if any
    pub fn tween_target(&self, name: &str) -> Option<f64> {
        self.tweens.get(name).map(|t| t.to)
    }

    /// Step all tweens by `dt`. Returns true while any remain.
    pub fn advance(&mut self, dt: Duration) -> bool {
        let mut finished = Vec::new();
        for (name, tween) in self.tweens.iter_mut() {
            let raw = tween.advance(dt);
            let stored = self
                .descriptors
                .get(name)
                .and_then(|d| d.validate(name, &ParameterValue::Number(raw)).ok())
                .unwrap_or(ParameterValue::Number(raw));
            self.values.insert(name.clone(), stored);
            if tween.is_finished() {
                finished.push(name.clone());
            }
        }
        for name in finished {
            self.tweens.remove(&name);
        }
        self.is_animating()
    }

    /// Jump every running tween to its target
    pub fn settle(&mut self) {
        let tweens = std::mem::take(&mut self.tweens);
        for (name, tween) in tweens {
            let stored = self
                .descriptors
                .get(&name)
                .and_then(|d| d.validate(&name, &ParameterValue::Number(tween.to)).ok())
                .unwrap_or(ParameterValue::Number(tween.to));
            self.values.insert(name, stored);
        }
    }

    /// Current values of `names`, skipping any that are unset
    pub fn snapshot(&self, names: &[&str]) -> SavedParameters {
        names
            .iter()
            .filter_map(|n| self.values.get(*n).map(|v| (n.to_string(), v.clone())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_dependents(_: &ParameterEngine, _: &str, _: &ParameterValue) -> DependentValues {
        Vec::new()
    }

    fn engine() -> ParameterEngine {
        ParameterEngine::with_base_parameters(ClassName::HardExudate)
    }

    #[test]
    fn base_parameters_are_registered() {
        let e = engine();
        for name in [
            names::ORIGIN_X,
            names::ORIGIN_Y,
            names::ROTATION,
            names::SCALE_X,
            names::SCALE_Y,
            names::APEX_X,
            names::APEX_Y,
        ] {
            assert!(e.contains(name), "{name} missing");
        }
        assert_eq!(e.number(names::SCALE_X), 1.0);
    }

    #[test]
    fn rotation_is_normalized() {
        let mut e = engine();
        e.set_parameter(names::ROTATION, -std::f64::consts::FRAC_PI_2, no_dependents).unwrap();
        let r = e.number(names::ROTATION);
        assert!((r - 3.0 * std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn unknown_parameter_is_an_error() {
        let mut e = engine();
        let err = e.set_parameter("nonsense", 1.0, no_dependents).unwrap_err();
        assert!(matches!(err, DoodleError::UnknownParameter { .. }));
    }

    #[test]
    fn rejected_enumerated_value_keeps_prior_value() {
        let mut e = engine();
        e.register("type", ParameterDescriptor::derived(Constraint::list(["Temporary", "Metal"])), "Temporary");
        assert!(e.set_parameter("type", "Gold", no_dependents).is_err());
        assert_eq!(e.text("type"), Some("Temporary"));
    }

    #[test]
    fn set_range_reclamps_current_value() {
        let mut e = engine();
        e.assign(names::APEX_Y, 200.0).unwrap();
        e.set_range(names::APEX_Y, -50.0, 50.0);
        assert_eq!(e.number(names::APEX_Y), 50.0);
    }

    #[test]
    fn dependents_are_applied_synchronously_when_not_animated() {
        let mut e = engine();
        e.register("double", ParameterDescriptor::derived(Constraint::float(-1e6, 1e6)), 0.0);
        let changes = e
            .set_parameter(names::APEX_X, 10.0, |p, _, _| vec![("double", (p.number(names::APEX_X) * 2.0).into())])
            .unwrap();
        assert_eq!(e.number("double"), 20.0);
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[1].name, "double");
    }

    #[test]
    fn rejected_dependent_leaves_engine_untouched() {
        let mut e = engine();
        e.register("type", ParameterDescriptor::derived(Constraint::list(["A", "B"])), "A");
        e.register("double", ParameterDescriptor::derived(Constraint::float(-1e6, 1e6)), 0.0);

        let err = e
            .set_parameter(names::APEX_X, 7.0, |_, _, _| vec![("double", 14.0.into()), ("type", "Z".into())])
            .unwrap_err();
        assert!(matches!(err, DoodleError::InvalidParameterValue { .. }));
        assert_eq!(e.number(names::APEX_X), 0.0);
        assert_eq!(e.number("double"), 0.0);
        assert_eq!(e.text("type"), Some("A"));

        let err = e.set_parameter(names::APEX_X, 7.0, |_, _, _| vec![("missing", 1.0.into())]).unwrap_err();
        assert!(matches!(err, DoodleError::UnknownParameter { .. }));
        assert_eq!(e.number(names::APEX_X), 0.0);
    }

    #[test]
    fn animated_dependents_tween_to_target() {
        let mut e = engine();
        e.set_animation_duration(Duration::from_millis(100));
        e.register(
            "axis",
            ParameterDescriptor::derived(Constraint::modular(0.0, 180.0, Clock::Top)).animated(),
            0.0,
        );
        let changes = e.set_parameter(names::APEX_X, 1.0, |_, _, _| vec![("axis", 90.0.into())]).unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(e.number("axis"), 0.0);
        assert_eq!(e.tween_target("axis"), Some(90.0));

        assert!(e.advance(Duration::from_millis(50)));
        assert_eq!(e.number("axis"), 45.0);
        assert!(!e.advance(Duration::from_millis(50)));
        assert_eq!(e.number("axis"), 90.0);
    }

    #[test]
    fn settle_finishes_tweens_with_wrapped_targets() {
        let mut e = engine();
        e.register(
            "axis",
            ParameterDescriptor::derived(Constraint::modular(0.0, 180.0, Clock::Top)).animated(),
            170.0,
        );
        e.set_parameter(names::APEX_X, 1.0, |_, _, _| vec![("axis", 10.0.into())]).unwrap();
        // Travels forward through 180, so the raw target is 190
        assert_eq!(e.tween_target("axis"), Some(190.0));
        e.settle();
        assert!(!e.is_animating());
        assert!((e.number("axis") - 10.0).abs() < 1e-9);
    }

    #[test]
    fn direct_assignment_cancels_tween() {
        let mut e = engine();
        e.register("axis", ParameterDescriptor::derived(Constraint::float(0.0, 180.0)).animated(), 0.0);
        e.set_parameter(names::APEX_X, 1.0, |_, _, _| vec![("axis", 90.0.into())]).unwrap();
        e.assign("axis", 30.0).unwrap();
        assert!(!e.is_animating());
        assert_eq!(e.number("axis"), 30.0);
    }

    #[test]
    fn set_from_string_parses_by_type() {
        let mut e = engine();
        e.register("pigmented", ParameterDescriptor::derived(Constraint::Boolean), false);
        e.set_parameter_from_string("pigmented", "true", no_dependents).unwrap();
        assert!(e.flag("pigmented"));
        e.set_parameter_from_string(names::ORIGIN_X, "-2000", no_dependents).unwrap();
        assert_eq!(e.number(names::ORIGIN_X), defaults::ORIGIN_RANGE.min);
    }

    #[test]
    fn nan_from_string_keeps_prior_value() {
        let mut e = engine();
        e.assign(names::ORIGIN_X, 12.0).unwrap();
        assert!(e.set_parameter_from_string(names::ORIGIN_X, "NaN", no_dependents).is_err());
        assert_eq!(e.number(names::ORIGIN_X), 12.0);
    }

    #[test]
    fn snapshot_selects_named_values() {
        let e = engine();
        let saved = e.snapshot(&[names::ORIGIN_X, "missing"]);
        assert_eq!(saved.len(), 1);
        assert_eq!(saved.get(names::ORIGIN_X), Some(&ParameterValue::Number(0.0)));
    }
}
