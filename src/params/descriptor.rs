//! Constraint descriptors: one per parameter, checked exhaustively on every set.

use crate::errors::{DoodleError, Result};
use crate::log::debug;
use crate::types::{Clock, Range};

use super::value::ParameterValue;

/// Whether a parameter is a source of truth or computed from others
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    Simple,
    Derived,
}

/// Validation rule for a parameter
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// Clamped into `range`; rounded when `integer`
    Numeric { range: Range, integer: bool },
    /// Wrapped into `range` around the seam given by `clock`
    Modular { range: Range, clock: Clock },
    /// One of a fixed list of strings
    Enumerated { list: Vec<String> },
    Boolean,
}

impl Constraint {
    pub fn float(min: f64, max: f64) -> Self {
        Constraint::Numeric {
            range: Range::new(min, max),
            integer: false,
        }
    }

    pub fn int(min: f64, max: f64) -> Self {
        Constraint::Numeric {
            range: Range::new(min, max),
            integer: true,
        }
    }

    pub fn modular(min: f64, max: f64, clock: Clock) -> Self {
        Constraint::Modular {
            range: Range::new(min, max),
            clock,
        }
    }

    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Constraint::Enumerated {
            list: items.into_iter().map(Into::into).collect(),
        }
    }

    fn expected(&self) -> &'static str {
        match self {
            Constraint::Numeric { .. } | Constraint::Modular { .. } => "number",
            Constraint::Enumerated { .. } => "string",
            Constraint::Boolean => "bool",
        }
    }

    pub fn range(&self) -> Option<&Range> {
        match self {
            Constraint::Numeric { range, .. } | Constraint::Modular { range, .. } => Some(range),
            _ => None,
        }
    }

    pub fn range_mut(&mut self) -> Option<&mut Range> {
        match self {
            Constraint::Numeric { range, .. } | Constraint::Modular { range, .. } => Some(range),
            _ => None,
        }
    }
}

/// Everything the engine knows about one parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    pub kind: ParameterKind,
    pub constraint: Constraint,
    /// Tween towards new values instead of snapping
    pub animate: bool,
    /// Shown in the host's control bar
    pub display: bool,
}

impl ParameterDescriptor {
    pub fn simple(constraint: Constraint) -> Self {
        Self {
            kind: ParameterKind::Simple,
            constraint,
            animate: false,
            display: false,
        }
    }

    pub fn derived(constraint: Constraint) -> Self {
        Self {
            kind: ParameterKind::Derived,
            ..Self::simple(constraint)
        }
    }

    pub fn animated(mut self) -> Self {
        self.animate = true;
        self
    }

    pub fn displayed(mut self) -> Self {
        self.display = true;
        self
    }

    /// Check `value` against the constraint, returning the value to store.
    ///
    /// Finite numbers are clamped or wrapped. A type mismatch, a non-finite
    /// number or an enumerated miss is an error.
    pub fn validate(&self, name: &str, value: &ParameterValue) -> Result<ParameterValue> {
        let mismatch = || DoodleError::TypeMismatch {
            parameter: name.to_string(),
            expected: self.constraint.expected(),
            got: value.type_name(),
        };
        let finite = |n: f64| {
            if n.is_finite() {
                Ok(n)
            } else {
                Err(DoodleError::InvalidParameterValue {
                    parameter: name.to_string(),
                    value: n.to_string(),
                    allowed: "a finite number".to_string(),
                })
            }
        };

        match &self.constraint {
            Constraint::Numeric { range, integer } => {
                let n = finite(value.as_number().ok_or_else(mismatch)?)?;
                let n = if *integer { n.round() } else { n };
                let clamped = range.constrain(n);
                if clamped != n {
                    debug!(parameter = name, proposed = n, clamped, "clamped out-of-range value");
                }
                Ok(ParameterValue::Number(clamped))
            }
            Constraint::Modular { range, clock } => {
                let n = finite(value.as_number().ok_or_else(mismatch)?)?;
                Ok(ParameterValue::Number(range.wrap(n, *clock)))
            }
            Constraint::Enumerated { list } => {
                let s = value.as_text().ok_or_else(mismatch)?;
                if list.iter().any(|item| item == s) {
                    Ok(value.clone())
                } else {
                    Err(DoodleError::InvalidParameterValue {
                        parameter: name.to_string(),
                        value: s.to_string(),
                        allowed: list.join(", "),
                    })
                }
            }
            Constraint::Boolean => {
                let b = value.as_bool().ok_or_else(mismatch)?;
                Ok(ParameterValue::Bool(b))
            }
        }
    }

    /// Parse a textual value according to the constraint's type
    pub fn parse(&self, name: &str, text: &str) -> Result<ParameterValue> {
        let invalid = |allowed: &str| DoodleError::InvalidParameterValue {
            parameter: name.to_string(),
            value: text.to_string(),
            allowed: allowed.to_string(),
        };

        match &self.constraint {
            Constraint::Numeric { .. } | Constraint::Modular { .. } => text
                .trim()
                .parse::<f64>()
                .map(ParameterValue::Number)
                .map_err(|_| invalid("a number")),
            Constraint::Boolean => match text.trim() {
                "true" => Ok(ParameterValue::Bool(true)),
                "false" => Ok(ParameterValue::Bool(false)),
                _ => Err(invalid("true, false")),
            },
            Constraint::Enumerated { .. } => Ok(ParameterValue::Text(text.to_string())),
        }
    }
}
