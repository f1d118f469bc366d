//! Error types with diagnostics using miette
//!
//! Only caller mistakes surface here. Out-of-range numbers are clamped and
//! mutations of locked doodles are ignored; neither is an error.

use miette::Diagnostic;
use thiserror::Error;

use crate::doodle::ClassName;

// ============================================================================
// Doodle Errors
// ============================================================================

/// Errors raised by doodle parameter, handle and surface operations
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum DoodleError {
    #[error("invalid value {value:?} for parameter `{parameter}`")]
    #[diagnostic(
        code(doodlekit::parameter::invalid_value),
        help("allowed values: {allowed}")
    )]
    InvalidParameterValue {
        parameter: String,
        value: String,
        allowed: String,
    },

    #[error("unknown parameter `{parameter}` on {class}")]
    #[diagnostic(code(doodlekit::parameter::unknown))]
    UnknownParameter { parameter: String, class: ClassName },

    #[error("parameter `{parameter}` expects a {expected} value, got {got}")]
    #[diagnostic(code(doodlekit::parameter::type_mismatch))]
    TypeMismatch {
        parameter: String,
        expected: &'static str,
        got: &'static str,
    },

    #[error("{class} has no handle {index}")]
    #[diagnostic(code(doodlekit::handle::unknown))]
    UnknownHandle { index: usize, class: ClassName },

    #[error("no doodle with id {id}")]
    #[diagnostic(code(doodlekit::drawing::unknown_doodle))]
    UnknownDoodle { id: u32 },

    #[error("unknown doodle class: {name}")]
    #[diagnostic(
        code(doodlekit::doodle::unknown_class),
        help("see `ClassName::ALL` for the registered classes")
    )]
    UnknownClass { name: String },

    #[error("unknown event name: {name}")]
    #[diagnostic(
        code(doodlekit::notify::unknown_event),
        help("see `EventName::ALL` for the events a drawing emits")
    )]
    UnknownEvent { name: String },

    #[error("{class} cannot be deleted")]
    #[diagnostic(code(doodlekit::drawing::not_deletable))]
    NotDeletable { class: ClassName },
}

/// Result alias used throughout the crate
pub type Result<T, E = DoodleError> = std::result::Result<T, E>;
