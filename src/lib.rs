//! Doodles for annotating clinical drawings.
//!
//! A doodle is a small interactive shape placed on a drawing: a caries spot
//! on a dental chart, a trial lens over an eye, a choroidal lesion. Each one is
//! described by named parameters with constraints, edited through handles, and
//! painted to a [`render::Canvas`] from a single boundary path that also serves
//! for hit testing.
//!
//! This crate is organized into modules:
//! - `params`: constrained, optionally animated parameters
//! - `doodle`: the doodle variants and their shared state
//! - `handles`: handle modes and vector ranges for dragging
//! - `render`: paths, styles and the canvas abstraction
//! - `notify`: the notification bus between doodles and views
//! - `drawing`: a reference host owning doodles and routing input
//! - `popup`: the debounced doodle popup

pub mod doodle;
pub mod drawing;
pub mod errors;
pub mod handles;
pub mod log;
pub mod notify;
pub mod params;
pub mod popup;
pub mod render;
pub mod squiggle;
pub mod surface;
pub mod transform;
pub mod types;

pub use doodle::{ClassName, Doodle, DoodleId, DoodleKind, SavedDoodle};
pub use drawing::Drawing;
pub use errors::{DoodleError, Result};
pub use notify::{EventFilter, EventName, Notification, Subscriber};
pub use params::{ParameterChange, ParameterValue};
pub use popup::{DoodlePopup, PopupState};
pub use surface::{DrawingContext, Eye, Surface};
