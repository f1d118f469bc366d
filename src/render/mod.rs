//! Painting and hit-testing support for doodles
//!
//! This module is organized into submodules:
//! - `defaults`: Default ranges, sizes and timings
//! - `path`: Boundary paths and their non-zero winding containment test
//! - `types`: Paint attributes (`Style`, `Label`)
//!
//! The host owns the real drawing backend and implements [`Canvas`] for it.
//! [`RecordingCanvas`] is an in-memory implementation used by the reference
//! drawing and by tests.

pub mod defaults;
pub mod path;
pub mod types;

use std::fmt;

use glam::DVec2;

pub use path::{Path, PathCommand};
pub use types::*;

use crate::transform::{Transform, TransformStack};
use crate::types::Colour;

/// Immediate-mode painting primitives supplied by the host
pub trait Canvas {
    /// Push a copy of the current transform
    fn save(&mut self);
    /// Restore the transform pushed by the matching `save`
    fn restore(&mut self);
    /// Apply `transform` inside the current one
    fn transform(&mut self, transform: &Transform);
    fn fill_path(&mut self, path: &Path, colour: Colour);
    fn stroke_path(&mut self, path: &Path, colour: Colour, line_width: f64);
    fn fill_text(&mut self, label: &Label);
    /// Paint a handle marker at `at`, given in the current transform's space
    fn draw_handle(&mut self, at: DVec2, rotatable: bool);
}

/// Fill then stroke `path` with `style`, skipping invisible parts
pub fn paint(canvas: &mut dyn Canvas, path: &Path, style: &Style) {
    if style.has_fill() {
        canvas.fill_path(path, style.fill);
    }
    if style.has_stroke() {
        canvas.stroke_path(path, style.stroke, style.line_width);
    }
}

/// One call received by a [`RecordingCanvas`], with the transform in force
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Fill {
        path: Path,
        colour: Colour,
        transform: Transform,
    },
    Stroke {
        path: Path,
        colour: Colour,
        line_width: f64,
        transform: Transform,
    },
    Text {
        label: Label,
        transform: Transform,
    },
    Handle {
        at: DVec2,
        rotatable: bool,
        transform: Transform,
    },
}

impl fmt::Display for DrawCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawCommand::Fill { path, colour, .. } => {
                write!(f, "fill {colour} [{}]", path.commands().len())
            }
            DrawCommand::Stroke {
                path, colour, line_width, ..
            } => write!(f, "stroke {colour} w{line_width} [{}]", path.commands().len()),
            DrawCommand::Text { label, .. } => {
                write!(f, "text {:?} {} {}", label.text, label.font(), label.colour)
            }
            DrawCommand::Handle { at, rotatable, .. } => {
                let kind = if *rotatable { "rotate" } else { "handle" };
                write!(f, "{kind} ({:.0}, {:.0})", at.x, at.y)
            }
        }
    }
}

/// Canvas that records every call instead of painting
#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
    stack: TransformStack,
    commands: Vec<DrawCommand>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canvas whose base transform maps the doodle plane to pixels
    pub fn with_base(base: Transform) -> Self {
        Self {
            stack: TransformStack::new(base),
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// One line per recorded command
    pub fn describe(&self) -> String {
        self.commands.iter().map(|c| format!("{c}\n")).collect()
    }
}

impl Canvas for RecordingCanvas {
    fn save(&mut self) {
        self.stack.push(&Transform::IDENTITY);
    }

    fn restore(&mut self) {
        self.stack.pop();
    }

    fn transform(&mut self, transform: &Transform) {
        self.stack.concat(transform);
    }

    fn fill_path(&mut self, path: &Path, colour: Colour) {
        self.commands.push(DrawCommand::Fill {
            path: path.clone(),
            colour,
            transform: self.stack.current(),
        });
    }

    fn stroke_path(&mut self, path: &Path, colour: Colour, line_width: f64) {
        self.commands.push(DrawCommand::Stroke {
            path: path.clone(),
            colour,
            line_width,
            transform: self.stack.current(),
        });
    }

    fn fill_text(&mut self, label: &Label) {
        self.commands.push(DrawCommand::Text {
            label: label.clone(),
            transform: self.stack.current(),
        });
    }

    fn draw_handle(&mut self, at: DVec2, rotatable: bool) {
        self.commands.push(DrawCommand::Handle {
            at,
            rotatable,
            transform: self.stack.current(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::dvec2;

    #[test]
    fn paint_skips_transparent_parts() {
        let mut canvas = RecordingCanvas::new();
        let mut path = Path::new();
        path.circle(DVec2::ZERO, 10.0);

        paint(&mut canvas, &path, &Style::invisible());
        assert!(canvas.commands().is_empty());

        paint(&mut canvas, &path, &Style::new(Colour::RED, Colour::BLUE, 2.0));
        insta::assert_snapshot!(canvas.describe(), @r"
        fill rgba(255, 0, 0, 1) [1]
        stroke rgba(0, 0, 255, 1) w2 [1]
        ");
    }

    #[test]
    fn save_restore_scopes_transforms() {
        let mut canvas = RecordingCanvas::new();
        canvas.save();
        canvas.transform(&Transform::translation(dvec2(10.0, 0.0)));
        canvas.draw_handle(DVec2::ZERO, false);
        canvas.restore();
        canvas.draw_handle(DVec2::ZERO, true);

        let cmds = canvas.take();
        let DrawCommand::Handle { transform: inner, .. } = &cmds[0] else {
            panic!("expected handle");
        };
        let DrawCommand::Handle { transform: outer, .. } = &cmds[1] else {
            panic!("expected handle");
        };
        assert_eq!(inner.apply(DVec2::ZERO), dvec2(10.0, 0.0));
        assert_eq!(outer.apply(DVec2::ZERO), DVec2::ZERO);
    }
}
