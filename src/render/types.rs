//! Paint attributes shared by boundaries and decorations

use glam::DVec2;

use crate::types::Colour;

use super::defaults;

/// Fill and stroke applied to a doodle's boundary path
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub fill: Colour,
    pub stroke: Colour,
    pub line_width: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill: Colour::TRANSPARENT,
            stroke: Colour::BLACK,
            line_width: defaults::LINE_WIDTH,
        }
    }
}

impl Style {
    pub fn new(fill: Colour, stroke: Colour, line_width: f64) -> Self {
        Self {
            fill,
            stroke,
            line_width,
        }
    }

    /// Neither filled nor stroked; still hit-testable
    pub fn invisible() -> Self {
        Self::new(Colour::TRANSPARENT, Colour::TRANSPARENT, 0.0)
    }

    pub fn stroked(stroke: Colour, line_width: f64) -> Self {
        Self::new(Colour::TRANSPARENT, stroke, line_width)
    }

    pub fn filled(fill: Colour) -> Self {
        Self::new(fill, Colour::TRANSPARENT, 0.0)
    }

    pub fn has_fill(&self) -> bool {
        !self.fill.is_transparent()
    }

    pub fn has_stroke(&self) -> bool {
        !self.stroke.is_transparent() && self.line_width > 0.0
    }
}

/// Text decoration, centred on `position` in doodle-local space
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub position: DVec2,
    /// Font size in pixels
    pub size: f64,
    pub colour: Colour,
}

impl Label {
    pub fn new(text: impl Into<String>, position: DVec2, size: f64, colour: Colour) -> Self {
        Self {
            text: text.into(),
            position,
            size,
            colour,
        }
    }

    /// CSS font shorthand for canvas hosts
    pub fn font(&self) -> String {
        format!("{}{}", self.size, defaults::LABEL_FONT)
    }
}
