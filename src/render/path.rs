//! Boundary paths in doodle-local space.
//!
//! A [`Path`] records the same commands a canvas-like host would receive
//! (`moveTo`, `lineTo`, `bezierCurveTo`, `arc`, `rect`, `closePath`). The host
//! paints it; [`Path::contains`] answers hit tests against the very same
//! commands, flattened to polygons and tested with the non-zero winding rule.
//!
//! Arc angles follow the canvas convention: 0 is +x and angles increase
//! clockwise on screen (y down). A sweep of at least 2π is a full circle in the
//! requested direction, so two opposite-direction circles describe an annulus.

use std::f64::consts::TAU;

use glam::{DVec2, dvec2};

use super::defaults::{ARC_SEGMENTS_PER_TURN, BEZIER_SEGMENTS};

#[derive(Debug, Clone, PartialEq)]
pub enum PathCommand {
    MoveTo(DVec2),
    LineTo(DVec2),
    BezierTo {
        c1: DVec2,
        c2: DVec2,
        to: DVec2,
    },
    Arc {
        center: DVec2,
        radius: f64,
        start: f64,
        end: f64,
        anticlockwise: bool,
    },
    Rect {
        origin: DVec2,
        size: DVec2,
    },
    Close,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    commands: Vec<PathCommand>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn move_to(&mut self, p: DVec2) -> &mut Self {
        self.commands.push(PathCommand::MoveTo(p));
        self
    }

    pub fn line_to(&mut self, p: DVec2) -> &mut Self {
        self.commands.push(PathCommand::LineTo(p));
        self
    }

    pub fn bezier_to(&mut self, c1: DVec2, c2: DVec2, to: DVec2) -> &mut Self {
        self.commands.push(PathCommand::BezierTo { c1, c2, to });
        self
    }

    pub fn arc(&mut self, center: DVec2, radius: f64, start: f64, end: f64, anticlockwise: bool) -> &mut Self {
        self.commands.push(PathCommand::Arc {
            center,
            radius,
            start,
            end,
            anticlockwise,
        });
        self
    }

    /// Full anticlockwise circle starting at angle 0
    pub fn circle(&mut self, center: DVec2, radius: f64) -> &mut Self {
        self.arc(center, radius, 0.0, TAU, true)
    }

    pub fn rect(&mut self, origin: DVec2, size: DVec2) -> &mut Self {
        self.commands.push(PathCommand::Rect { origin, size });
        self
    }

    pub fn close(&mut self) -> &mut Self {
        self.commands.push(PathCommand::Close);
        self
    }

    /// Flatten into polygons, one per subpath.
    ///
    /// Subpaths are returned unclosed; filling and hit testing treat each as
    /// implicitly closed.
    pub fn flatten(&self) -> Vec<Vec<DVec2>> {
        let mut subpaths: Vec<Vec<DVec2>> = Vec::new();
        let mut current: Vec<DVec2> = Vec::new();

        for command in &self.commands {
            match *command {
                PathCommand::MoveTo(p) => {
                    finish(&mut subpaths, &mut current);
                    current.push(p);
                }
                PathCommand::LineTo(p) => current.push(p),
                PathCommand::BezierTo { c1, c2, to } => {
                    let from = current.last().copied().unwrap_or(c1);
                    if current.is_empty() {
                        current.push(from);
                    }
                    for i in 1..=BEZIER_SEGMENTS {
                        let t = i as f64 / BEZIER_SEGMENTS as f64;
                        current.push(cubic_point(from, c1, c2, to, t));
                    }
                }
                PathCommand::Arc {
                    center,
                    radius,
                    start,
                    end,
                    anticlockwise,
                } => {
                    let sweep = arc_sweep(start, end, anticlockwise);
                    let segments = ((ARC_SEGMENTS_PER_TURN as f64 * sweep.abs() / TAU).ceil() as usize).max(1);
                    // The arc joins the current subpath with a straight line
                    for i in 0..=segments {
                        let a = start + sweep * i as f64 / segments as f64;
                        current.push(center + radius * dvec2(a.cos(), a.sin()));
                    }
                }
                PathCommand::Rect { origin, size } => {
                    finish(&mut subpaths, &mut current);
                    subpaths.push(vec![
                        origin,
                        origin + dvec2(size.x, 0.0),
                        origin + size,
                        origin + dvec2(0.0, size.y),
                    ]);
                    current.push(origin);
                }
                PathCommand::Close => {
                    if let Some(&first) = current.first() {
                        finish(&mut subpaths, &mut current);
                        current.push(first);
                    }
                }
            }
        }
        finish(&mut subpaths, &mut current);
        subpaths
    }

    /// Non-zero winding containment of `p`
    pub fn contains(&self, p: DVec2) -> bool {
        self.winding_number(p) != 0
    }

    pub fn winding_number(&self, p: DVec2) -> i32 {
        self.flatten().iter().map(|poly| polygon_winding(poly, p)).sum()
    }
}

fn finish(subpaths: &mut Vec<Vec<DVec2>>, current: &mut Vec<DVec2>) {
    if current.len() > 1 {
        subpaths.push(std::mem::take(current));
    } else {
        current.clear();
    }
}

/// Signed sweep of an arc in the requested direction
fn arc_sweep(start: f64, end: f64, anticlockwise: bool) -> f64 {
    let delta = end - start;
    if delta.abs() >= TAU {
        return if anticlockwise { -TAU } else { TAU };
    }
    if anticlockwise {
        -(start - end).rem_euclid(TAU)
    } else {
        delta.rem_euclid(TAU)
    }
}

fn cubic_point(p0: DVec2, p1: DVec2, p2: DVec2, p3: DVec2, t: f64) -> DVec2 {
    let mt = 1.0 - t;
    p0 * (mt * mt * mt) + p1 * (3.0 * mt * mt * t) + p2 * (3.0 * mt * t * t) + p3 * (t * t * t)
}

fn is_left(a: DVec2, b: DVec2, p: DVec2) -> f64 {
    (b - a).perp_dot(p - a)
}

fn polygon_winding(poly: &[DVec2], p: DVec2) -> i32 {
    let mut wn = 0;
    for (i, &a) in poly.iter().enumerate() {
        let b = poly[(i + 1) % poly.len()];
        if a.y <= p.y {
            if b.y > p.y && is_left(a, b, p) > 0.0 {
                wn += 1;
            }
        } else if b.y <= p.y && is_left(a, b, p) < 0.0 {
            wn -= 1;
        }
    }
    wn
}
