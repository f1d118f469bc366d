//! Ordered point sequences edited through handles.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::render::Path;
use crate::types::{Colour, polar};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Squiggle {
    pub points: Vec<DVec2>,
    pub colour: Colour,
    pub thickness: f64,
    pub filled: bool,
}

impl Squiggle {
    pub fn new(colour: Colour, thickness: f64, filled: bool) -> Self {
        Self {
            points: Vec::new(),
            colour,
            thickness,
            filled,
        }
    }

    pub fn push_point(&mut self, p: DVec2) {
        self.points.push(p);
    }

    /// Replace point `i`; returns false if there is no such point
    pub fn set_point(&mut self, i: usize, p: DVec2) -> bool {
        match self.points.get_mut(i) {
            Some(slot) => {
                *slot = p;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Smooth closed curve through `points`.
///
/// Each segment is a cubic whose control points sit on the tangents at its
/// end points, `2π/(3n)` round the circle from them. Evenly spaced points at
/// one radius give a near-perfect circle.
pub fn closed_curve(points: &[DVec2]) -> Path {
    let mut path = Path::new();
    let Some(&first) = points.first() else {
        return path;
    };
    let n = points.len();
    let phi = std::f64::consts::TAU / (3.0 * n as f64);

    path.move_to(first);
    for (i, &from) in points.iter().enumerate() {
        let to = points[(i + 1) % n];
        let cp1 = polar::tangential_control_point(from, phi);
        let cp2 = polar::tangential_control_point(to, -phi);
        path.bezier_to(cp1, cp2, to);
    }
    path.close();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::dvec2;

    fn ring(n: usize, r: f64) -> Vec<DVec2> {
        (0..n)
            .map(|i| polar::from_polar(r, i as f64 * std::f64::consts::TAU / n as f64))
            .collect()
    }

    #[test]
    fn closed_curve_has_one_segment_per_point() {
        let path = closed_curve(&ring(4, 80.0));
        // move + 4 beziers + close
        assert_eq!(path.commands().len(), 6);
    }

    #[test]
    fn closed_curve_of_ring_is_nearly_circular() {
        let path = closed_curve(&ring(4, 80.0));
        assert!(path.contains(DVec2::ZERO));
        assert!(path.contains(dvec2(50.0, 50.0)));
        assert!(!path.contains(dvec2(70.0, 70.0)));
    }

    #[test]
    fn set_point_rejects_missing_index() {
        let mut s = Squiggle::new(Colour::GRAY, 4.0, true);
        s.push_point(DVec2::ZERO);
        assert!(s.set_point(0, dvec2(1.0, 1.0)));
        assert!(!s.set_point(3, DVec2::ZERO));
        assert_eq!(s.points, vec![dvec2(1.0, 1.0)]);
    }

    #[test]
    fn empty_curve_is_empty_path() {
        assert!(closed_curve(&[]).is_empty());
    }
}
