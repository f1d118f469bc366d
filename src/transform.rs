//! Affine transforms between doodle-local space and the drawing plane.
//!
//! A doodle transform is always rebuilt from the current origin, rotation and
//! scale (scale first, then rotate, then translate). Nothing caches it, so a
//! parameter change is visible to the very next query.

use glam::{DAffine2, DVec2};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    affine: DAffine2,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        affine: DAffine2::IDENTITY,
    };

    pub fn from_affine(affine: DAffine2) -> Self {
        Self { affine }
    }

    /// Local → plane transform for a doodle
    pub fn for_doodle(origin: DVec2, rotation: f64, scale: DVec2) -> Self {
        Self {
            affine: DAffine2::from_scale_angle_translation(scale, rotation, origin),
        }
    }

    pub fn translation(offset: DVec2) -> Self {
        Self {
            affine: DAffine2::from_translation(offset),
        }
    }

    pub fn scale(scale: DVec2) -> Self {
        Self {
            affine: DAffine2::from_scale(scale),
        }
    }

    pub fn affine(&self) -> DAffine2 {
        self.affine
    }

    pub fn apply(&self, p: DVec2) -> DVec2 {
        self.affine.transform_point2(p)
    }

    /// Map a point back through the transform.
    ///
    /// A degenerate (zero-scale) transform has no inverse; the point is returned
    /// unchanged so hit tests simply miss.
    pub fn inverse_apply(&self, p: DVec2) -> DVec2 {
        if self.affine.matrix2.determinant() == 0.0 {
            return p;
        }
        self.affine.inverse().transform_point2(p)
    }

    /// `self` followed by `next` (i.e. `next ∘ self`)
    pub fn then(&self, next: &Transform) -> Transform {
        Transform {
            affine: next.affine * self.affine,
        }
    }
}

/// Save/restore stack of transforms, the host surface's counterpart of a
/// canvas context's `save()`/`restore()`.
#[derive(Debug, Clone)]
pub struct TransformStack {
    stack: Vec<Transform>,
}

impl Default for TransformStack {
    fn default() -> Self {
        Self::new(Transform::IDENTITY)
    }
}

impl TransformStack {
    pub fn new(base: Transform) -> Self {
        Self { stack: vec![base] }
    }

    pub fn current(&self) -> Transform {
        // The base entry is never popped
        self.stack.last().copied().unwrap_or_default()
    }

    /// Push `inner` applied inside the current transform
    pub fn push(&mut self, inner: &Transform) {
        let composed = inner.then(&self.current());
        self.stack.push(composed);
    }

    /// Apply `inner` inside the top entry without pushing
    pub fn concat(&mut self, inner: &Transform) {
        if let Some(top) = self.stack.last_mut() {
            *top = inner.then(top);
        }
    }

    pub fn pop(&mut self) -> Option<Transform> {
        if self.stack.len() > 1 { self.stack.pop() } else { None }
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}
