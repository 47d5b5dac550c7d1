//! Half-plane constraints in velocity space.

use crowd_core::Vec2;

/// A directed half-plane constraint on an agent's velocity.
///
/// Convention (matches the reciprocal-avoidance literature):
///
/// ```text
/// feasible = { v : det(dir, point − v) ≤ 0 }
/// ```
///
/// i.e. a velocity is admissible when it lies on the **left** of the ray
/// from `point` in direction `dir`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OrcaLine {
    /// A point on the boundary line.
    pub point: Vec2,
    /// Unit direction of the boundary line.
    pub dir: Vec2,
}

impl OrcaLine {
    #[inline]
    pub fn new(point: Vec2, dir: Vec2) -> Self {
        Self { point, dir }
    }

    /// Violation depth of `v`: positive when `v` is on the infeasible side.
    #[inline]
    pub fn violation(&self, v: Vec2) -> f32 {
        self.dir.det(self.point - v)
    }
}
