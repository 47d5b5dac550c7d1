//! 2-D geometry kernel: `Vec2` and `Segment`.
//!
//! `Vec2` uses `f32` components — pedestrian-scale scenes span at most a few
//! kilometres, so single precision gives sub-millimetre resolution while
//! halving memory traffic in the SoA agent arrays.
//!
//! Comparisons throughout the framework use squared lengths/distances;
//! `length()` exists for the few places (speed clamping, normalization) that
//! genuinely need the root.

use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// Length below which a vector is treated as zero for normalization.
pub const EPSILON: f32 = 1e-5;

// ── Vec2 ─────────────────────────────────────────────────────────────────────

/// A 2-D vector / point in metres.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };
    /// Canonical "facing forward" orientation for freshly spawned agents.
    pub const UNIT_Y: Vec2 = Vec2 { x: 0.0, y: 1.0 };

    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn dot(self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// 2-D determinant (z of the 3-D cross product): `det(a, b) = a.x·b.y − a.y·b.x`.
    ///
    /// Positive when `other` lies counter-clockwise of `self`.
    #[inline]
    pub fn det(self, other: Vec2) -> f32 {
        self.x * other.y - self.y * other.x
    }

    #[inline]
    pub fn length_sq(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.length_sq().sqrt()
    }

    #[inline]
    pub fn distance_sq(self, other: Vec2) -> f32 {
        (other - self).length_sq()
    }

    #[inline]
    pub fn distance(self, other: Vec2) -> f32 {
        self.distance_sq(other).sqrt()
    }

    /// Unit vector in the same direction, or `Vec2::ZERO` for degenerate input.
    #[inline]
    pub fn normalize(self) -> Vec2 {
        let len = self.length();
        if len > EPSILON { self / len } else { Vec2::ZERO }
    }

    /// Unit vector in the same direction, or `fallback` for degenerate input.
    #[inline]
    pub fn normalize_or(self, fallback: Vec2) -> Vec2 {
        let len = self.length();
        if len > EPSILON { self / len } else { fallback }
    }

    /// Counter-clockwise perpendicular: `(-y, x)`.
    #[inline]
    pub fn perp(self) -> Vec2 {
        Vec2::new(-self.y, self.x)
    }

    /// Same direction, length capped at `max_len`.
    #[inline]
    pub fn clamp_length(self, max_len: f32) -> Vec2 {
        let len_sq = self.length_sq();
        if len_sq > max_len * max_len {
            self * (max_len / len_sq.sqrt())
        } else {
            self
        }
    }

    /// Rotate counter-clockwise by `angle` radians.
    pub fn rotated(self, angle: f32) -> Vec2 {
        let (s, c) = angle.sin_cos();
        Vec2::new(c * self.x - s * self.y, s * self.x + c * self.y)
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    #[inline]
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    #[inline]
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    #[inline]
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    #[inline]
    fn sub_assign(&mut self, rhs: Vec2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    #[inline]
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    #[inline]
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Mul<Vec2> for f32 {
    type Output = Vec2;
    #[inline]
    fn mul(self, rhs: Vec2) -> Vec2 {
        rhs * self
    }
}

impl Div<f32> for Vec2 {
    type Output = Vec2;
    #[inline]
    fn div(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x / rhs, self.y / rhs)
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

// ── Segment ──────────────────────────────────────────────────────────────────

/// A 2-D line segment from `a` to `b`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Segment {
    pub a: Vec2,
    pub b: Vec2,
}

impl Segment {
    #[inline]
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self { a, b }
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.a.distance(self.b)
    }

    /// Unit direction from `a` to `b`; `Vec2::ZERO` for a degenerate segment.
    #[inline]
    pub fn direction(self) -> Vec2 {
        (self.b - self.a).normalize()
    }

    /// Parameter `t` in `[0, 1]` of the point on the segment nearest to `p`.
    pub fn nearest_t(self, p: Vec2) -> f32 {
        let ab = self.b - self.a;
        let len_sq = ab.length_sq();
        if len_sq <= EPSILON * EPSILON {
            return 0.0;
        }
        ((p - self.a).dot(ab) / len_sq).clamp(0.0, 1.0)
    }

    /// The point on the segment nearest to `p`.
    #[inline]
    pub fn nearest_point(self, p: Vec2) -> Vec2 {
        let t = self.nearest_t(p);
        self.a + (self.b - self.a) * t
    }

    /// Squared distance from `p` to the segment.
    #[inline]
    pub fn distance_sq(self, p: Vec2) -> f32 {
        self.nearest_point(p).distance_sq(p)
    }

    /// Signed distance of `p` from the infinite support line, positive on the
    /// left of the `a → b` direction.
    #[inline]
    pub fn signed_line_distance(self, p: Vec2) -> f32 {
        let dir = self.direction();
        dir.det(p - self.a)
    }
}
