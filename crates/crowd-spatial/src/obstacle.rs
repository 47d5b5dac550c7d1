//! Static obstacle model: line segments linked into chains.
//!
//! # Chains
//!
//! Obstacles arrive as polylines (walls) or polygons (building footprints).
//! Each edge becomes one `Obstacle` segment carrying `prev`/`next` links to
//! its chain neighbors, so avoidance and rendering code can walk a whole
//! wall from any of its segments.  Consecutive near-colinear edges are
//! merged at build time — a wall made of many short colinear pieces behaves
//! (and costs) like one long segment.
//!
//! The set is immutable once built; [`ObstacleSetBuilder`] is the only way
//! to construct one.

use crowd_core::{ObstacleId, Segment, Vec2};

use crate::SpatialError;

/// Two consecutive edges are merged when the cosine of the angle between
/// them exceeds this (≈ 0.8° tolerance).
const COLINEAR_COS: f32 = 0.9999;

// ── Obstacle ─────────────────────────────────────────────────────────────────

/// One static line-segment obstacle.
#[derive(Clone, Debug)]
pub struct Obstacle {
    pub id: ObstacleId,
    /// First endpoint.
    pub p0: Vec2,
    /// Second endpoint.
    pub p1: Vec2,
    /// Unit direction from `p0` to `p1`.
    pub unit_dir: Vec2,
    /// Preceding segment in the chain (`ObstacleId::INVALID` at an open end).
    pub prev: ObstacleId,
    /// Following segment in the chain (`ObstacleId::INVALID` at an open end).
    pub next: ObstacleId,
}

impl Obstacle {
    /// The obstacle as a plain geometric segment.
    #[inline]
    pub fn segment(&self) -> Segment {
        Segment::new(self.p0, self.p1)
    }

    /// Squared distance from `p` to this segment.
    #[inline]
    pub fn distance_sq(&self, p: Vec2) -> f32 {
        self.segment().distance_sq(p)
    }
}

// ── ObstacleSet ──────────────────────────────────────────────────────────────

/// The immutable collection of all obstacle segments in a scene.
#[derive(Default)]
pub struct ObstacleSet {
    obstacles: Vec<Obstacle>,
}

impl ObstacleSet {
    /// An empty set (open scene with no walls).
    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    /// Obstacle by id, or `None` for an unknown/`INVALID` id.
    #[inline]
    pub fn get(&self, id: ObstacleId) -> Option<&Obstacle> {
        self.obstacles.get(id.index())
    }

    /// All obstacles in id order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.iter()
    }
}

// ── ObstacleSetBuilder ───────────────────────────────────────────────────────

/// Accumulates obstacle chains, then freezes them into an [`ObstacleSet`].
#[derive(Default)]
pub struct ObstacleSetBuilder {
    obstacles: Vec<Obstacle>,
}

impl ObstacleSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a chain of segments through `points`.
    ///
    /// `closed` connects the last point back to the first (polygon).  Runs
    /// of near-colinear points are merged into single segments before the
    /// chain is linked.
    ///
    /// Returns the ids of the created segments, in chain order.
    pub fn add_chain(
        &mut self,
        points: &[Vec2],
        closed: bool,
    ) -> Result<Vec<ObstacleId>, SpatialError> {
        if points.len() < 2 {
            return Err(SpatialError::DegenerateChain(points.len()));
        }
        for (i, w) in points.windows(2).enumerate() {
            if w[0].distance_sq(w[1]) <= crowd_core::geom::EPSILON * crowd_core::geom::EPSILON {
                return Err(SpatialError::ZeroLengthEdge(i));
            }
        }

        let merged = merge_colinear(points, closed);

        let base = self.obstacles.len() as u32;
        let n = if closed { merged.len() } else { merged.len() - 1 };
        let mut ids = Vec::with_capacity(n);

        for i in 0..n {
            let p0 = merged[i];
            let p1 = merged[(i + 1) % merged.len()];
            let id = ObstacleId(base + i as u32);

            let prev = if i > 0 {
                ObstacleId(base + i as u32 - 1)
            } else if closed {
                ObstacleId(base + n as u32 - 1)
            } else {
                ObstacleId::INVALID
            };
            let next = if i + 1 < n {
                ObstacleId(base + i as u32 + 1)
            } else if closed {
                ObstacleId(base)
            } else {
                ObstacleId::INVALID
            };

            self.obstacles.push(Obstacle {
                id,
                p0,
                p1,
                unit_dir: (p1 - p0).normalize(),
                prev,
                next,
            });
            ids.push(id);
        }

        Ok(ids)
    }

    /// Freeze the accumulated chains.
    pub fn build(self) -> ObstacleSet {
        ObstacleSet { obstacles: self.obstacles }
    }
}

/// Drop interior points whose adjacent edges are near-colinear.
///
/// For closed chains the first point may itself be an interior point of a
/// colinear run that wraps around; that case is left as-is — the cost is one
/// extra segment, not a correctness issue.
fn merge_colinear(points: &[Vec2], closed: bool) -> Vec<Vec2> {
    let mut out: Vec<Vec2> = Vec::with_capacity(points.len());
    out.push(points[0]);
    for i in 1..points.len() {
        let p = points[i];
        // Do not drop the final point of an open chain.
        let is_last = !closed && i == points.len() - 1;
        if !is_last {
            let prev = *out.last().unwrap();
            let next = points[(i + 1) % points.len()];
            let d0 = (p - prev).normalize();
            let d1 = (next - p).normalize();
            if d0.dot(d1) > COLINEAR_COS {
                continue; // interior point of a straight run
            }
        }
        out.push(p);
    }
    out
}
