//! Goals and goal sets.
//!
//! A `Goal` is the target an agent is currently pursuing — a point or a
//! region.  Goals live in named, immutable [`GoalSet`]s referenced by id
//! from selectors, or are created on the fly by selectors (fixed-point,
//! external).  Agents hold goals as `Arc` handles: whichever selector/state
//! assigned the goal most recently owns the assignment, and release on
//! supersession is a drop.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crowd_core::{GoalId, GoalSetId, Vec2};

use crate::BfsmError;

// ── GoalShape ────────────────────────────────────────────────────────────────

/// The geometry of a goal target.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GoalShape {
    /// A single point.
    Point(Vec2),
    /// A disc; any point inside satisfies the goal.
    Circle { center: Vec2, radius: f32 },
    /// An axis-aligned box; any point inside satisfies the goal.
    Aabb { min: Vec2, max: Vec2 },
}

// ── Goal ─────────────────────────────────────────────────────────────────────

/// A target an agent pursues.  `id` is unique within the owning goal set.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Goal {
    pub id: GoalId,
    pub shape: GoalShape,
}

impl Goal {
    pub fn point(id: GoalId, p: Vec2) -> Self {
        Self { id, shape: GoalShape::Point(p) }
    }

    pub fn circle(id: GoalId, center: Vec2, radius: f32) -> Self {
        Self { id, shape: GoalShape::Circle { center, radius } }
    }

    /// The point of the goal region nearest to `from` — what an agent
    /// standing at `from` should steer toward.
    pub fn target_point(&self, from: Vec2) -> Vec2 {
        match self.shape {
            GoalShape::Point(p) => p,
            GoalShape::Circle { center, radius } => {
                let offset = from - center;
                let dist = offset.length();
                if dist <= radius {
                    from // already inside
                } else {
                    center + offset * (radius / dist)
                }
            }
            GoalShape::Aabb { min, max } => {
                Vec2::new(from.x.clamp(min.x, max.x), from.y.clamp(min.y, max.y))
            }
        }
    }

    /// Squared distance from `p` to the goal region (0 inside a region).
    pub fn squared_distance(&self, p: Vec2) -> f32 {
        self.target_point(p).distance_sq(p)
    }
}

// ── GoalSet ──────────────────────────────────────────────────────────────────

/// A named, immutable collection of goals with set-unique ids.
pub struct GoalSet {
    pub id: GoalSetId,
    goals: FxHashMap<GoalId, Arc<Goal>>,
}

impl GoalSet {
    pub fn new(id: GoalSetId) -> Self {
        Self { id, goals: FxHashMap::default() }
    }

    /// Add a goal.  Duplicate ids within one set are a configuration error.
    pub fn insert(&mut self, goal: Goal) -> Result<(), BfsmError> {
        let gid = goal.id;
        if self.goals.insert(gid, Arc::new(goal)).is_some() {
            return Err(BfsmError::DuplicateGoal { goal: gid, set: self.id });
        }
        Ok(())
    }

    #[inline]
    pub fn get(&self, goal: GoalId) -> Option<Arc<Goal>> {
        self.goals.get(&goal).cloned()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.goals.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }
}

/// Goal sets keyed by id, as handed to `BfsmBuilder`.
pub type GoalSetMap = FxHashMap<GoalSetId, GoalSet>;
