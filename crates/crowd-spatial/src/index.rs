//! `SpatialIndex` — per-step neighbor and obstacle range queries.
//!
//! # Lifecycle
//!
//! The obstacle R-tree is built once, at construction, from the immutable
//! [`ObstacleSet`] the index owns.  The agent R-tree is rebuilt from the
//! current store at the start of every step via [`rebuild`](SpatialIndex::rebuild)
//! (bulk-loaded — O(n log n), much faster than n inserts) and then queried
//! read-only, possibly from many Rayon workers at once.
//!
//! Querying neighbors before the first `rebuild` is a sequencing bug in the
//! caller — construct-then-freeze discipline — and panics rather than
//! silently returning nothing.
//!
//! # Determinism
//!
//! R-tree traversal order is not specified for equidistant entries, so both
//! query paths explicitly sort results by (squared distance, id) before
//! truncation.  Query results are therefore identical regardless of
//! insertion or traversal order, which the simulation's reproducibility
//! guarantee depends on.

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crowd_agent::AgentStore;
use crowd_core::{AgentId, ObstacleId, Segment, Vec2};

use crate::{Obstacle, ObstacleSet};

// ── R-tree entries ───────────────────────────────────────────────────────────

/// Entry stored in the agent R-tree: a 2-D point with the associated id.
#[derive(Clone)]
struct AgentEntry {
    point: [f32; 2],
    id: AgentId,
}

impl RTreeObject for AgentEntry {
    type Envelope = AABB<[f32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for AgentEntry {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

/// Entry stored in the obstacle R-tree: a segment with the associated id.
#[derive(Clone)]
struct ObstacleEntry {
    seg: Segment,
    id: ObstacleId,
}

impl RTreeObject for ObstacleEntry {
    type Envelope = AABB<[f32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners([self.seg.a.x, self.seg.a.y], [self.seg.b.x, self.seg.b.y])
    }
}

impl PointDistance for ObstacleEntry {
    /// Point-to-segment squared distance, so range queries measure to the
    /// nearest point of the wall, not to its bounding box.
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        self.seg.distance_sq(Vec2::new(point[0], point[1]))
    }
}

// ── Query result ─────────────────────────────────────────────────────────────

/// One neighbor returned by [`SpatialIndex::neighbors`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Neighbor {
    /// Squared distance from the querying agent's position.
    pub dist_sq: f32,
    pub id: AgentId,
}

// ── SpatialIndex ─────────────────────────────────────────────────────────────

/// Owns the scene's obstacles and a rebuildable index over agent positions.
pub struct SpatialIndex {
    obstacles: ObstacleSet,
    obstacle_tree: RTree<ObstacleEntry>,
    /// `None` until the first [`rebuild`](Self::rebuild).
    agent_tree: Option<RTree<AgentEntry>>,
}

impl SpatialIndex {
    /// Build the index over `obstacles`.  Call [`rebuild`](Self::rebuild)
    /// before the first neighbor query.
    pub fn new(obstacles: ObstacleSet) -> Self {
        let entries: Vec<ObstacleEntry> = obstacles
            .iter()
            .map(|o| ObstacleEntry { seg: o.segment(), id: o.id })
            .collect();
        Self {
            obstacles,
            obstacle_tree: RTree::bulk_load(entries),
            agent_tree: None,
        }
    }

    /// The obstacle set this index owns.
    #[inline]
    pub fn obstacle_set(&self) -> &ObstacleSet {
        &self.obstacles
    }

    /// Rebuild the agent tree from the current store.
    ///
    /// Invalidates nothing for concurrent readers: the caller must ensure no
    /// queries are in flight (the step loop rebuilds strictly between the
    /// spawn phase and the parallel query phase).
    pub fn rebuild(&mut self, store: &AgentStore) {
        let entries: Vec<AgentEntry> = store
            .agent_ids()
            .map(|id| AgentEntry {
                point: [store.position[id.index()].x, store.position[id.index()].y],
                id,
            })
            .collect();
        self.agent_tree = Some(RTree::bulk_load(entries));
    }

    /// Drop the agent tree (e.g. when the store is about to be mutated and
    /// stale queries must be caught).
    pub fn invalidate(&mut self) {
        self.agent_tree = None;
    }

    /// Neighbors of `agent`: up to `max_neighbors` other agents within
    /// `neighbor_dist`, ordered by ascending squared distance, ties broken
    /// by ascending id.
    ///
    /// # Panics
    ///
    /// Panics if called before [`rebuild`](Self::rebuild).
    pub fn neighbors(&self, store: &AgentStore, agent: AgentId) -> Vec<Neighbor> {
        let tree = self
            .agent_tree
            .as_ref()
            .expect("spatial index queried before rebuild");

        let i = agent.index();
        let pos = store.position[i];
        let range = store.neighbor_dist[i];
        let cap = store.max_neighbors[i];
        if cap == 0 {
            return Vec::new();
        }

        let mut found: Vec<Neighbor> = tree
            .locate_within_distance([pos.x, pos.y], range * range)
            .filter(|e| e.id != agent)
            .map(|e| Neighbor { dist_sq: e.distance_2(&[pos.x, pos.y]), id: e.id })
            .collect();

        found.sort_unstable_by(|a, b| {
            a.dist_sq
                .partial_cmp(&b.dist_sq)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.id.cmp(&b.id))
        });
        found.truncate(cap);
        found
    }

    /// Obstacles with any point within `range` of `pos`, ordered by
    /// ascending squared distance then ascending id.
    pub fn obstacles_near(&self, pos: Vec2, range: f32) -> Vec<&Obstacle> {
        let mut found: Vec<(f32, ObstacleId)> = self
            .obstacle_tree
            .locate_within_distance([pos.x, pos.y], range * range)
            .map(|e| (e.distance_2(&[pos.x, pos.y]), e.id))
            .collect();

        found.sort_unstable_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.1.cmp(&b.1))
        });
        found
            .into_iter()
            .map(|(_, id)| self.obstacles.get(id).expect("obstacle tree holds known ids"))
            .collect()
    }
}
