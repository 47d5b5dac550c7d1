//! Unit tests for crowd-spatial.

use crowd_agent::{AgentProfile, AgentStore};
use crowd_core::{AgentId, ObstacleId, Vec2};

use crate::{ObstacleSetBuilder, SpatialIndex};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Store with agents at the given positions, shared profile.
fn store_at(positions: &[Vec2]) -> AgentStore {
    let mut store = AgentStore::new();
    let profile = AgentProfile { max_neighbors: 10, neighbor_dist: 5.0, ..AgentProfile::default() };
    for &p in positions {
        let id = store.spawn(&profile);
        store.position[id.index()] = p;
    }
    store
}

// ── Obstacle chains ──────────────────────────────────────────────────────────

#[cfg(test)]
mod obstacle_tests {
    use super::*;

    #[test]
    fn open_chain_links_prev_next() {
        let mut b = ObstacleSetBuilder::new();
        let ids = b
            .add_chain(
                &[Vec2::ZERO, Vec2::new(5.0, 0.0), Vec2::new(5.0, 5.0)],
                false,
            )
            .unwrap();
        let set = b.build();
        assert_eq!(ids.len(), 2);

        let first = set.get(ids[0]).unwrap();
        let second = set.get(ids[1]).unwrap();
        assert_eq!(first.prev, ObstacleId::INVALID);
        assert_eq!(first.next, second.id);
        assert_eq!(second.prev, first.id);
        assert_eq!(second.next, ObstacleId::INVALID);
        assert_eq!(first.unit_dir, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn closed_chain_wraps_links() {
        let mut b = ObstacleSetBuilder::new();
        let ids = b
            .add_chain(
                &[
                    Vec2::ZERO,
                    Vec2::new(4.0, 0.0),
                    Vec2::new(4.0, 4.0),
                    Vec2::new(0.0, 4.0),
                ],
                true,
            )
            .unwrap();
        let set = b.build();
        assert_eq!(ids.len(), 4);
        assert_eq!(set.get(ids[0]).unwrap().prev, ids[3]);
        assert_eq!(set.get(ids[3]).unwrap().next, ids[0]);
    }

    #[test]
    fn colinear_points_merge_into_one_wall() {
        let mut b = ObstacleSetBuilder::new();
        // Five points on one line → a single segment.
        let ids = b
            .add_chain(
                &[
                    Vec2::ZERO,
                    Vec2::new(1.0, 0.0),
                    Vec2::new(2.0, 0.0),
                    Vec2::new(3.0, 0.0),
                    Vec2::new(4.0, 0.0),
                ],
                false,
            )
            .unwrap();
        let set = b.build();
        assert_eq!(ids.len(), 1);
        let wall = set.get(ids[0]).unwrap();
        assert_eq!(wall.p0, Vec2::ZERO);
        assert_eq!(wall.p1, Vec2::new(4.0, 0.0));
    }

    #[test]
    fn degenerate_chains_rejected() {
        let mut b = ObstacleSetBuilder::new();
        assert!(b.add_chain(&[Vec2::ZERO], false).is_err());
        assert!(b.add_chain(&[Vec2::ZERO, Vec2::ZERO], false).is_err());
    }
}

// ── Neighbor queries ─────────────────────────────────────────────────────────

#[cfg(test)]
mod neighbor_tests {
    use super::*;

    #[test]
    fn exact_set_within_range_ordered_by_distance() {
        // Agent 0 at origin; agents at distances 1, 2, 3, and 10 (outside).
        let store = store_at(&[
            Vec2::ZERO,
            Vec2::new(2.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 3.0),
            Vec2::new(10.0, 0.0),
        ]);
        let mut index = SpatialIndex::new(crate::ObstacleSet::empty());
        index.rebuild(&store);

        let n = index.neighbors(&store, AgentId(0));
        let ids: Vec<_> = n.iter().map(|x| x.id).collect();
        assert_eq!(ids, vec![AgentId(2), AgentId(1), AgentId(3)]);
        assert_eq!(n[0].dist_sq, 1.0);
        assert_eq!(n[2].dist_sq, 9.0);
    }

    #[test]
    fn equidistant_ties_break_by_ascending_id() {
        // Four agents all exactly 1 m from the querier.
        let store = store_at(&[
            Vec2::ZERO,
            Vec2::new(0.0, -1.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(-1.0, 0.0),
            Vec2::new(0.0, 1.0),
        ]);
        let mut index = SpatialIndex::new(crate::ObstacleSet::empty());
        index.rebuild(&store);

        let ids: Vec<_> = index.neighbors(&store, AgentId(0)).iter().map(|x| x.id).collect();
        assert_eq!(ids, vec![AgentId(1), AgentId(2), AgentId(3), AgentId(4)]);
    }

    #[test]
    fn capped_at_max_neighbors() {
        let mut positions = vec![Vec2::ZERO];
        for i in 0..20 {
            positions.push(Vec2::new(0.1 * (i + 1) as f32, 0.0));
        }
        let mut store = store_at(&positions);
        store.max_neighbors[0] = 4;

        let mut index = SpatialIndex::new(crate::ObstacleSet::empty());
        index.rebuild(&store);

        let n = index.neighbors(&store, AgentId(0));
        assert_eq!(n.len(), 4);
        // The four closest, not an arbitrary four.
        assert_eq!(n[0].id, AgentId(1));
        assert_eq!(n[3].id, AgentId(4));
    }

    #[test]
    fn querier_excluded_from_results() {
        let store = store_at(&[Vec2::ZERO, Vec2::new(1.0, 0.0)]);
        let mut index = SpatialIndex::new(crate::ObstacleSet::empty());
        index.rebuild(&store);
        let n = index.neighbors(&store, AgentId(1));
        assert_eq!(n.len(), 1);
        assert_eq!(n[0].id, AgentId(0));
    }

    #[test]
    #[should_panic(expected = "queried before rebuild")]
    fn query_before_rebuild_panics() {
        let store = store_at(&[Vec2::ZERO]);
        let index = SpatialIndex::new(crate::ObstacleSet::empty());
        let _ = index.neighbors(&store, AgentId(0));
    }

    #[test]
    fn rebuild_reflects_moved_agents() {
        let mut store = store_at(&[Vec2::ZERO, Vec2::new(100.0, 0.0)]);
        let mut index = SpatialIndex::new(crate::ObstacleSet::empty());
        index.rebuild(&store);
        assert!(index.neighbors(&store, AgentId(0)).is_empty());

        store.position[1] = Vec2::new(1.0, 0.0);
        index.rebuild(&store);
        assert_eq!(index.neighbors(&store, AgentId(0)).len(), 1);
    }
}

// ── Obstacle queries ─────────────────────────────────────────────────────────

#[cfg(test)]
mod obstacle_query_tests {
    use super::*;

    #[test]
    fn obstacles_within_range_of_nearest_point() {
        let mut b = ObstacleSetBuilder::new();
        // A long wall whose *endpoints* are far away but whose middle passes
        // within 1 m of the query point — must still be found.
        b.add_chain(&[Vec2::new(-50.0, 1.0), Vec2::new(50.0, 1.0)], false).unwrap();
        // A distant wall, outside any reasonable range.
        b.add_chain(&[Vec2::new(-50.0, 40.0), Vec2::new(50.0, 40.0)], false).unwrap();
        let index = SpatialIndex::new(b.build());

        let near = index.obstacles_near(Vec2::ZERO, 3.0);
        assert_eq!(near.len(), 1);
        assert_eq!(near[0].p1, Vec2::new(50.0, 1.0));
    }

    #[test]
    fn obstacle_results_ordered_by_distance() {
        let mut b = ObstacleSetBuilder::new();
        b.add_chain(&[Vec2::new(-5.0, 2.0), Vec2::new(5.0, 2.0)], false).unwrap();
        b.add_chain(&[Vec2::new(-5.0, 1.0), Vec2::new(5.0, 1.0)], false).unwrap();
        let index = SpatialIndex::new(b.build());

        let near = index.obstacles_near(Vec2::ZERO, 10.0);
        assert_eq!(near.len(), 2);
        assert_eq!(near[0].p0.y, 1.0);
        assert_eq!(near[1].p0.y, 2.0);
    }
}
