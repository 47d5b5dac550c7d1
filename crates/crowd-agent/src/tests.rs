//! Unit tests for crowd-agent.

use crowd_core::{AgentId, ClassId, StateId, Vec2};

use crate::{AgentProfile, AgentStore, PrefVelocity};

fn walker() -> AgentProfile {
    AgentProfile {
        radius: 0.25,
        pref_speed: 1.2,
        max_speed: 1.8,
        class: ClassId(3),
        priority: 1.0,
        ..AgentProfile::default()
    }
}

#[cfg(test)]
mod store_tests {
    use super::*;

    #[test]
    fn spawn_assigns_sequential_ids() {
        let mut store = AgentStore::new();
        let p = walker();
        assert_eq!(store.spawn(&p), AgentId(0));
        assert_eq!(store.spawn(&p), AgentId(1));
        assert_eq!(store.spawn(&p), AgentId(2));
        assert_eq!(store.count, 3);
        assert_eq!(store.position.len(), 3);
        assert_eq!(store.state.len(), 3);
    }

    #[test]
    fn spawn_copies_profile_fields() {
        let mut store = AgentStore::new();
        let id = store.spawn(&walker());
        let i = id.index();
        assert_eq!(store.radius[i], 0.25);
        assert_eq!(store.pref_speed[i], 1.2);
        assert_eq!(store.max_speed[i], 1.8);
        assert_eq!(store.class[i], ClassId(3));
        assert_eq!(store.priority[i], 1.0);
        // Fresh agents start stationary, facing +Y, in no state.
        assert_eq!(store.velocity[i], Vec2::ZERO);
        assert_eq!(store.orientation[i], Vec2::UNIT_Y);
        assert_eq!(store.state[i], StateId::INVALID);
    }

    #[test]
    fn ids_stay_valid_across_spawns() {
        let mut store = AgentStore::new();
        let first = store.spawn(&walker());
        store.position[first.index()] = Vec2::new(7.0, -2.0);
        for _ in 0..50 {
            store.spawn(&AgentProfile::default());
        }
        // The early agent's slot is untouched by later growth.
        assert_eq!(store.position[first.index()], Vec2::new(7.0, -2.0));
        assert!(store.contains(first));
        assert!(!store.contains(AgentId(51)));
    }

    #[test]
    fn view_snapshots_fields() {
        let mut store = AgentStore::new();
        let id = store.spawn(&walker());
        store.position[id.index()] = Vec2::new(1.0, 2.0);
        store.velocity[id.index()] = Vec2::new(0.5, 0.0);
        let v = store.view(id);
        assert_eq!(v.id, id);
        assert_eq!(v.position, Vec2::new(1.0, 2.0));
        assert_eq!(v.velocity, Vec2::new(0.5, 0.0));
        assert_eq!(v.radius, 0.25);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn view_of_unknown_agent_panics() {
        let store = AgentStore::new();
        let _ = store.view(AgentId(0));
    }
}

#[cfg(test)]
mod pref_tests {
    use super::*;

    #[test]
    fn towards_builds_unit_direction() {
        let p = PrefVelocity::towards(Vec2::ZERO, Vec2::new(10.0, 0.0), 1.5, 0.1);
        assert!((p.direction.x - 1.0).abs() < 1e-6);
        assert_eq!(p.speed, 1.5);
        assert_eq!(p.velocity(), Vec2::new(1.5, 0.0));
        assert_eq!(p.target, Vec2::new(10.0, 0.0));
    }

    #[test]
    fn final_approach_scales_speed_down() {
        // 0.05 m from the goal, one step covers 0.15 m — intent slows so the
        // step lands exactly on the target instead of overshooting.
        let p = PrefVelocity::towards(Vec2::ZERO, Vec2::new(0.05, 0.0), 1.5, 0.1);
        assert!((p.speed - 0.5).abs() < 1e-5);
    }

    #[test]
    fn at_target_holds() {
        let p = PrefVelocity::towards(Vec2::new(3.0, 3.0), Vec2::new(3.0, 3.0), 1.5, 0.1);
        assert_eq!(p.speed, 0.0);
        assert_eq!(p.direction, Vec2::ZERO);
    }
}
