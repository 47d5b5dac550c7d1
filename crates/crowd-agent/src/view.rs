//! `AgentView` — the read-only per-agent snapshot used in the parallel phase.
//!
//! During velocity resolution every worker reads its own agent and its
//! neighbors through views.  A view copies the handful of scalar fields a
//! resolver touches, so neighbor access never chases per-field indices into
//! the SoA arrays inside the inner constraint loop.

use crowd_core::{AgentId, ClassId, StateId, Vec2};

use crate::AgentStore;

/// Read-only kinematic snapshot of one agent.
#[derive(Copy, Clone, Debug)]
pub struct AgentView<'a> {
    pub id: AgentId,
    pub position: Vec2,
    pub orientation: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub pref_speed: f32,
    pub max_speed: f32,
    pub max_angular_speed: f32,
    pub max_neighbors: usize,
    pub neighbor_dist: f32,
    pub class: ClassId,
    pub priority: f32,
    pub state: StateId,
    // Ties the snapshot's lifetime to the store borrow so it cannot outlive
    // a mutation phase.
    _store: std::marker::PhantomData<&'a AgentStore>,
}

impl<'a> AgentView<'a> {
    /// Snapshot `agent` from `store`.
    ///
    /// # Panics
    ///
    /// Panics if `agent` is out of range.
    pub fn new(store: &'a AgentStore, agent: AgentId) -> Self {
        let i = agent.index();
        assert!(i < store.count, "agent {agent} out of range (count {})", store.count);
        Self {
            id: agent,
            position: store.position[i],
            orientation: store.orientation[i],
            velocity: store.velocity[i],
            radius: store.radius[i],
            pref_speed: store.pref_speed[i],
            max_speed: store.max_speed[i],
            max_angular_speed: store.max_angular_speed[i],
            max_neighbors: store.max_neighbors[i],
            neighbor_dist: store.neighbor_dist[i],
            class: store.class[i],
            priority: store.priority[i],
            state: store.state[i],
            _store: std::marker::PhantomData,
        }
    }
}
