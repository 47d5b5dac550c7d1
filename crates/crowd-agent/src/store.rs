//! Core agent storage: `AgentStore`, the growable SoA arrays.
//!
//! # Layout
//!
//! Every `Vec` field has exactly `count` elements; the `AgentId` value is the
//! index into all of them:
//!
//! ```ignore
//! let pos = store.position[agent.index()];  // O(1), cache-friendly
//! ```
//!
//! The store only ever grows: `spawn` appends a slot and returns the new
//! sequential id.  Agents are never destroyed during a run, so ids stay
//! valid for the lifetime of the simulation.
//!
//! # Write discipline
//!
//! The simulation loop owns the store exclusively.  During the parallel
//! phases, workers read neighbor state through [`AgentView`]s and only the
//! loop writes results back (velocity, then position/orientation) — no
//! cross-agent writes ever happen off the coordinating thread.

use crowd_core::{AgentId, ClassId, StateId, Vec2};

use crate::{AgentProfile, AgentView};

/// Structure-of-Arrays storage for all agent state.
#[derive(Default)]
pub struct AgentStore {
    /// Number of agents.  Equals the length of every SoA `Vec`.
    pub count: usize,

    // ── Kinematic state (mutated every step) ──────────────────────────────
    /// Current position in metres.
    pub position: Vec<Vec2>,
    /// Unit facing direction.
    pub orientation: Vec<Vec2>,
    /// Current velocity in m/s — the resolver's output from the last step.
    pub velocity: Vec<Vec2>,

    // ── Profile parameters (fixed at spawn) ───────────────────────────────
    pub radius: Vec<f32>,
    pub pref_speed: Vec<f32>,
    pub max_speed: Vec<f32>,
    pub max_angular_speed: Vec<f32>,
    pub max_neighbors: Vec<usize>,
    pub neighbor_dist: Vec<f32>,
    pub class: Vec<ClassId>,
    pub priority: Vec<f32>,

    // ── Behavior state ────────────────────────────────────────────────────
    /// Current BFSM state.  Written by the BFSM's sequential advance pass.
    pub state: Vec<StateId>,
}

impl AgentStore {
    /// An empty store.  Populate via [`spawn`](Self::spawn).
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// `true` if `agent` names an existing slot.
    #[inline]
    pub fn contains(&self, agent: AgentId) -> bool {
        agent.index() < self.count
    }

    /// Iterator over all `AgentId`s in ascending index order.
    pub fn agent_ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        (0..self.count as u32).map(AgentId)
    }

    /// Append a new agent initialized from `profile` and return its id.
    ///
    /// Position and orientation start at the origin / +Y; the caller (the
    /// spawn phase) overwrites them from the generator before the agent is
    /// ever queried.
    pub fn spawn(&mut self, profile: &AgentProfile) -> AgentId {
        let id = AgentId(self.count as u32);

        self.position.push(Vec2::ZERO);
        self.orientation.push(Vec2::UNIT_Y);
        self.velocity.push(Vec2::ZERO);

        self.radius.push(profile.radius);
        self.pref_speed.push(profile.pref_speed);
        self.max_speed.push(profile.max_speed);
        self.max_angular_speed.push(profile.max_angular_speed);
        self.max_neighbors.push(profile.max_neighbors);
        self.neighbor_dist.push(profile.neighbor_dist);
        self.class.push(profile.class);
        self.priority.push(profile.priority);

        self.state.push(StateId::INVALID);

        self.count += 1;
        id
    }

    /// Read-only kinematic snapshot of one agent.
    ///
    /// # Panics
    ///
    /// Panics if `agent` is out of range — ids handed out by `spawn` are
    /// always valid, so an out-of-range id is a caller bug.
    #[inline]
    pub fn view(&self, agent: AgentId) -> AgentView<'_> {
        AgentView::new(self, agent)
    }
}
