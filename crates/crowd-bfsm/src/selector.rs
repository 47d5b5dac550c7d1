//! Goal selectors — the policy objects that hand an agent its goal on
//! state entry.
//!
//! Three variants ship with the framework:
//!
//! - [`FixedPointSelector`] — every agent gets the same point goal.
//! - [`ExplicitSelector`] — looks up a specific goal in a specific goal
//!   set; the reference is resolved (and validated) at graph build time.
//! - [`ExternalSelector`] — goals are pushed in from outside the simulator,
//!   per agent id, through a shared [`ExternalGoalStore`]; agents without
//!   an assignment hold position.

use std::sync::Arc;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU32, Ordering};

use rustc_hash::FxHashMap;

use crowd_core::{AgentId, GoalId, GoalSetId, Vec2};

use crate::{BfsmError, Goal, GoalSetMap};

// ── Trait ─────────────────────────────────────────────────────────────────────

/// Produces the goal an agent pursues while in a state.
///
/// `assign` runs during the sequential BFSM pass, `free` when the agent
/// exits the state.  Selectors hand out `Arc<Goal>` handles; a superseded
/// assignment is released by dropping the handle.
pub trait GoalSelector: Send + Sync {
    /// Resolve goal-set references against the loaded goal sets.
    ///
    /// Called once by `BfsmBuilder::build`; an unresolvable reference is a
    /// fatal configuration error and aborts construction.
    fn resolve(&mut self, _goal_sets: &GoalSetMap) -> Result<(), BfsmError> {
        Ok(())
    }

    /// Produce the goal for `agent`, standing at `position`.
    fn assign(&self, agent: AgentId, position: Vec2) -> Arc<Goal>;

    /// Release hook when the agent leaves the owning state.
    fn free(&self, _agent: AgentId) {}

    /// Downcast hook used by the control surface to reach the external
    /// store through a `dyn GoalSelector`.
    fn as_external(&self) -> Option<&ExternalGoalStore> {
        None
    }
}

// ── FixedPointSelector ───────────────────────────────────────────────────────

/// Every agent is sent to the same point.
pub struct FixedPointSelector {
    goal: Arc<Goal>,
}

impl FixedPointSelector {
    pub fn new(point: Vec2) -> Self {
        Self { goal: Arc::new(Goal::point(GoalId(0), point)) }
    }
}

impl GoalSelector for FixedPointSelector {
    fn assign(&self, _agent: AgentId, _position: Vec2) -> Arc<Goal> {
        Arc::clone(&self.goal)
    }
}

// ── ExplicitSelector ─────────────────────────────────────────────────────────

/// A specific goal from a specific goal set, both named by id in the
/// behavior configuration.
pub struct ExplicitSelector {
    set: GoalSetId,
    goal: GoalId,
    /// Filled in by `resolve`; `assign` before `resolve` is a sequencing
    /// bug caught by the expect.
    resolved: Option<Arc<Goal>>,
}

impl ExplicitSelector {
    pub fn new(set: GoalSetId, goal: GoalId) -> Self {
        Self { set, goal, resolved: None }
    }
}

impl GoalSelector for ExplicitSelector {
    fn resolve(&mut self, goal_sets: &GoalSetMap) -> Result<(), BfsmError> {
        let set = goal_sets
            .get(&self.set)
            .ok_or(BfsmError::UnknownGoalSet(self.set))?;
        let goal = set
            .get(self.goal)
            .ok_or(BfsmError::UnknownGoal { goal: self.goal, set: self.set })?;
        self.resolved = Some(goal);
        Ok(())
    }

    fn assign(&self, _agent: AgentId, _position: Vec2) -> Arc<Goal> {
        Arc::clone(
            self.resolved
                .as_ref()
                .expect("explicit selector assigned before resolve"),
        )
    }
}

// ── ExternalGoalStore / ExternalSelector ─────────────────────────────────────

/// Per-agent goal assignments pushed in by an external caller.
///
/// The map is guarded by a reader/writer lock: external threads may assign
/// and clear goals between steps while other external threads read, and the
/// sequential BFSM pass reads through the same lock.  A read always
/// observes a fully formed previous assignment or none — never a partial
/// goal.
#[derive(Default)]
pub struct ExternalGoalStore {
    map: RwLock<FxHashMap<AgentId, Arc<Goal>>>,
    /// Ids for goals minted by this store (assignments and hold goals).
    next_id: AtomicU32,
}

impl ExternalGoalStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn mint(&self, point: Vec2) -> Arc<Goal> {
        let id = GoalId(self.next_id.fetch_add(1, Ordering::Relaxed));
        Arc::new(Goal::point(id, point))
    }

    /// Assign a point goal to `agent`, replacing (and releasing) any
    /// previous assignment.  Returns the new goal handle.
    pub fn set_point(&self, agent: AgentId, point: Vec2) -> Arc<Goal> {
        let goal = self.mint(point);
        self.map.write().unwrap().insert(agent, Arc::clone(&goal));
        goal
    }

    /// The current assignment for `agent`, if any.
    pub fn get(&self, agent: AgentId) -> Option<Arc<Goal>> {
        self.map.read().unwrap().get(&agent).cloned()
    }

    /// Remove `agent`'s assignment.  Returns `true` if one existed.
    pub fn clear(&self, agent: AgentId) -> bool {
        self.map.write().unwrap().remove(&agent).is_some()
    }
}

/// Goals come from an [`ExternalGoalStore`] shared with the embedding code.
///
/// An agent with no assignment holds position: it receives a point goal at
/// its current location and waits for the outside world to direct it.
pub struct ExternalSelector {
    store: Arc<ExternalGoalStore>,
}

impl ExternalSelector {
    pub fn new(store: Arc<ExternalGoalStore>) -> Self {
        Self { store }
    }

    /// Convenience constructor that owns a fresh store.
    pub fn with_new_store() -> Self {
        Self::new(Arc::new(ExternalGoalStore::new()))
    }

    pub fn store(&self) -> &Arc<ExternalGoalStore> {
        &self.store
    }
}

impl GoalSelector for ExternalSelector {
    fn assign(&self, agent: AgentId, position: Vec2) -> Arc<Goal> {
        match self.store.get(agent) {
            Some(goal) => goal,
            None => self.store.mint(position),
        }
    }

    fn free(&self, _agent: AgentId) {
        // The external assignment survives state exit: re-entering the state
        // resumes the externally set goal.  Dropping the agent's handle is
        // the release.
    }

    fn as_external(&self) -> Option<&ExternalGoalStore> {
        Some(&self.store)
    }
}
