//! Transition conditions — pure predicates over (agent, goal) plus private
//! state.
//!
//! Conditions are owned by their transition and evaluated during the
//! sequential BFSM pass, so they may hold plain per-agent state (`&mut
//! self`) without locking.  Copying a condition (`clone_box`) produces an
//! independent instance: private per-agent state starts fresh, read-only
//! configuration is copied or shared.

use rustc_hash::{FxHashMap, FxHashSet};

use crowd_agent::AgentView;
use crowd_core::AgentId;

use crate::{BfsmError, EventRegistry, Goal};

// ── Context ──────────────────────────────────────────────────────────────────

/// Read-only per-step inputs available to every condition.
pub struct BfsmContext<'a> {
    /// Global simulated time in seconds.
    pub time: f64,
    /// Events fired since the previous step (latched for this step).
    pub events: &'a FxHashSet<String>,
}

// ── Trait ─────────────────────────────────────────────────────────────────────

/// A transition predicate.
pub trait Condition: Send + Sync {
    /// Validate references (e.g. event names) at graph build time.
    fn resolve(&mut self, _events: &EventRegistry) -> Result<(), BfsmError> {
        Ok(())
    }

    /// Called when `agent` enters the state owning this condition.
    fn on_enter(&mut self, _agent: AgentId, _time: f64) {}

    /// Called when `agent` leaves the state owning this condition.
    fn on_leave(&mut self, _agent: AgentId) {}

    /// `true` if the transition should fire for `agent` this step.
    fn is_met(&mut self, agent: &AgentView<'_>, goal: &Goal, ctx: &BfsmContext<'_>) -> bool;

    /// Deep copy: an independent instance with fresh private state.
    fn clone_box(&self) -> Box<dyn Condition>;
}

impl Clone for Box<dyn Condition> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

// ── AutoCondition ────────────────────────────────────────────────────────────

/// The tautology: always fires.  Used for immediate pass-through states.
#[derive(Clone, Default)]
pub struct AutoCondition;

impl Condition for AutoCondition {
    fn is_met(&mut self, _agent: &AgentView<'_>, _goal: &Goal, _ctx: &BfsmContext<'_>) -> bool {
        true
    }

    fn clone_box(&self) -> Box<dyn Condition> {
        Box::new(self.clone())
    }
}

// ── TimerCondition ───────────────────────────────────────────────────────────

/// Fires once the agent has spent `duration` seconds in the state.
pub struct TimerCondition {
    duration: f32,
    /// Entry time per agent, recorded by `on_enter`.
    entered: FxHashMap<AgentId, f64>,
}

impl TimerCondition {
    pub fn new(duration: f32) -> Self {
        Self { duration, entered: FxHashMap::default() }
    }
}

impl Condition for TimerCondition {
    fn on_enter(&mut self, agent: AgentId, time: f64) {
        self.entered.insert(agent, time);
    }

    fn on_leave(&mut self, agent: AgentId) {
        self.entered.remove(&agent);
    }

    fn is_met(&mut self, agent: &AgentView<'_>, _goal: &Goal, ctx: &BfsmContext<'_>) -> bool {
        match self.entered.get(&agent.id) {
            Some(&start) => ctx.time - start >= self.duration as f64,
            // No recorded entry (agent registered before this condition was
            // live) — treat the state as just entered.
            None => false,
        }
    }

    fn clone_box(&self) -> Box<dyn Condition> {
        // Deep copy: duration is shared config, entry times are private.
        Box::new(TimerCondition::new(self.duration))
    }
}

// ── GoalReachedCondition ─────────────────────────────────────────────────────

/// Fires when the agent is within `distance` of its current goal region.
#[derive(Clone)]
pub struct GoalReachedCondition {
    distance: f32,
}

impl GoalReachedCondition {
    pub fn new(distance: f32) -> Self {
        Self { distance }
    }
}

impl Condition for GoalReachedCondition {
    fn is_met(&mut self, agent: &AgentView<'_>, goal: &Goal, _ctx: &BfsmContext<'_>) -> bool {
        goal.squared_distance(agent.position) <= self.distance * self.distance
    }

    fn clone_box(&self) -> Box<dyn Condition> {
        Box::new(self.clone())
    }
}

// ── EventCondition ───────────────────────────────────────────────────────────

/// Fires during any step in which the named external event was latched.
#[derive(Clone)]
pub struct EventCondition {
    name: String,
}

impl EventCondition {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Condition for EventCondition {
    fn resolve(&mut self, events: &EventRegistry) -> Result<(), BfsmError> {
        if !events.contains(&self.name) {
            return Err(BfsmError::UnknownEvent(self.name.clone()));
        }
        Ok(())
    }

    fn is_met(&mut self, _agent: &AgentView<'_>, _goal: &Goal, ctx: &BfsmContext<'_>) -> bool {
        ctx.events.contains(&self.name)
    }

    fn clone_box(&self) -> Box<dyn Condition> {
        Box::new(self.clone())
    }
}
