//! BFSM states: a goal selector, a modifier chain, and ordered transitions.

use std::sync::Arc;

use crowd_agent::{AgentView, PrefVelocity};
use crowd_core::{AgentId, StateId, Vec2};

use crate::{BfsmContext, Condition, Goal, GoalSelector, VelocityModifier};

// ── Transition ───────────────────────────────────────────────────────────────

/// One outgoing edge of a state.
pub(crate) struct Transition {
    pub(crate) condition: Box<dyn Condition>,
    /// Resolved from the target's name by `BfsmBuilder::build`.
    pub(crate) target: StateId,
}

// ── StateDef ─────────────────────────────────────────────────────────────────

/// Builder-side description of a state, consumed by
/// [`BfsmBuilder::state`][crate::BfsmBuilder::state].
pub struct StateDef {
    pub(crate) name: String,
    pub(crate) is_final: bool,
    pub(crate) selector: Box<dyn GoalSelector>,
    pub(crate) modifiers: Vec<Box<dyn VelocityModifier>>,
    pub(crate) transitions: Vec<(Box<dyn Condition>, String)>,
}

impl StateDef {
    pub fn new(name: impl Into<String>, selector: impl GoalSelector + 'static) -> Self {
        Self {
            name: name.into(),
            is_final: false,
            selector: Box::new(selector),
            modifiers: Vec::new(),
            transitions: Vec::new(),
        }
    }

    /// Mark the state final: agents never transition out of it.
    pub fn final_state(mut self) -> Self {
        self.is_final = true;
        self
    }

    /// Append a modifier to the chain (applied in append order).
    pub fn with_modifier(mut self, modifier: impl VelocityModifier + 'static) -> Self {
        self.modifiers.push(Box::new(modifier));
        self
    }

    /// Append a transition (evaluated in append order, first match fires).
    pub fn with_transition(
        mut self,
        condition: impl Condition + 'static,
        target: impl Into<String>,
    ) -> Self {
        self.transitions.push((Box::new(condition), target.into()));
        self
    }
}

// ── State ────────────────────────────────────────────────────────────────────

/// A node of the behavior graph.
pub struct State {
    pub id: StateId,
    pub name: String,
    pub is_final: bool,
    pub(crate) selector: Box<dyn GoalSelector>,
    pub(crate) modifiers: Vec<Box<dyn VelocityModifier>>,
    pub(crate) transitions: Vec<Transition>,
}

impl State {
    /// The state's goal selector (e.g. for external-store access).
    pub fn selector(&self) -> &dyn GoalSelector {
        self.selector.as_ref()
    }

    /// Agent enters: assign a goal, register modifiers, arm conditions.
    pub(crate) fn enter(&mut self, agent: AgentId, position: Vec2, time: f64) -> Arc<Goal> {
        let goal = self.selector.assign(agent, position);
        for modifier in &mut self.modifiers {
            modifier.register_agent(agent);
        }
        for transition in &mut self.transitions {
            transition.condition.on_enter(agent, time);
        }
        goal
    }

    /// Agent leaves: release the goal assignment, unregister modifiers,
    /// disarm conditions.
    pub(crate) fn leave(&mut self, agent: AgentId) {
        self.selector.free(agent);
        for modifier in &mut self.modifiers {
            modifier.unregister_agent(agent);
        }
        for transition in &mut self.transitions {
            transition.condition.on_leave(agent);
        }
    }

    /// Evaluate transitions in declared order; the first satisfied one
    /// names the target.  Final states never transition.
    pub(crate) fn test_transitions(
        &mut self,
        agent: &AgentView<'_>,
        goal: &Goal,
        ctx: &BfsmContext<'_>,
    ) -> Option<StateId> {
        if self.is_final {
            return None;
        }
        for transition in &mut self.transitions {
            if transition.condition.is_met(agent, goal, ctx) {
                return Some(transition.target);
            }
        }
        None
    }

    /// Run the modifier chain over `pref`, in declared order.
    pub(crate) fn adapt_pref(&self, agent: &AgentView<'_>, pref: &mut PrefVelocity) {
        for modifier in &self.modifiers {
            modifier.adapt(agent, pref);
        }
    }
}
