//! The `Bfsm` runner and its validating builder.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use crowd_agent::{AgentView, PrefVelocity};
use crowd_core::{AgentId, CrowdError, CrowdResult, StateId, Vec2};

use crate::state::Transition;
use crate::{BfsmContext, BfsmError, EventRegistry, Goal, GoalSet, GoalSetMap, State, StateDef};

// ── Bfsm ─────────────────────────────────────────────────────────────────────

/// The behavior machine: the validated state graph plus per-agent
/// current-state and current-goal arrays.
///
/// Invariants maintained here:
///
/// - every registered agent is in exactly one state at any time;
/// - an agent always holds exactly one goal while its state defines one
///   (ensured at entry and re-checked by [`advance`](Self::advance));
/// - at most one transition fires per agent per step, the first satisfied
///   in declared order.
pub struct Bfsm {
    states: Vec<State>,
    by_name: FxHashMap<String, StateId>,
    initial: StateId,
    goal_sets: GoalSetMap,
    events: EventRegistry,

    // ── Per-agent state (indexed by AgentId) ──────────────────────────────
    current: Vec<StateId>,
    goals: Vec<Option<Arc<Goal>>>,

    /// Events latched for the step in progress.
    active_events: FxHashSet<String>,
}

impl Bfsm {
    pub fn builder() -> BfsmBuilder {
        BfsmBuilder::new()
    }

    // ── Graph queries ─────────────────────────────────────────────────────

    #[inline]
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Number of agents registered with the machine.
    #[inline]
    pub fn agent_count(&self) -> usize {
        self.current.len()
    }

    /// The designated initial state.
    #[inline]
    pub fn initial_state(&self) -> StateId {
        self.initial
    }

    /// Resolve a state name.  Unknown names are a recoverable failure.
    pub fn state_id(&self, name: &str) -> CrowdResult<StateId> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| CrowdError::StateNotFound(name.to_string()))
    }

    #[inline]
    pub fn state(&self, id: StateId) -> &State {
        &self.states[id.index()]
    }

    pub fn events(&self) -> &EventRegistry {
        &self.events
    }

    /// The loaded goal sets (read-only; for embedding-layer queries).
    pub fn goal_sets(&self) -> &GoalSetMap {
        &self.goal_sets
    }

    // ── Agent registration ───────────────────────────────────────────────

    /// Register a freshly spawned agent and enter it into `state`.
    ///
    /// Agents must be registered in spawn order — `agent` is the next
    /// sequential id.
    pub fn add_agent(&mut self, agent: AgentId, position: Vec2, time: f64, state: StateId) {
        assert_eq!(
            agent.index(),
            self.current.len(),
            "agents must be registered in spawn order"
        );
        let goal = self.states[state.index()].enter(agent, position, time);
        self.current.push(state);
        self.goals.push(Some(goal));
    }

    // ── Step protocol ─────────────────────────────────────────────────────

    /// Latch externally fired events for the coming step.  Call once per
    /// step, before the first [`advance`](Self::advance).
    pub fn begin_step(&mut self) {
        self.active_events = self.events.take_fired();
    }

    /// Per-agent sequential update: ensure a goal, evaluate transitions,
    /// fire at most the first satisfied one.  Returns the (possibly new)
    /// current state.
    pub fn advance(&mut self, agent: &AgentView<'_>, time: f64) -> StateId {
        let i = agent.id.index();
        let cur = self.current[i];

        // (1) An agent whose goal was released (or never assigned) gets one
        // from its current state's selector.
        if self.goals[i].is_none() {
            self.goals[i] =
                Some(self.states[cur.index()].selector.assign(agent.id, agent.position));
        }

        // (2) Evaluate transitions.  Split borrows: conditions need the
        // state mutably while the context reads the latched event set.
        let target = {
            let Bfsm { states, active_events, goals, .. } = self;
            let goal: &Goal = goals[i].as_deref().expect("goal ensured above");
            let ctx = BfsmContext { time, events: active_events };
            states[cur.index()].test_transitions(agent, goal, &ctx)
        };

        match target {
            None => cur,
            Some(next) => {
                // Exit: release the goal; enter: the target's selector
                // assigns a fresh one immediately.
                self.states[cur.index()].leave(agent.id);
                self.goals[i] = None;
                let goal = self.states[next.index()].enter(agent.id, agent.position, time);
                self.goals[i] = Some(goal);
                self.current[i] = next;
                next
            }
        }
    }

    /// Build the agent's preferred velocity: goal-directed base intent run
    /// through the current state's modifier chain.
    ///
    /// `&self` only — safe to call from the parallel resolution phase.
    pub fn pref_velocity(&self, agent: &AgentView<'_>, time_step: f32) -> PrefVelocity {
        let i = agent.id.index();
        let goal = self.goals[i]
            .as_ref()
            .expect("pref_velocity before advance assigned a goal");
        let target = goal.target_point(agent.position);
        let mut pref = PrefVelocity::towards(agent.position, target, agent.pref_speed, time_step);
        self.states[self.current[i].index()].adapt_pref(agent, &mut pref);
        pref
    }

    // ── Agent queries ─────────────────────────────────────────────────────

    /// Current state of `agent`.  Unknown agents are a recoverable failure.
    pub fn current_state(&self, agent: AgentId) -> CrowdResult<StateId> {
        self.current
            .get(agent.index())
            .copied()
            .ok_or(CrowdError::AgentNotFound(agent))
    }

    /// Current goal of `agent`, if one is assigned.
    pub fn current_goal(&self, agent: AgentId) -> Option<Arc<Goal>> {
        self.goals.get(agent.index()).and_then(|g| g.clone())
    }

    // ── Control surface ───────────────────────────────────────────────────

    /// Fire a named external event (latched until the next step).
    pub fn fire_event(&self, name: &str) -> CrowdResult<()> {
        self.events.fire(name)
    }

    /// Assign an external point goal to `agent` through its *current*
    /// state's selector.  Fails (recoverably) if the agent is unknown or
    /// its current state does not use an external selector.  The agent's
    /// active goal is replaced immediately.
    pub fn set_external_goal(&mut self, agent: AgentId, point: Vec2) -> CrowdResult<()> {
        let state = self.current_state(agent)?;
        let store = self.states[state.index()]
            .selector()
            .as_external()
            .ok_or_else(|| {
                CrowdError::NotExternalSelector(self.states[state.index()].name.clone())
            })?;
        let goal = store.set_point(agent, point);
        self.goals[agent.index()] = Some(goal);
        Ok(())
    }

    /// Assign an external point goal for `agent` into the named state's
    /// store, without touching the agent's active goal.  The assignment
    /// takes effect when the agent (re-)enters that state.
    pub fn set_external_goal_in_state(
        &mut self,
        state_name: &str,
        agent: AgentId,
        point: Vec2,
    ) -> CrowdResult<()> {
        let state = self.state_id(state_name)?;
        let store = self.states[state.index()]
            .selector()
            .as_external()
            .ok_or_else(|| CrowdError::NotExternalSelector(state_name.to_string()))?;
        store.set_point(agent, point);
        // If the agent is currently in that state, the new assignment
        // replaces its active goal right away — matching the immediate
        // variant above.
        if self.current.get(agent.index()) == Some(&state) {
            self.goals[agent.index()] = self.states[state.index()]
                .selector()
                .as_external()
                .and_then(|s| s.get(agent));
        }
        Ok(())
    }

    /// `true` if `state_name` exists and uses an external goal selector.
    pub fn is_state_external(&self, state_name: &str) -> CrowdResult<bool> {
        let state = self.state_id(state_name)?;
        Ok(self.states[state.index()].selector().as_external().is_some())
    }
}

// ── BfsmBuilder ──────────────────────────────────────────────────────────────

/// Accumulates the behavior graph, then validates and freezes it.
///
/// All referential-integrity checks happen in [`build`](Self::build):
/// transition targets, goal/goal-set references, event names, and the
/// designated initial state.  Any dangling reference aborts construction —
/// the running machine never encounters one.
#[derive(Default)]
pub struct BfsmBuilder {
    defs: Vec<StateDef>,
    goal_sets: GoalSetMap,
    events: EventRegistry,
    initial: Option<String>,
    errors: Vec<BfsmError>,
}

impl BfsmBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a goal set.  Duplicate set ids are a build error.
    pub fn goal_set(mut self, set: GoalSet) -> Self {
        if self.goal_sets.contains_key(&set.id) {
            self.errors.push(BfsmError::DuplicateGoalSet(set.id));
        } else {
            self.goal_sets.insert(set.id, set);
        }
        self
    }

    /// Declare an external event name.
    pub fn event(mut self, name: impl Into<String>) -> Self {
        self.events.declare(name);
        self
    }

    /// Add a state definition.  Ids are assigned in insertion order.
    pub fn state(mut self, def: StateDef) -> Self {
        self.defs.push(def);
        self
    }

    /// Designate the initial state by name.
    pub fn initial(mut self, name: impl Into<String>) -> Self {
        self.initial = Some(name.into());
        self
    }

    /// Validate and freeze the graph.
    pub fn build(self) -> Result<Bfsm, BfsmError> {
        if let Some(err) = self.errors.into_iter().next() {
            return Err(err);
        }
        if self.defs.is_empty() {
            return Err(BfsmError::NoStates);
        }

        // Name table first, so transitions can resolve forward references.
        let mut by_name: FxHashMap<String, StateId> = FxHashMap::default();
        for (i, def) in self.defs.iter().enumerate() {
            if by_name.insert(def.name.clone(), StateId(i as u16)).is_some() {
                return Err(BfsmError::DuplicateState(def.name.clone()));
            }
        }

        let initial_name = self.initial.ok_or(BfsmError::NoInitialState)?;
        let initial = *by_name
            .get(&initial_name)
            .ok_or(BfsmError::UnknownInitialState(initial_name))?;

        let mut states = Vec::with_capacity(self.defs.len());
        for (i, def) in self.defs.into_iter().enumerate() {
            let mut selector = def.selector;
            selector.resolve(&self.goal_sets)?;

            let mut transitions = Vec::with_capacity(def.transitions.len());
            for (mut condition, target_name) in def.transitions {
                condition.resolve(&self.events)?;
                let target = *by_name.get(&target_name).ok_or_else(|| {
                    BfsmError::UnknownTransitionTarget {
                        from: def.name.clone(),
                        target: target_name.clone(),
                    }
                })?;
                transitions.push(Transition { condition, target });
            }

            states.push(State {
                id: StateId(i as u16),
                name: def.name,
                is_final: def.is_final,
                selector,
                modifiers: def.modifiers,
                transitions,
            });
        }

        Ok(Bfsm {
            states,
            by_name,
            initial,
            goal_sets: self.goal_sets,
            events: self.events,
            current: Vec::new(),
            goals: Vec::new(),
            active_events: FxHashSet::default(),
        })
    }
}
