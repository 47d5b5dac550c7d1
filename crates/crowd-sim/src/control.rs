//! The between-step control surface.
//!
//! These entry points are how an embedding process drives and inspects a
//! running simulation: advance handled by [`Sim::step`], everything else
//! here.  All of them must be called between steps — never concurrently
//! with one in progress (exception: event firing and external-goal
//! assignment are internally locked, so embedder threads may use them
//! while the simulator is idle).
//!
//! Unknown ids and names report recoverable [`CrowdError`]s; the
//! simulation continues unaffected.  Nothing here can fault.

use std::sync::Arc;

use crowd_avoid::AvoidanceModel;
use crowd_bfsm::Goal;
use crowd_core::{
    AgentId, ClassId, CrowdError, CrowdResult, ObstacleId, StateId, Tick, Vec2,
};
use crowd_gen::ExternalGenerator;

use crate::Sim;

impl<M: AvoidanceModel> Sim<M> {
    // ── Time ──────────────────────────────────────────────────────────────

    /// Replace the fixed timestep for subsequent steps.
    pub fn set_time_step(&mut self, time_step: f32) {
        self.config.time_step = time_step;
        self.clock.time_step = time_step;
    }

    pub fn time_step(&self) -> f32 {
        self.clock.time_step
    }

    pub fn current_tick(&self) -> Tick {
        self.clock.current_tick
    }

    /// Elapsed simulated seconds.
    pub fn global_time(&self) -> f64 {
        self.clock.global_time()
    }

    // ── Agent queries ─────────────────────────────────────────────────────

    pub fn agent_count(&self) -> usize {
        self.store.count
    }

    fn checked(&self, agent: AgentId) -> CrowdResult<usize> {
        if self.store.contains(agent) {
            Ok(agent.index())
        } else {
            Err(CrowdError::AgentNotFound(agent))
        }
    }

    pub fn agent_position(&self, agent: AgentId) -> CrowdResult<Vec2> {
        Ok(self.store.position[self.checked(agent)?])
    }

    pub fn agent_velocity(&self, agent: AgentId) -> CrowdResult<Vec2> {
        Ok(self.store.velocity[self.checked(agent)?])
    }

    pub fn agent_orientation(&self, agent: AgentId) -> CrowdResult<Vec2> {
        Ok(self.store.orientation[self.checked(agent)?])
    }

    pub fn agent_radius(&self, agent: AgentId) -> CrowdResult<f32> {
        Ok(self.store.radius[self.checked(agent)?])
    }

    pub fn agent_class(&self, agent: AgentId) -> CrowdResult<ClassId> {
        Ok(self.store.class[self.checked(agent)?])
    }

    pub fn agent_state(&self, agent: AgentId) -> CrowdResult<StateId> {
        Ok(self.store.state[self.checked(agent)?])
    }

    /// Name of the agent's current state.
    pub fn agent_state_name(&self, agent: AgentId) -> CrowdResult<&str> {
        let state = self.agent_state(agent)?;
        Ok(&self.bfsm.state(state).name)
    }

    /// The agent's current goal, if its state has assigned one.
    pub fn agent_goal(&self, agent: AgentId) -> CrowdResult<Option<Arc<Goal>>> {
        self.checked(agent)?;
        Ok(self.bfsm.current_goal(agent))
    }

    // ── Obstacle queries ──────────────────────────────────────────────────

    pub fn obstacle_count(&self) -> usize {
        self.spatial.obstacle_set().len()
    }

    /// Endpoint pair of an obstacle segment.
    pub fn obstacle_endpoints(&self, id: ObstacleId) -> CrowdResult<(Vec2, Vec2)> {
        self.spatial
            .obstacle_set()
            .get(id)
            .map(|o| (o.p0, o.p1))
            .ok_or(CrowdError::ObstacleNotFound(id))
    }

    /// Chain links of an obstacle segment (`ObstacleId::INVALID` at open
    /// ends).
    pub fn obstacle_adjacency(&self, id: ObstacleId) -> CrowdResult<(ObstacleId, ObstacleId)> {
        self.spatial
            .obstacle_set()
            .get(id)
            .map(|o| (o.prev, o.next))
            .ok_or(CrowdError::ObstacleNotFound(id))
    }

    // ── External goals ────────────────────────────────────────────────────

    /// Assign a point goal to `agent` through its current state's external
    /// selector.  Takes effect immediately.
    pub fn set_agent_goal(&mut self, agent: AgentId, point: Vec2) -> CrowdResult<()> {
        self.checked(agent)?;
        self.bfsm.set_external_goal(agent, point)
    }

    /// Assign a point goal for `agent` into the named state's external
    /// selector.  Applies when the agent is (or next is) in that state.
    pub fn set_state_goal_for_agent(
        &mut self,
        state_name: &str,
        agent: AgentId,
        point: Vec2,
    ) -> CrowdResult<()> {
        self.bfsm.set_external_goal_in_state(state_name, agent, point)
    }

    /// Remove `agent`'s externally assigned goal in its current state.
    /// Returns `true` if an assignment existed.
    pub fn clear_agent_goal(&mut self, agent: AgentId) -> CrowdResult<bool> {
        let i = self.checked(agent)?;
        let state = self.store.state[i];
        let store = self
            .bfsm
            .state(state)
            .selector()
            .as_external()
            .ok_or_else(|| CrowdError::NotExternalSelector(self.bfsm.state(state).name.clone()))?;
        Ok(store.clear(agent))
    }

    /// `true` if the named state's goal selector is externally driven.
    pub fn is_state_goal_selector_external(&self, state_name: &str) -> CrowdResult<bool> {
        self.bfsm.is_state_external(state_name)
    }

    // ── External generators ───────────────────────────────────────────────

    fn external_generator_mut(&mut self, name: &str) -> CrowdResult<&mut ExternalGenerator> {
        let source = self
            .sources
            .iter_mut()
            .find(|s| s.name == name)
            .ok_or_else(|| CrowdError::GeneratorNotFound(name.to_string()))?;
        source
            .generator
            .as_external_mut()
            .ok_or_else(|| CrowdError::NotExternalGenerator(name.to_string()))
    }

    /// Push a spawn position (facing +Y) onto the named external generator.
    pub fn push_generator_position(&mut self, name: &str, position: Vec2) -> CrowdResult<()> {
        self.external_generator_mut(name)?.push_position(position);
        Ok(())
    }

    /// Push a spawn position with an explicit orientation.
    pub fn push_generator_slot(
        &mut self,
        name: &str,
        position: Vec2,
        orientation: Vec2,
    ) -> CrowdResult<()> {
        self.external_generator_mut(name)?.push_slot(position, orientation);
        Ok(())
    }

    /// Drop all spawn slots of the named external generator.
    pub fn clear_generator_positions(&mut self, name: &str) -> CrowdResult<()> {
        self.external_generator_mut(name)?.clear_slots();
        Ok(())
    }

    /// Re-arm the named external generator's slot list for the next step.
    pub fn trigger_generator_spawn(&mut self, name: &str) -> CrowdResult<()> {
        self.external_generator_mut(name)?.trigger();
        Ok(())
    }

    // ── Events ────────────────────────────────────────────────────────────

    /// Fire a named external event; conditions see it during the next step.
    pub fn fire_event(&self, name: &str) -> CrowdResult<()> {
        self.bfsm.fire_event(name)
    }

    /// All declared event names, in declaration order.
    pub fn event_names(&self) -> Vec<&str> {
        self.bfsm.events().names()
    }
}
