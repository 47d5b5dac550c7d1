//! The `Sim` struct and its step pipeline.

use crowd_agent::AgentStore;
use crowd_avoid::AvoidanceModel;
use crowd_bfsm::Bfsm;
use crowd_core::{AgentId, SimClock, SimConfig, SimRng, Vec2};
use crowd_gen::SpawnSource;
use crowd_spatial::SpatialIndex;

use crate::StepObserver;

/// The main simulation runner.
///
/// `Sim<M>` exclusively owns the agent store and drives the step pipeline:
///
/// 1. **Spawn** (sequential): poll every spawn source; for each fired
///    trigger, instantiate the batch — profile from the profile selector,
///    position/orientation from the generator (noise included), starting
///    state from the state selector, registration with the behavior
///    machine (which registers the agent with the state's velocity
///    modifiers).
/// 2. **Index rebuild**: bulk-load the spatial index over *all* current
///    agents — agents spawned in step 1 are visible to this step's
///    queries.
/// 3. **Behavior advance** (sequential, ascending agent id): latch events,
///    ensure goals, evaluate transitions — at most one fires per agent.
/// 4. **Resolve** (parallel with the `parallel` feature): per agent, build
///    the preferred velocity (goal direction through the modifier chain),
///    query neighbors/obstacles, and run the avoidance model.  Workers
///    read shared state and write nothing; results land in an agent-order
///    buffer.
/// 5. **Integrate** (parallel): write back velocities, advance positions,
///    turn orientations toward the travel direction under the per-agent
///    angular speed limit.
/// 6. Advance the clock.
///
/// Phases 4 and 5 are separated by a barrier: no agent integrates until
/// every agent's velocity is resolved.  A step is not preemptible — it
/// either completes or the process is considered failed.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<M: AvoidanceModel> {
    /// Global configuration (timestep, seed, worker count).
    pub config: SimConfig,

    /// Step counter and simulated-time mapping.
    pub clock: SimClock,

    /// All agent state (SoA).  Exclusively owned; external readers go
    /// through [`agents`](Self::agents) or the control surface.
    pub(crate) store: AgentStore,

    /// The behavior machine.
    pub(crate) bfsm: Bfsm,

    /// Obstacles + per-step agent index.
    pub(crate) spatial: SpatialIndex,

    /// The avoidance strategy.
    pub(crate) model: M,

    /// Runtime spawn sources, polled each step.
    pub(crate) sources: Vec<SpawnSource>,

    /// The run's deterministic RNG (spawn phase only).
    pub(crate) rng: SimRng,

    /// Dedicated worker pool when `config.num_threads` is set; otherwise
    /// the global Rayon pool.
    #[cfg(feature = "parallel")]
    pub(crate) pool: Option<rayon::ThreadPool>,
}

impl<M: AvoidanceModel> Sim<M> {
    // ── Public API ────────────────────────────────────────────────────────

    /// Read-only view of the agent store (for visualization layers).
    pub fn agents(&self) -> &AgentStore {
        &self.store
    }

    /// The behavior machine (read-only).
    pub fn bfsm(&self) -> &Bfsm {
        &self.bfsm
    }

    /// The spatial index (read-only; obstacles + last rebuilt agent tree).
    pub fn spatial(&self) -> &SpatialIndex {
        &self.spatial
    }

    /// Advance the simulation by one full step.
    pub fn step<O: StepObserver>(&mut self, observer: &mut O) {
        let tick = self.clock.current_tick;
        observer.on_step_start(tick);

        // ── Phase 1: spawn ────────────────────────────────────────────────
        self.spawn_phase(observer);

        // ── Phase 2: rebuild the spatial index ───────────────────────────
        //
        // Includes this step's spawns: the agent set visible to phase 4 is
        // exactly the set that exists right now.
        self.spatial.rebuild(&self.store);

        // ── Phase 3: behavior advance (sequential, ascending id) ─────────
        let time = self.clock.global_time();
        self.bfsm.begin_step();
        for id in 0..self.store.count as u32 {
            let agent = AgentId(id);
            let state = {
                let view = self.store.view(agent);
                self.bfsm.advance(&view, time)
            };
            self.store.state[agent.index()] = state;
        }

        // ── Phase 4: resolve velocities (parallel fan-out, barrier) ──────
        let new_velocities = self.resolve_phase();

        // ── Phase 5: integrate (parallel, per-agent writes only) ─────────
        self.integrate_phase(&new_velocities);

        // ── Phase 6: advance time ────────────────────────────────────────
        observer.on_step_end(tick, self.store.count);
        self.clock.advance();
    }

    /// Run `n` steps.
    pub fn run_steps<O: StepObserver>(&mut self, n: u64, observer: &mut O) {
        for _ in 0..n {
            self.step(observer);
        }
    }

    // ── Phase 1: spawning ─────────────────────────────────────────────────

    fn spawn_phase<O: StepObserver>(&mut self, observer: &mut O) {
        let dt = self.clock.time_step;
        let time = self.clock.global_time();
        let tick = self.clock.current_tick;

        for si in 0..self.sources.len() {
            if !self.sources[si].generator.should_generate(dt) {
                continue;
            }
            let count = self.sources[si].generator.spawn_rate();

            for i in 0..count {
                let profile = self.sources[si].profiles.pick(&mut self.rng);
                let agent = self.store.spawn(&profile);
                let slot = agent.index();

                self.store.position[slot] = self.sources[si].generator.position(i, &mut self.rng);
                self.store.orientation[slot] =
                    self.sources[si].generator.orientation(i, &mut self.rng);
                self.store.velocity[slot] = Vec2::ZERO;

                let state = {
                    let name = self.sources[si].states.pick(&mut self.rng);
                    // Selector names were validated against the graph at
                    // build time; a miss here is a builder bug.
                    self.bfsm
                        .state_id(name)
                        .expect("spawn state validated at build")
                };
                self.bfsm
                    .add_agent(agent, self.store.position[slot], time, state);
                self.store.state[slot] = state;
            }

            if count > 0 {
                observer.on_spawn(tick, &self.sources[si].name, count);
            }
        }
    }

    // ── Phase 4: resolution ───────────────────────────────────────────────

    fn resolve_phase(&self) -> Vec<Vec2> {
        // Explicit shared borrows: everything the workers touch is &self.
        let store = &self.store;
        let spatial = &self.spatial;
        let bfsm = &self.bfsm;
        let model = &self.model;
        let dt = self.clock.time_step;

        let compute = |agent: AgentId| -> Vec2 {
            let view = store.view(agent);
            let pref = bfsm.pref_velocity(&view, dt);
            let neighbors: Vec<_> = spatial
                .neighbors(store, agent)
                .iter()
                .map(|n| store.view(n.id))
                .collect();
            let obstacles = spatial.obstacles_near(view.position, view.neighbor_dist);
            model.compute_velocity(&view, &pref, &neighbors, &obstacles, dt)
        };

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            let work =
                || (0..store.count as u32).into_par_iter().map(|i| compute(AgentId(i))).collect();
            match &self.pool {
                Some(pool) => pool.install(work),
                None => work(),
            }
        }

        #[cfg(not(feature = "parallel"))]
        {
            store.agent_ids().map(compute).collect()
        }
    }

    // ── Phase 5: integration ──────────────────────────────────────────────

    fn integrate_phase(&mut self, new_velocities: &[Vec2]) {
        let dt = self.clock.time_step;
        let store = &mut self.store;

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            let positions = &mut store.position;
            let orientations = &mut store.orientation;
            let velocities = &mut store.velocity;
            let max_angular = &store.max_angular_speed;
            let work = || {
                positions
                    .par_iter_mut()
                    .zip(orientations.par_iter_mut())
                    .zip(velocities.par_iter_mut())
                    .zip(new_velocities.par_iter())
                    .zip(max_angular.par_iter())
                    .for_each(|((((pos, orient), vel), &new_vel), &max_ang)| {
                        *vel = new_vel;
                        *pos += new_vel * dt;
                        *orient = turn_towards(*orient, new_vel, max_ang * dt);
                    });
            };
            match &self.pool {
                Some(pool) => pool.install(work),
                None => work(),
            }
        }

        #[cfg(not(feature = "parallel"))]
        {
            for i in 0..store.count {
                let new_vel = new_velocities[i];
                store.velocity[i] = new_vel;
                store.position[i] += new_vel * dt;
                store.orientation[i] =
                    turn_towards(store.orientation[i], new_vel, store.max_angular_speed[i] * dt);
            }
        }
    }
}

/// Rotate `orient` toward the direction of `velocity`, turning at most
/// `max_turn` radians.  A (near-)zero velocity keeps the current facing.
fn turn_towards(orient: Vec2, velocity: Vec2, max_turn: f32) -> Vec2 {
    let target = velocity.normalize();
    if target == Vec2::ZERO {
        return orient;
    }
    let angle = orient.det(target).atan2(orient.dot(target));
    orient.rotated(angle.clamp(-max_turn, max_turn))
}
