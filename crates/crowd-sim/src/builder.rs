//! Fluent builder for constructing a [`Sim`].

use crowd_agent::AgentStore;
use crowd_avoid::AvoidanceModel;
use crowd_bfsm::Bfsm;
use crowd_core::{SimConfig, SimRng, Vec2};
use crowd_gen::{InitialGroup, SpawnSource};
use crowd_spatial::{ObstacleSet, SpatialIndex};

use crate::{Sim, SimError, SimResult};

/// Fluent builder for [`Sim<M>`].
///
/// # Required inputs
///
/// - [`SimConfig`] — timestep, seed, worker count
/// - [`Bfsm`] — the validated behavior graph (from [`Bfsm::builder`])
/// - `M: AvoidanceModel` — the resolution strategy
///
/// # Optional inputs
///
/// | Method             | Default                             |
/// |--------------------|-------------------------------------|
/// | `.obstacles(set)`  | No obstacles (open scene)           |
/// | `.initial_group(g)`| Empty starting population           |
/// | `.source(s)`       | No runtime spawning                 |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(config, bfsm, Orca::default())
///     .obstacles(obstacles)
///     .initial_group(group)
///     .source(gate_source)
///     .build()?;
/// sim.run_steps(1_000, &mut NoopObserver);
/// ```
pub struct SimBuilder<M: AvoidanceModel> {
    config: SimConfig,
    bfsm: Bfsm,
    model: M,
    obstacles: Option<ObstacleSet>,
    initial_groups: Vec<InitialGroup>,
    sources: Vec<SpawnSource>,
}

impl<M: AvoidanceModel> SimBuilder<M> {
    pub fn new(config: SimConfig, bfsm: Bfsm, model: M) -> Self {
        Self {
            config,
            bfsm,
            model,
            obstacles: None,
            initial_groups: Vec::new(),
            sources: Vec::new(),
        }
    }

    /// Supply the scene's static obstacles.
    pub fn obstacles(mut self, obstacles: ObstacleSet) -> Self {
        self.obstacles = Some(obstacles);
        self
    }

    /// Add a bulk initial-population group, instantiated at build time.
    pub fn initial_group(mut self, group: InitialGroup) -> Self {
        self.initial_groups.push(group);
        self
    }

    /// Add a named runtime spawn source.
    pub fn source(mut self, source: SpawnSource) -> Self {
        self.sources.push(source);
        self
    }

    /// Validate, spawn the initial population, and return a ready [`Sim`].
    pub fn build(self) -> SimResult<Sim<M>> {
        let mut bfsm = self.bfsm;

        // ── Referential integrity of spawn-state selectors ────────────────
        //
        // Every state name a selector can produce must exist in the graph;
        // the spawn phase relies on this and treats a miss as a bug.
        for group in &self.initial_groups {
            for name in group.states.possible_states() {
                if bfsm.state_id(name).is_err() {
                    return Err(SimError::UnknownSpawnState {
                        spawn_source: "<initial group>".to_string(),
                        state: name.to_string(),
                    });
                }
            }
        }
        for source in &self.sources {
            for name in source.states.possible_states() {
                if bfsm.state_id(name).is_err() {
                    return Err(SimError::UnknownSpawnState {
                        spawn_source: source.name.clone(),
                        state: name.to_string(),
                    });
                }
            }
        }
        for (i, source) in self.sources.iter().enumerate() {
            if self.sources[..i].iter().any(|s| s.name == source.name) {
                return Err(SimError::DuplicateSource(source.name.clone()));
            }
        }
        if self.config.time_step <= 0.0 {
            return Err(SimError::Config(format!(
                "time_step must be positive, got {}",
                self.config.time_step
            )));
        }

        // ── Initial population ────────────────────────────────────────────
        let mut rng = SimRng::new(self.config.seed);
        let mut store = AgentStore::new();

        for group in &self.initial_groups {
            let count = group.generator.agent_count();
            for i in 0..count {
                let profile = group.profiles.pick(&mut rng);
                let agent = store.spawn(&profile);
                let slot = agent.index();
                store.position[slot] = group.generator.position(i, &mut rng);
                store.orientation[slot] = group.generator.orientation(i, &mut rng);
                store.velocity[slot] = Vec2::ZERO;

                let state = bfsm
                    .state_id(group.states.pick(&mut rng))
                    .expect("validated above");
                bfsm.add_agent(agent, store.position[slot], 0.0, state);
                store.state[slot] = state;
            }
        }

        // ── Spatial index ─────────────────────────────────────────────────
        //
        // Primed immediately so control-surface and visualization queries
        // work before the first step.
        let mut spatial = SpatialIndex::new(self.obstacles.unwrap_or_else(ObstacleSet::empty));
        spatial.rebuild(&store);

        // ── Worker pool ───────────────────────────────────────────────────
        #[cfg(feature = "parallel")]
        let pool = match self.config.num_threads {
            None => None,
            Some(n) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| SimError::Config(format!("worker pool: {e}")))?,
            ),
        };

        Ok(Sim {
            clock: self.config.make_clock(),
            config: self.config,
            store,
            bfsm,
            spatial,
            model: self.model,
            sources: self.sources,
            rng,
            #[cfg(feature = "parallel")]
            pool,
        })
    }
}
