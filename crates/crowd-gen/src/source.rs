//! Generator/selector pairings consumed by the simulation loop.

use crate::{AgentGenerator, InitialStateSelector, PersistentGenerator, ProfileSelector};

/// A named runtime spawn source: a persistent generator plus the selectors
/// that give each spawned agent its profile and starting state.
///
/// The name is the handle the control surface uses to push positions and
/// trigger spawns from outside the simulator.
pub struct SpawnSource {
    pub name: String,
    pub generator: Box<dyn PersistentGenerator>,
    pub profiles: ProfileSelector,
    pub states: InitialStateSelector,
}

impl SpawnSource {
    pub fn new(
        name: impl Into<String>,
        generator: impl PersistentGenerator + 'static,
        profiles: ProfileSelector,
        states: InitialStateSelector,
    ) -> Self {
        Self {
            name: name.into(),
            generator: Box::new(generator),
            profiles,
            states,
        }
    }
}

/// A bulk initial-population group, instantiated once when the simulation
/// is built (before the first step).
pub struct InitialGroup {
    pub generator: Box<dyn AgentGenerator>,
    pub profiles: ProfileSelector,
    pub states: InitialStateSelector,
}

impl InitialGroup {
    pub fn new(
        generator: impl AgentGenerator + 'static,
        profiles: ProfileSelector,
        states: InitialStateSelector,
    ) -> Self {
        Self {
            generator: Box::new(generator),
            profiles,
            states,
        }
    }
}
