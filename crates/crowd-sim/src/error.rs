//! Simulation construction errors.

use thiserror::Error;

use crowd_bfsm::BfsmError;

/// Fatal errors raised while assembling a simulation.  Everything here is a
/// configuration error detected before the first step.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("duplicate spawn source name '{0}'")]
    DuplicateSource(String),

    #[error("spawn source '{spawn_source}' selects unknown state '{state}'")]
    UnknownSpawnState { spawn_source: String, state: String },

    #[error("behavior graph error: {0}")]
    Bfsm(#[from] BfsmError),
}

pub type SimResult<T> = Result<T, SimError>;
