//! Framework error type.
//!
//! Sub-crates define their own error enums for build-time (fatal) failures
//! and convert into `CrowdError` where a shared type is convenient.  The
//! runtime-lookup variants here are the *recoverable* failures of the
//! control surface: the operation reports failure and the simulation
//! continues unaffected.

use thiserror::Error;

use crate::{AgentId, GoalId, GoalSetId, ObstacleId};

/// The top-level error type for `crowd-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum CrowdError {
    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("state '{0}' not found")]
    StateNotFound(String),

    #[error("goal set {0} not found")]
    GoalSetNotFound(GoalSetId),

    #[error("goal {goal} not found in goal set {set}")]
    GoalNotFound { goal: GoalId, set: GoalSetId },

    #[error("obstacle {0} not found")]
    ObstacleNotFound(ObstacleId),

    #[error("generator '{0}' not found")]
    GeneratorNotFound(String),

    #[error("generator '{0}' is not externally driven")]
    NotExternalGenerator(String),

    #[error("event '{0}' not registered")]
    EventNotFound(String),

    #[error("state '{0}' does not use an external goal selector")]
    NotExternalSelector(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for all `crowd-*` crates.
pub type CrowdResult<T> = Result<T, CrowdError>;
