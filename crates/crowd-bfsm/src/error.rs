//! BFSM construction and validation errors.
//!
//! Everything here is a *configuration* error: raised while the graph is
//! being built and validated, before the first simulation step.  Runtime
//! lookups (control surface) use the recoverable `CrowdError` variants
//! instead.

use thiserror::Error;

use crowd_core::{GoalId, GoalSetId};

/// Errors produced while building or validating a behavior graph.
#[derive(Debug, Error)]
pub enum BfsmError {
    #[error("behavior graph has no states")]
    NoStates,

    #[error("no initial state was designated")]
    NoInitialState,

    #[error("duplicate state name '{0}'")]
    DuplicateState(String),

    #[error("transition from '{from}' targets unknown state '{target}'")]
    UnknownTransitionTarget { from: String, target: String },

    #[error("initial state '{0}' does not exist")]
    UnknownInitialState(String),

    #[error("duplicate goal set {0}")]
    DuplicateGoalSet(GoalSetId),

    #[error("duplicate goal {goal} in goal set {set}")]
    DuplicateGoal { goal: GoalId, set: GoalSetId },

    #[error("goal selector references unknown goal set {0}")]
    UnknownGoalSet(GoalSetId),

    #[error("goal selector references unknown goal {goal} in goal set {set}")]
    UnknownGoal { goal: GoalId, set: GoalSetId },

    #[error("condition references unregistered event '{0}'")]
    UnknownEvent(String),
}
