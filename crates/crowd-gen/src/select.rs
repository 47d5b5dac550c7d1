//! Spawn-time selectors: which profile and which starting state a new
//! agent receives.

use std::sync::Arc;

use crowd_agent::AgentProfile;
use crowd_core::SimRng;

// ── ProfileSelector ──────────────────────────────────────────────────────────

/// Picks the [`AgentProfile`] for each spawned agent.
pub enum ProfileSelector {
    /// Every agent gets the same profile.
    Const(Arc<AgentProfile>),
    /// Weighted random choice among profiles (weights need not sum to 1).
    Weighted(Vec<(Arc<AgentProfile>, f32)>),
}

impl ProfileSelector {
    pub fn constant(profile: AgentProfile) -> Self {
        Self::Const(Arc::new(profile))
    }

    pub fn pick(&self, rng: &mut SimRng) -> Arc<AgentProfile> {
        match self {
            Self::Const(p) => Arc::clone(p),
            Self::Weighted(choices) => {
                let total: f32 = choices.iter().map(|(_, w)| w).sum();
                let mut roll = rng.gen_range(0.0..total.max(f32::MIN_POSITIVE));
                for (profile, weight) in choices {
                    if roll < *weight {
                        return Arc::clone(profile);
                    }
                    roll -= weight;
                }
                // Floating-point remainder lands on the last choice.
                Arc::clone(&choices.last().expect("weighted selector has choices").0)
            }
        }
    }
}

// ── InitialStateSelector ─────────────────────────────────────────────────────

/// Picks the BFSM state a spawned agent starts in, by state name.
///
/// Names are validated against the behavior graph when the simulation is
/// built — a dangling name is a fatal configuration error, never a spawn
/// failure.
pub enum InitialStateSelector {
    Const(String),
    Weighted(Vec<(String, f32)>),
}

impl InitialStateSelector {
    pub fn constant(name: impl Into<String>) -> Self {
        Self::Const(name.into())
    }

    /// All state names this selector can produce (for validation).
    pub fn possible_states(&self) -> Vec<&str> {
        match self {
            Self::Const(name) => vec![name.as_str()],
            Self::Weighted(choices) => choices.iter().map(|(n, _)| n.as_str()).collect(),
        }
    }

    pub fn pick(&self, rng: &mut SimRng) -> &str {
        match self {
            Self::Const(name) => name,
            Self::Weighted(choices) => {
                let total: f32 = choices.iter().map(|(_, w)| w).sum();
                let mut roll = rng.gen_range(0.0..total.max(f32::MIN_POSITIVE));
                for (name, weight) in choices {
                    if roll < *weight {
                        return name;
                    }
                    roll -= weight;
                }
                choices.last().expect("weighted selector has choices").0.as_str()
            }
        }
    }
}
