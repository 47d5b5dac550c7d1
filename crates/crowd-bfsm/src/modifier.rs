//! Velocity modifiers — composable adjustments to an agent's preferred
//! velocity, applied in sequence before the resolver runs.
//!
//! A modifier is registered against an agent when the agent enters a state
//! that uses it (the per-agent initialization hook) and unregistered on
//! exit.  `adapt` runs in the parallel phase through `&self`: it mutates
//! the preferred-velocity structure in place and must not touch the agent
//! itself — agent state is read-only during that phase.

use crowd_agent::{AgentView, PrefVelocity};
use crowd_core::AgentId;

// ── Trait ─────────────────────────────────────────────────────────────────────

/// A preferred-velocity adjustment hook.
pub trait VelocityModifier: Send + Sync {
    /// Per-agent initialization when `agent` enters the owning state.
    fn register_agent(&mut self, _agent: AgentId) {}

    /// Per-agent teardown when `agent` leaves the owning state.
    fn unregister_agent(&mut self, _agent: AgentId) {}

    /// Adjust `pref` in place for `agent`.
    fn adapt(&self, agent: &AgentView<'_>, pref: &mut PrefVelocity);
}

// ── SpeedCap ─────────────────────────────────────────────────────────────────

/// Scales the preferred speed by a constant factor.
///
/// A factor below 1 models cautious zones (a state agents slow down in);
/// above 1 models urgency, still subject to the resolver's max-speed clamp.
#[derive(Clone, Debug)]
pub struct SpeedCap {
    pub factor: f32,
}

impl SpeedCap {
    pub fn new(factor: f32) -> Self {
        Self { factor }
    }
}

impl VelocityModifier for SpeedCap {
    fn adapt(&self, _agent: &AgentView<'_>, pref: &mut PrefVelocity) {
        pref.speed *= self.factor;
    }
}

// ── TurnLimit ────────────────────────────────────────────────────────────────

/// Blends the preferred direction toward the agent's current facing.
///
/// `smoothing` in `[0, 1]`: 0 leaves the intent untouched, 1 forbids any
/// turn this step.  Keeps goal switches from producing instant 180° pivots.
#[derive(Clone, Debug)]
pub struct TurnLimit {
    pub smoothing: f32,
}

impl TurnLimit {
    pub fn new(smoothing: f32) -> Self {
        Self { smoothing: smoothing.clamp(0.0, 1.0) }
    }
}

impl VelocityModifier for TurnLimit {
    fn adapt(&self, agent: &AgentView<'_>, pref: &mut PrefVelocity) {
        if pref.speed <= 0.0 || pref.direction == crowd_core::Vec2::ZERO {
            return;
        }
        let blended = pref.direction * (1.0 - self.smoothing) + agent.orientation * self.smoothing;
        // Opposed directions can cancel exactly; keep the original intent
        // rather than emitting a zero direction.
        pref.direction = blended.normalize_or(pref.direction);
    }
}
