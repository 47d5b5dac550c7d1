//! The `AvoidanceModel` trait — the resolver capability the simulator is
//! generic over.

use crowd_agent::{AgentView, PrefVelocity};
use crowd_spatial::Obstacle;

/// Pluggable per-agent velocity resolution.
///
/// Implementations turn a preferred velocity into a collision-avoiding one
/// given the agent's local neighborhood.  Two strategies ship with the
/// framework: [`Orca`][crate::Orca] (half-plane linear programming) and
/// [`SampledVo`][crate::SampledVo] (penalty-scored candidate sampling).
///
/// # Contract
///
/// - Pure: no shared mutable state; the same inputs always yield the same
///   output.  The simulation loop calls this from many worker threads at
///   once, hence `Send + Sync`.
/// - Total: every input — including degenerate geometry such as coincident
///   agents — must produce a finite velocity, never an error or a panic.
/// - Bounded: the returned speed never exceeds `agent.max_speed`.
/// - Identity at the boundary: with no neighbors and no obstacles the
///   result is the preferred velocity clamped to max speed.
pub trait AvoidanceModel: Send + Sync + 'static {
    /// Compute the new velocity for `agent`.
    ///
    /// `neighbors` is ordered nearest-first (the spatial index's
    /// deterministic order); `obstacles` holds the segments within the
    /// agent's query range; `time_step` is the fixed integration step.
    fn compute_velocity(
        &self,
        agent:     &AgentView<'_>,
        pref:      &PrefVelocity,
        neighbors: &[AgentView<'_>],
        obstacles: &[&Obstacle],
        time_step: f32,
    ) -> crowd_core::Vec2;
}
