//! Penalty-scored candidate sampling.
//!
//! A simpler, derivative-free alternative to the half-plane program: lay a
//! fixed polar grid of candidate velocities around the agent, score each by
//! (a) deviation from the preferred velocity and (b) urgency of the soonest
//! predicted collision along it, and keep the cheapest.  The grid is fixed,
//! so the strategy is deterministic; ties keep the earlier candidate, and
//! the preferred velocity itself is always candidate zero.
//!
//! Cheaper per constraint and more forgiving in pathological geometry than
//! the LP — at the cost of a coarser result.  Useful as the resolver for
//! low-fidelity background crowds.

use crowd_agent::{AgentView, PrefVelocity};
use crowd_core::Vec2;
use crowd_spatial::Obstacle;

use crate::AvoidanceModel;

const EPSILON: f32 = 1e-6;

/// The sampling resolution strategy.
#[derive(Clone, Debug)]
pub struct SampledVo {
    /// Number of speed rings in the candidate grid.
    pub rings: usize,
    /// Number of directions per ring.
    pub spokes: usize,
    /// Collision look-ahead window, seconds.
    pub time_horizon: f32,
    /// Weight of deviation from the preferred velocity.
    pub w_pref: f32,
    /// Weight of collision urgency.
    pub w_collision: f32,
}

impl Default for SampledVo {
    fn default() -> Self {
        Self {
            rings: 4,
            spokes: 16,
            time_horizon: 2.5,
            w_pref: 1.0,
            w_collision: 10.0,
        }
    }
}

impl SampledVo {
    /// Time until a disc of radius `combined_r` at `rel_pos` (relative to the
    /// agent) is hit when the relative velocity is `rel_vel`, or `None` if
    /// the approach never closes within the radius.
    ///
    /// Already-overlapping discs report an immediate collision.
    fn time_to_collision(rel_pos: Vec2, rel_vel: Vec2, combined_r: f32) -> Option<f32> {
        // Separation over time: |rel_pos − rel_vel·t|² = combined_r².
        let c = rel_pos.length_sq() - combined_r * combined_r;
        if c <= 0.0 {
            return Some(0.0);
        }
        let a = rel_vel.length_sq();
        if a < EPSILON {
            return None;
        }
        let b = rel_pos.dot(rel_vel);
        if b <= 0.0 {
            return None; // moving apart
        }
        let disc = b * b - a * c;
        if disc < 0.0 {
            return None; // closest approach stays outside the radius
        }
        Some((b - disc.sqrt()) / a)
    }

    /// Soonest predicted collision along `candidate`, in seconds.
    fn soonest_collision(
        &self,
        agent:     &AgentView<'_>,
        candidate: Vec2,
        neighbors: &[AgentView<'_>],
        obstacles: &[&Obstacle],
    ) -> Option<f32> {
        let mut soonest: Option<f32> = None;
        let mut consider = |t: Option<f32>| {
            if let Some(t) = t {
                if t < self.time_horizon && soonest.is_none_or(|s| t < s) {
                    soonest = Some(t);
                }
            }
        };

        for other in neighbors {
            consider(Self::time_to_collision(
                other.position - agent.position,
                candidate - other.velocity,
                agent.radius + other.radius,
            ));
        }
        for obstacle in obstacles {
            // Stationary disc at the wall's nearest point, like the LP
            // strategy's obstacle treatment.
            let nearest = obstacle.segment().nearest_point(agent.position);
            consider(Self::time_to_collision(
                nearest - agent.position,
                candidate,
                agent.radius,
            ));
        }
        soonest
    }

    fn penalty(
        &self,
        agent:     &AgentView<'_>,
        pref_vel:  Vec2,
        candidate: Vec2,
        neighbors: &[AgentView<'_>],
        obstacles: &[&Obstacle],
    ) -> f32 {
        let deviation = (candidate - pref_vel).length();
        let urgency = match self.soonest_collision(agent, candidate, neighbors, obstacles) {
            Some(t) => 1.0 - t / self.time_horizon,
            None => 0.0,
        };
        self.w_pref * deviation + self.w_collision * urgency
    }
}

impl AvoidanceModel for SampledVo {
    fn compute_velocity(
        &self,
        agent:     &AgentView<'_>,
        pref:      &PrefVelocity,
        neighbors: &[AgentView<'_>],
        obstacles: &[&Obstacle],
        _time_step: f32,
    ) -> Vec2 {
        let pref_vel = pref.velocity().clamp_length(agent.max_speed);
        if neighbors.is_empty() && obstacles.is_empty() {
            return pref_vel;
        }

        // Candidate zero is the preferred velocity; a strict `<` below means
        // it wins all ties, so an unobstructed agent never deviates.
        let mut best = pref_vel;
        let mut best_penalty = self.penalty(agent, pref_vel, pref_vel, neighbors, obstacles);

        let mut consider = |cand: Vec2, this: &Self| {
            let p = this.penalty(agent, pref_vel, cand, neighbors, obstacles);
            if p < best_penalty {
                best_penalty = p;
                best = cand;
            }
        };

        consider(Vec2::ZERO, self); // standing still is always a candidate

        for ring in 1..=self.rings {
            let speed = agent.max_speed * ring as f32 / self.rings as f32;
            for spoke in 0..self.spokes {
                let angle = std::f32::consts::TAU * spoke as f32 / self.spokes as f32;
                consider(Vec2::new(angle.cos(), angle.sin()) * speed, self);
            }
        }

        best
    }
}
