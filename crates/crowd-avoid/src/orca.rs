//! Optimal reciprocal collision avoidance.
//!
//! Each neighbor induces a truncated velocity-obstacle cone in relative
//! velocity space; the minimal correction `u` out of the cone, split
//! between the pair by responsibility, yields one half-plane constraint per
//! neighbor.  Nearby obstacle segments contribute constraints the same way,
//! except the obstacle never moves and never takes a share of the
//! responsibility.  The constraint set is then solved by the incremental
//! program in [`lp`][crate::lp].
//!
//! Responsibility: equal-priority pairs split the correction 50/50 (the
//! reciprocity that prevents oscillation); across priorities the
//! higher-priority agent takes 0.25 and the lower 0.75, so important
//! traffic holds course and the rest flows around it.

use crowd_agent::{AgentView, PrefVelocity};
use crowd_core::Vec2;
use crowd_spatial::Obstacle;

use crate::{AvoidanceModel, OrcaLine, lp};

const EPSILON: f32 = 1e-5;

/// The ORCA resolution strategy.
#[derive(Clone, Debug)]
pub struct Orca {
    /// Look-ahead window for agent-agent avoidance, seconds.  Larger values
    /// react earlier and turn more gently.
    pub time_horizon: f32,
    /// Look-ahead window for wall avoidance, seconds.  Kept shorter than
    /// the agent horizon so agents walk close past walls instead of
    /// shying away.
    pub time_horizon_obst: f32,
}

impl Default for Orca {
    fn default() -> Self {
        Self { time_horizon: 2.0, time_horizon_obst: 1.0 }
    }
}

impl Orca {
    pub fn new(time_horizon: f32, time_horizon_obst: f32) -> Self {
        Self { time_horizon, time_horizon_obst }
    }

    /// Share of the required correction this agent takes against `other`.
    fn responsibility(agent: &AgentView<'_>, other: &AgentView<'_>) -> f32 {
        let diff = agent.priority - other.priority;
        if diff.abs() <= f32::EPSILON {
            0.5
        } else if diff > 0.0 {
            0.25 // outranks the other: hold course
        } else {
            0.75 // outranked: step aside
        }
    }

    /// Half-plane induced by a moving neighbor disc.
    ///
    /// `rel_pos` points from the agent to the disc center, `vel_other` is the
    /// disc's velocity, `combined_r` the sum of radii.  `inv_dt` is used as
    /// the horizon when the discs already overlap, forcing separation within
    /// one step.
    fn vo_half_plane(
        vel_self:   Vec2,
        vel_other:  Vec2,
        rel_pos:    Vec2,
        combined_r: f32,
        horizon:    f32,
        inv_dt:     f32,
        share:      f32,
    ) -> OrcaLine {
        let rel_vel = vel_self - vel_other;
        let dist_sq = rel_pos.length_sq();
        let combined_r_sq = combined_r * combined_r;

        let u: Vec2;
        let dir: Vec2;

        if dist_sq > combined_r_sq {
            // Not overlapping: truncated cone with the cap at t = horizon.
            let inv_h = 1.0 / horizon;
            let w = rel_vel - rel_pos * inv_h;
            let w_sq = w.length_sq();
            let dot = w.dot(rel_pos);

            if dot < 0.0 && dot * dot > combined_r_sq * w_sq {
                // Closest exit is through the circular cap.
                let w_len = w_sq.sqrt();
                let unit_w = if w_len > EPSILON { w / w_len } else { Vec2::new(1.0, 0.0) };
                dir = Vec2::new(unit_w.y, -unit_w.x);
                u = unit_w * (combined_r * inv_h - w_len);
            } else {
                // Closest exit is through one of the cone legs.
                let leg = (dist_sq - combined_r_sq).max(0.0).sqrt();
                if rel_pos.det(w) > 0.0 {
                    dir = Vec2::new(
                        rel_pos.x * leg - rel_pos.y * combined_r,
                        rel_pos.x * combined_r + rel_pos.y * leg,
                    ) / dist_sq;
                } else {
                    dir = -Vec2::new(
                        rel_pos.x * leg + rel_pos.y * combined_r,
                        -rel_pos.x * combined_r + rel_pos.y * leg,
                    ) / dist_sq;
                }
                u = dir * rel_vel.dot(dir) - rel_vel;
            }
        } else {
            // Already overlapping: resolve within a single step.
            let w = rel_vel - rel_pos * inv_dt;
            let w_len = w.length();
            let unit_w = if w_len > EPSILON {
                w / w_len
            } else if dist_sq > EPSILON * EPSILON {
                // Push directly away from the other center.
                -rel_pos.normalize()
            } else {
                // Coincident centers: arbitrary but fixed escape direction.
                Vec2::new(1.0, 0.0)
            };
            dir = Vec2::new(unit_w.y, -unit_w.x);
            u = unit_w * (combined_r * inv_dt - w_len);
        }

        OrcaLine::new(vel_self + u * share, dir)
    }

    fn agent_line(&self, agent: &AgentView<'_>, other: &AgentView<'_>, inv_dt: f32) -> OrcaLine {
        Self::vo_half_plane(
            agent.velocity,
            other.velocity,
            other.position - agent.position,
            agent.radius + other.radius,
            self.time_horizon,
            inv_dt,
            Self::responsibility(agent, other),
        )
    }

    /// A wall segment is avoided as a stationary disc at its nearest point:
    /// zero velocity, and the agent carries the full correction.
    fn obstacle_line(&self, agent: &AgentView<'_>, obstacle: &Obstacle, inv_dt: f32) -> OrcaLine {
        let nearest = obstacle.segment().nearest_point(agent.position);
        Self::vo_half_plane(
            agent.velocity,
            Vec2::ZERO,
            nearest - agent.position,
            agent.radius,
            self.time_horizon_obst,
            inv_dt,
            1.0,
        )
    }
}

impl AvoidanceModel for Orca {
    fn compute_velocity(
        &self,
        agent:     &AgentView<'_>,
        pref:      &PrefVelocity,
        neighbors: &[AgentView<'_>],
        obstacles: &[&Obstacle],
        time_step: f32,
    ) -> Vec2 {
        let pref_vel = pref.velocity().clamp_length(agent.max_speed);
        if neighbors.is_empty() && obstacles.is_empty() {
            return pref_vel;
        }

        let inv_dt = if time_step > 0.0 { 1.0 / time_step } else { 1.0 };
        let mut lines = Vec::with_capacity(obstacles.len() + neighbors.len());

        for obstacle in obstacles {
            lines.push(self.obstacle_line(agent, obstacle, inv_dt));
        }
        let num_obst = lines.len();

        for other in neighbors {
            lines.push(self.agent_line(agent, other, inv_dt));
        }

        let mut result = pref_vel;
        let fail = lp::solve_half_planes(&lines, agent.max_speed, pref_vel, false, &mut result);
        if fail < lines.len() {
            lp::minimize_violation(&lines, num_obst, fail, agent.max_speed, &mut result);
        }
        result
    }
}
