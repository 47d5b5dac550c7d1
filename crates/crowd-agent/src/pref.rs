//! `PrefVelocity` — an agent's movement intent before collision resolution.
//!
//! Goal selectors produce it, velocity modifiers adapt it in place, and the
//! resolver consumes it.  It is deliberately a separate structure from the
//! agent: modifiers may rewrite the intent freely but never touch agent
//! state.

use crowd_core::Vec2;

/// The preferred direction/speed an agent wants to travel this step, plus
/// the concrete target point it is steering toward.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrefVelocity {
    /// Unit direction of intended travel (`Vec2::ZERO` when holding).
    pub direction: Vec2,
    /// Intended speed in m/s.
    pub speed: f32,
    /// The point being steered toward (the goal's nearest target point).
    pub target: Vec2,
}

impl PrefVelocity {
    /// A "hold position" intent at `target`.
    pub fn hold(target: Vec2) -> Self {
        Self { direction: Vec2::ZERO, speed: 0.0, target }
    }

    /// Intent to travel toward `target` from `from` at `speed`.
    ///
    /// Close enough to the target (within one step at `speed`) the intent
    /// scales down so agents do not orbit their goal.
    pub fn towards(from: Vec2, target: Vec2, speed: f32, time_step: f32) -> Self {
        let offset = target - from;
        let dist = offset.length();
        let step_len = speed * time_step;
        if dist <= crowd_core::geom::EPSILON {
            return Self::hold(target);
        }
        let direction = offset / dist;
        // Final approach: cover exactly the remaining distance this step.
        let speed = if dist < step_len && time_step > 0.0 { dist / time_step } else { speed };
        Self { direction, speed, target }
    }

    /// The resulting velocity vector.
    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.direction * self.speed
    }
}
