//! `AgentProfile` — the spawn-time template for an agent's fixed parameters.
//!
//! Profiles are produced by the (external) scene-loading layer, selected per
//! spawn by a profile selector, and copied into the store's SoA arrays.  The
//! defaults are the conventional pedestrian values: 0.19 m body radius,
//! 1.34 m/s comfortable walking speed.

use crowd_core::ClassId;

/// Fixed per-agent parameters applied at spawn time.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentProfile {
    /// Body radius in metres.
    pub radius: f32,

    /// Comfortable walking speed in m/s — the magnitude goal selectors use
    /// when building the preferred velocity.
    pub pref_speed: f32,

    /// Hard speed cap in m/s.  The resolver never outputs a faster velocity.
    pub max_speed: f32,

    /// Fastest the agent can turn, in radians per second.
    pub max_angular_speed: f32,

    /// Upper bound on neighbors considered by the resolver.
    pub max_neighbors: usize,

    /// Radius of the neighbor query in metres.
    pub neighbor_dist: f32,

    /// Agent class tag.  Classes group agents for queries and external
    /// consumers; avoidance behavior between classes is governed by
    /// `priority`.
    pub class: ClassId,

    /// Avoidance priority.  When two agents of different priority interact,
    /// the higher-priority agent takes the smaller share of the avoidance
    /// responsibility.
    pub priority: f32,
}

impl Default for AgentProfile {
    fn default() -> Self {
        Self {
            radius:            0.19,
            pref_speed:        1.34,
            max_speed:         2.0,
            max_angular_speed: std::f32::consts::PI,
            max_neighbors:     10,
            neighbor_dist:     5.0,
            class:             ClassId(0),
            priority:          0.0,
        }
    }
}
