//! `crowd-core` — foundational types for the `rust_crowd` pedestrian
//! simulation framework.
//!
//! This crate is a dependency of every other `crowd-*` crate.  It
//! intentionally has no `crowd-*` dependencies and minimal external ones
//! (only `rand` and `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                                |
//! |-------------|---------------------------------------------------------|
//! | [`ids`]     | `AgentId`, `StateId`, `GoalId`, `GoalSetId`, `ClassId`, `ObstacleId` |
//! | [`geom`]    | `Vec2`, `Segment` — the 2-D geometry kernel             |
//! | [`time`]    | `Tick`, `SimClock`, `SimConfig`                         |
//! | [`rng`]     | `SimRng` (deterministic, seed-derived)                  |
//! | [`error`]   | `CrowdError`, `CrowdResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public value types.  |

pub mod error;
pub mod geom;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CrowdError, CrowdResult};
pub use geom::{Segment, Vec2};
pub use ids::{AgentId, ClassId, GoalId, GoalSetId, ObstacleId, StateId};
pub use rng::SimRng;
pub use time::{SimClock, SimConfig, Tick};
