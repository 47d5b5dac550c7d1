//! `crowd-avoid` — per-agent collision-avoiding velocity computation.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                  |
//! |-------------|-----------------------------------------------------------|
//! | [`model`]   | `AvoidanceModel` — the pluggable resolver capability      |
//! | [`line`]    | `OrcaLine` — a half-plane constraint in velocity space    |
//! | [`lp`]      | Incremental half-plane intersection solver + fallback     |
//! | [`orca`]    | `Orca` — optimal reciprocal collision avoidance strategy  |
//! | [`sampled`] | `SampledVo` — deterministic candidate-sampling strategy   |
//!
//! Every strategy is a pure function of read-only inputs (the agent's view,
//! its preferred velocity, neighbor views, nearby obstacles) to a finite
//! output velocity.  No shared state is written, so the simulation loop can
//! fan resolution out across a worker pool, one task per agent.
//!
//! With zero neighbors and zero obstacles every strategy returns the
//! preferred velocity clamped to the agent's max speed.

pub mod line;
pub mod lp;
pub mod model;
pub mod orca;
pub mod sampled;


pub use line::OrcaLine;
pub use model::AvoidanceModel;
pub use orca::Orca;
pub use sampled::SampledVo;
