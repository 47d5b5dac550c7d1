//! `crowd-agent` — Structure-of-Arrays agent storage for the `rust_crowd`
//! framework.
//!
//! # Crate layout
//!
//! | Module       | Contents                                               |
//! |--------------|--------------------------------------------------------|
//! | [`profile`]  | `AgentProfile` — per-class spawn template              |
//! | [`store`]    | `AgentStore` — growable SoA arrays, one slot per agent |
//! | [`pref`]     | `PrefVelocity` — the intent structure modifiers adapt  |
//! | [`view`]     | `AgentView` — read-only snapshot for the parallel phase|
//!
//! Agents are identified by `AgentId` — a stable, sequential identifier
//! assigned at spawn and never reused within a run.  The id doubles as the
//! index into every SoA array, and slots are never removed, so the id/index
//! distinction only matters for code holding indices across a spawn
//! boundary (it must re-resolve by id — i.e. keep the id, not a slice
//! position captured before the spawn).

pub mod pref;
pub mod profile;
pub mod store;
pub mod view;

#[cfg(test)]
mod tests;

pub use pref::PrefVelocity;
pub use profile::AgentProfile;
pub use store::AgentStore;
pub use view::AgentView;
