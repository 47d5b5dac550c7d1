//! `crowd-gen` — agent population generators.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                 |
//! |----------------|----------------------------------------------------------|
//! | [`generator`]  | `AgentGenerator` trait, spawn noise, explicit/grid variants |
//! | [`persistent`] | `PersistentGenerator` trait, constant-rate/timed/external variants |
//! | [`select`]     | `ProfileSelector`, `InitialStateSelector`                |
//! | [`source`]     | `SpawnSource`, `InitialGroup` — generator + selector pairings |
//!
//! Generators own no agents; they are position/orientation templates plus
//! trigger bookkeeping.  The simulation loop polls persistent generators
//! once per step (`should_generate` is edge-triggered and consuming) and
//! instantiates `spawn_rate()` agents on a trigger, pulling each agent's
//! profile and starting state from the source's selectors.

pub mod generator;
pub mod persistent;
pub mod select;
pub mod source;

#[cfg(test)]
mod tests;

pub use generator::{AgentGenerator, ExplicitGenerator, RectGridGenerator, SpawnNoise};
pub use persistent::{
    ConstantRateGenerator, ExternalGenerator, PersistentGenerator, TimedGenerator,
};
pub use select::{InitialStateSelector, ProfileSelector};
pub use source::{InitialGroup, SpawnSource};
