//! `crowd-sim` — the per-timestep simulation loop.
//!
//! # Crate layout
//!
//! | Module       | Contents                                               |
//! |--------------|--------------------------------------------------------|
//! | [`sim`]      | `Sim<M>` — owns all state, drives the step pipeline    |
//! | [`builder`]  | `SimBuilder` — validation + initial population         |
//! | [`control`]  | Between-step control surface (queries, external goals, external spawns, events) |
//! | [`observer`] | `StepObserver` / `NoopObserver`                        |
//! | [`error`]    | `SimError`                                             |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                  |
//! |------------|---------------------------------------------------------|
//! | `parallel` | Velocity resolution and integration fan out over Rayon. |
//!
//! The `parallel` feature changes wall-clock behavior only: the resolution
//! phase collects results in agent order and the sequential behavior pass
//! runs before it, so a run's trajectory is byte-identical for any worker
//! count, parallel or not.

pub mod builder;
pub mod control;
pub mod error;
pub mod observer;
pub mod sim;


pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, StepObserver};
pub use sim::Sim;
