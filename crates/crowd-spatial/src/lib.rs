//! `crowd-spatial` — static obstacles and the per-step spatial index.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`obstacle`] | `Obstacle`, `ObstacleSet`, `ObstacleSetBuilder`           |
//! | [`index`]    | `SpatialIndex` — R-trees over agents and obstacle segments|
//! | [`error`]    | `SpatialError`                                            |
//!
//! The obstacle set is immutable after construction and owned by the index.
//! The agent side of the index is rebuilt once per step from the current
//! agent store and then queried read-only (possibly from many worker
//! threads at once) during the resolution phase.

pub mod error;
pub mod index;
pub mod obstacle;

#[cfg(test)]
mod tests;

pub use error::SpatialError;
pub use index::{Neighbor, SpatialIndex};
pub use obstacle::{Obstacle, ObstacleSet, ObstacleSetBuilder};
