//! Spatial-subsystem error type.

use thiserror::Error;

/// Errors produced by `crowd-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("obstacle chain needs at least 2 points, got {0}")]
    DegenerateChain(usize),

    #[error("obstacle chain contains a zero-length edge at index {0}")]
    ZeroLengthEdge(usize),
}
