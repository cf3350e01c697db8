// src/error.rs

use thiserror::Error;

/// Errors raised while constructing the multigrid hierarchy.
///
/// All of these are fatal: the builder never truncates or resizes a
/// mismatched input to make it fit.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    /// One of the constraint fields has zero cells (typically a failed load).
    #[error("constraint field is empty")]
    EmptyField,

    /// The three constraint fields do not share the same dimensions.
    #[error(
        "constraint fields disagree in size: alpha {alpha_nx}x{alpha_ny}, \
         altitude {altitude_nx}x{altitude_ny}, laplacian {laplacian_nx}x{laplacian_ny}"
    )]
    DimensionMismatch {
        alpha_nx: usize,
        alpha_ny: usize,
        altitude_nx: usize,
        altitude_ny: usize,
        laplacian_nx: usize,
        laplacian_ny: usize,
    },

    /// The hierarchy coarsening recurrence assumes square levels.
    #[error("multigrid hierarchy requires a square field, got {nx}x{ny}")]
    NonSquare { nx: usize, ny: usize },
}

/// Errors surfaced by a relaxation backend.
///
/// A failed pass aborts the solve; there is no retry or degraded mode.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BackendError {
    /// The requested level does not exist in the backend's buffer set.
    #[error("no relaxation buffers for level {level} (backend holds {count} levels)")]
    UnknownLevel { level: usize, count: usize },

    /// A buffer or dispatch size does not match the level's allocation.
    #[error("level {level}: expected {expected} values, got {got}")]
    SizeMismatch {
        level: usize,
        expected: usize,
        got: usize,
    },
}
