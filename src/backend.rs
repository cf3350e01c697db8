// src/backend.rs
//
// Relaxation backend: executes one synchronized parallel update pass over a
// level, reading a source buffer and writing a distinct destination buffer
// (strict ping-pong). The solver only depends on the `RelaxationBackend`
// capability trait, so a GPU kernel or SIMD loop can replace the bundled
// rayon implementation without touching the cycle logic.

use rayon::prelude::*;

use crate::error::BackendError;
use crate::hierarchy::Level;

/// Contract the cycle solver requires from a compute backend.
///
/// Guarantees every implementation must provide:
/// - `dispatch` reads only the source buffer and writes only the destination
///   buffer; no cell observes a value written in the same pass;
/// - `dispatch` has completed fully, and its writes are visible, by the time
///   it returns (barrier semantics);
/// - `swap_roles` exchanges the source/destination roles, so the freshest
///   iterate is always on the source side after a dispatch + swap pair.
pub trait RelaxationBackend {
    /// Overwrite a level's source buffer with `data`.
    fn upload(&mut self, level: usize, data: &[f32]) -> Result<(), BackendError>;

    /// Run one relaxation pass over the level. `side` must match the level's
    /// allocated side length.
    fn dispatch(&mut self, level: usize, side: usize) -> Result<(), BackendError>;

    /// Copy the level's source buffer (the freshest iterate, post-swap) out.
    fn read_back(&self, level: usize) -> Result<Vec<f32>, BackendError>;

    /// Exchange source and destination buffers for the level.
    fn swap_roles(&mut self, level: usize) -> Result<(), BackendError>;
}

struct LevelBuffers {
    side: usize,
    alpha: Vec<f32>,
    altitude: Vec<f32>,
    laplacian: Vec<f32>,
    /// Source of the next pass; holds the freshest iterate between passes.
    front: Vec<f32>,
    /// Destination of the next pass.
    back: Vec<f32>,
}

/// CPU implementation of the backend: a Jacobi-style update parallelised
/// over rows with rayon.
///
/// Per-cell rule, reading only the prior iterate:
/// - sum the in-bounds 4-neighbourhood (fewer neighbours at borders);
/// - free target: `(sum - laplacian) / n`, the Jacobi step that drives the
///   discrete Laplacian toward its target curvature;
/// - blend with the fixed target: `alpha * free + (1 - alpha) * altitude`,
///   so a fixed cell (alpha = 0) reproduces its altitude exactly on every
///   pass and never drifts.
pub struct CpuJacobiBackend {
    levels: Vec<LevelBuffers>,
}

impl CpuJacobiBackend {
    /// Allocate per-level buffers from a freshly built hierarchy. Constraint
    /// fields are copied; the hierarchy itself is never mutated.
    pub fn new(levels: &[Level]) -> Self {
        let levels = levels
            .iter()
            .map(|level| LevelBuffers {
                side: level.side,
                alpha: level.alpha.values().to_vec(),
                altitude: level.altitude.values().to_vec(),
                laplacian: level.laplacian.values().to_vec(),
                front: level.buffer_a.values().to_vec(),
                back: level.buffer_b.values().to_vec(),
            })
            .collect();
        Self { levels }
    }

    fn buffers(&self, level: usize) -> Result<&LevelBuffers, BackendError> {
        let count = self.levels.len();
        self.levels
            .get(level)
            .ok_or(BackendError::UnknownLevel { level, count })
    }

    fn buffers_mut(&mut self, level: usize) -> Result<&mut LevelBuffers, BackendError> {
        let count = self.levels.len();
        self.levels
            .get_mut(level)
            .ok_or(BackendError::UnknownLevel { level, count })
    }
}

impl RelaxationBackend for CpuJacobiBackend {
    fn upload(&mut self, level: usize, data: &[f32]) -> Result<(), BackendError> {
        let buffers = self.buffers_mut(level)?;
        if data.len() != buffers.front.len() {
            return Err(BackendError::SizeMismatch {
                level,
                expected: buffers.front.len(),
                got: data.len(),
            });
        }
        buffers.front.copy_from_slice(data);
        Ok(())
    }

    fn dispatch(&mut self, level: usize, side: usize) -> Result<(), BackendError> {
        let buffers = self.buffers_mut(level)?;
        if side != buffers.side {
            return Err(BackendError::SizeMismatch {
                level,
                expected: buffers.side * buffers.side,
                got: side * side,
            });
        }

        let s = buffers.side;
        let front: &[f32] = &buffers.front;
        let alpha: &[f32] = &buffers.alpha;
        let altitude: &[f32] = &buffers.altitude;
        let laplacian: &[f32] = &buffers.laplacian;

        // One row per task; every cell reads the prior iterate only, so the
        // whole pass is a single synchronized parallel update.
        buffers
            .back
            .par_chunks_mut(s)
            .enumerate()
            .for_each(|(i, row)| {
                for (j, out) in row.iter_mut().enumerate() {
                    let id = i * s + j;
                    let a = alpha[id];

                    let mut sum = 0.0f32;
                    let mut n = 0.0f32;
                    if i > 0 {
                        sum += front[id - s];
                        n += 1.0;
                    }
                    if i + 1 < s {
                        sum += front[id + s];
                        n += 1.0;
                    }
                    if j > 0 {
                        sum += front[id - 1];
                        n += 1.0;
                    }
                    if j + 1 < s {
                        sum += front[id + 1];
                        n += 1.0;
                    }

                    let free = if n > 0.0 {
                        (sum - laplacian[id]) / n
                    } else {
                        front[id]
                    };
                    *out = a * free + (1.0 - a) * altitude[id];
                }
            });

        Ok(())
    }

    fn read_back(&self, level: usize) -> Result<Vec<f32>, BackendError> {
        Ok(self.buffers(level)?.front.clone())
    }

    fn swap_roles(&mut self, level: usize) -> Result<(), BackendError> {
        let buffers = self.buffers_mut(level)?;
        std::mem::swap(&mut buffers.front, &mut buffers.back);
        Ok(())
    }
}
