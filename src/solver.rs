// src/solver.rs
//
// Cascading multi-resolution solve over the hierarchy: the coarsest level is
// relaxed to convergence first, then each finer level starts from a bilinear
// upsampling of the coarser result and relaxes again. No residual is ever
// formed or transferred between levels; this is a nested-iteration scheme,
// not a correction-scheme V-cycle, and adding residual transfer would change
// the converged result.

use log::{debug, info};

use crate::backend::{CpuJacobiBackend, RelaxationBackend};
use crate::error::{BackendError, BuildError};
use crate::field::ScalarField2D;
use crate::hierarchy::{build_hierarchy, Level};

/// Drives a `RelaxationBackend` over a multigrid hierarchy and extracts the
/// reconstructed heightfield.
///
/// The solver owns all levels exclusively for the duration of a solve; the
/// constraint fields are read-only after construction and only the backend's
/// ping-pong buffers mutate.
pub struct DiffusionSolver<B = CpuJacobiBackend> {
    levels: Vec<Level>,
    backend: B,
    side: usize,
}

impl DiffusionSolver<CpuJacobiBackend> {
    /// Build the hierarchy from the three constraint fields and attach the
    /// bundled CPU backend.
    pub fn new(
        alpha: ScalarField2D,
        altitude: ScalarField2D,
        laplacian: ScalarField2D,
    ) -> Result<Self, BuildError> {
        let levels = build_hierarchy(alpha, altitude, laplacian)?;
        let backend = CpuJacobiBackend::new(&levels);
        Ok(Self::with_backend(levels, backend))
    }
}

impl<B: RelaxationBackend> DiffusionSolver<B> {
    /// Attach a custom backend to an already-built hierarchy. The backend
    /// must have been initialised from the same levels.
    pub fn with_backend(levels: Vec<Level>, backend: B) -> Self {
        assert!(!levels.is_empty(), "hierarchy must have at least one level");
        let side = levels[0].side;
        Self {
            levels,
            backend,
            side,
        }
    }

    /// Number of resolutions in the hierarchy.
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Run the full cascading cycle, finest level last. Always runs to
    /// completion; iteration counts are fixed per level.
    pub fn solve(&mut self) -> Result<(), BackendError> {
        info!("cascading solve over {} resolutions", self.levels.len());
        self.cycle(0)
    }

    fn cycle(&mut self, level: usize) -> Result<(), BackendError> {
        let mgsize = self.levels.len();
        let side = self.levels[level].side;
        // More passes on finer levels; they start from a good coarse guess
        // but carry the most cells.
        let nit = 50 + 10 * (mgsize - level);
        debug!("level {}: side {}, {} relaxation passes", level, side, nit);

        if level == mgsize - 1 {
            // Coarsest level relaxes from its zero-initialised buffer.
            return self.relax(level, side, nit);
        }

        // The coarser level must have fully converged before this level is
        // touched.
        self.cycle(level + 1)?;

        let coarse = self.backend.read_back(level + 1)?;
        let fine = prolongate(&coarse, self.levels[level + 1].side, side);
        self.backend.upload(level, &fine)?;

        self.relax(level, side, nit)
    }

    fn relax(&mut self, level: usize, side: usize, nit: usize) -> Result<(), BackendError> {
        for _ in 0..nit {
            self.backend.dispatch(level, side)?;
            // After the swap the freshest iterate is on the source side.
            self.backend.swap_roles(level)?;
        }
        Ok(())
    }

    /// Read the finest level's freshest buffer back into a standalone field.
    pub fn result(&self) -> Result<ScalarField2D, BackendError> {
        let values = self.backend.read_back(0)?;
        Ok(ScalarField2D::from_values(self.side, self.side, values))
    }
}

/// Bilinear upsampling of a converged coarse buffer (side `coarse_side`)
/// onto a finer level (side `fine_side`, with
/// `coarse_side == fine_side / 2 + 1`):
///
/// - even row, even col: the coarse value itself;
/// - one odd index: the 0.5/0.5 average of the two straddling coarse values;
/// - both odd: the 0.25-weighted average of the four surrounding values.
pub fn prolongate(coarse: &[f32], coarse_side: usize, fine_side: usize) -> Vec<f32> {
    debug_assert_eq!(coarse_side, fine_side / 2 + 1);
    debug_assert_eq!(coarse.len(), coarse_side * coarse_side);

    let sc = coarse_side;
    let mut fine = vec![0.0f32; fine_side * fine_side];

    for i in 0..fine_side {
        let ci = i / 2;
        for j in 0..fine_side {
            let cj = j / 2;
            let val = match (i % 2, j % 2) {
                (0, 0) => coarse[ci * sc + cj],
                (0, _) => 0.5 * (coarse[ci * sc + cj] + coarse[ci * sc + cj + 1]),
                (_, 0) => 0.5 * (coarse[ci * sc + cj] + coarse[(ci + 1) * sc + cj]),
                _ => {
                    0.25 * (coarse[ci * sc + cj]
                        + coarse[ci * sc + cj + 1]
                        + coarse[(ci + 1) * sc + cj]
                        + coarse[(ci + 1) * sc + cj + 1])
                }
            };
            fine[i * fine_side + j] = val;
        }
    }
    fine
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prolongation_interpolates_a_2x2_block() {
        // coarse 2x2 -> fine 3x3: corners copy, edges average two values,
        // the centre averages all four.
        let coarse = vec![0.0, 1.0, 2.0, 3.0];
        let fine = prolongate(&coarse, 2, 3);
        assert_eq!(fine, vec![0.0, 0.5, 1.0, 1.0, 1.5, 2.0, 2.0, 2.5, 3.0]);
    }

    #[test]
    fn prolongation_preserves_constants() {
        for &(sc, sf) in &[(2usize, 3usize), (4, 6), (5, 9), (6, 10), (9, 17)] {
            let coarse = vec![0.42f32; sc * sc];
            let fine = prolongate(&coarse, sc, sf);
            assert_eq!(fine.len(), sf * sf);
            assert!(
                fine.iter().all(|&v| v == 0.42),
                "constant not preserved for {}->{}",
                sc,
                sf
            );
        }
    }

    #[test]
    fn prolongation_is_exact_for_bilinear_ramps() {
        // A field linear in the column index upsamples to the matching
        // linear field on the finer grid.
        let sc = 5;
        let sf = 9;
        let coarse: Vec<f32> = (0..sc * sc).map(|k| (k % sc) as f32).collect();
        let fine = prolongate(&coarse, sc, sf);
        for i in 0..sf {
            for j in 0..sf {
                let expected = j as f32 * 0.5;
                assert!(
                    (fine[i * sf + j] - expected).abs() < 1e-6,
                    "({}, {}): got {}, expected {}",
                    i,
                    j,
                    fine[i * sf + j],
                    expected
                );
            }
        }
    }
}
