// src/hierarchy.rs
//
// Geometric multigrid hierarchy over three same-sized constraint fields:
//   alpha     - constraint type per cell: 0 = fixed altitude (Dirichlet),
//               1 = free, driven by a target curvature (laplacian)
//   altitude  - target value, used only where the cell is fixed
//   laplacian - target curvature, used only where the cell is free
//
// Levels are built once, coarsest last, by a bilinear-restriction stencil;
// they are read-only afterwards except for the two relaxation buffers.

use log::info;

use crate::error::BuildError;
use crate::field::ScalarField2D;

/// Coarsening stops once a level's side length is at most this.
pub const MIN_COARSE_SIZE: usize = 9;

/// One resolution of the hierarchy. `side` is the square side length;
/// `buffer_a`/`buffer_b` are the relaxation ping-pong state.
#[derive(Debug)]
pub struct Level {
    pub side: usize,
    pub alpha: ScalarField2D,
    pub altitude: ScalarField2D,
    pub laplacian: ScalarField2D,
    pub buffer_a: ScalarField2D,
    pub buffer_b: ScalarField2D,
}

impl Level {
    fn finest(
        alpha: ScalarField2D,
        altitude: ScalarField2D,
        laplacian: ScalarField2D,
    ) -> Self {
        let side = alpha.nx();
        Self {
            side,
            buffer_a: ScalarField2D::new(side, side),
            buffer_b: ScalarField2D::new(side, side),
            alpha,
            altitude,
            laplacian,
        }
    }
}

/// Number of levels generated for a fine side length `n`:
/// the smallest depth whose last side satisfies `side <= MIN_COARSE_SIZE`
/// under the recurrence `side -> side / 2 + 1`.
pub fn hierarchy_depth(n: usize) -> usize {
    let mut depth = 1;
    let mut s = n;
    while s > MIN_COARSE_SIZE {
        depth += 1;
        s = s / 2 + 1;
    }
    depth
}

/// Build the full hierarchy, finest level first.
///
/// The three inputs must share the same square shape; they are copied, not
/// aliased. Construction is sequential and deterministic: building twice
/// from identical inputs yields bit-identical levels.
pub fn build_hierarchy(
    alpha: ScalarField2D,
    altitude: ScalarField2D,
    laplacian: ScalarField2D,
) -> Result<Vec<Level>, BuildError> {
    if alpha.is_empty() || altitude.is_empty() || laplacian.is_empty() {
        return Err(BuildError::EmptyField);
    }
    if alpha.nx() != altitude.nx()
        || alpha.ny() != altitude.ny()
        || alpha.nx() != laplacian.nx()
        || alpha.ny() != laplacian.ny()
    {
        return Err(BuildError::DimensionMismatch {
            alpha_nx: alpha.nx(),
            alpha_ny: alpha.ny(),
            altitude_nx: altitude.nx(),
            altitude_ny: altitude.ny(),
            laplacian_nx: laplacian.nx(),
            laplacian_ny: laplacian.ny(),
        });
    }
    if alpha.nx() != alpha.ny() {
        return Err(BuildError::NonSquare {
            nx: alpha.nx(),
            ny: alpha.ny(),
        });
    }

    let n = alpha.nx();
    let depth = hierarchy_depth(n);
    info!("building hierarchy: {} resolutions from {}x{}", depth, n, n);

    let mut levels = Vec::with_capacity(depth);
    levels.push(Level::finest(alpha, altitude, laplacian));
    for r in 1..depth {
        let coarse = restrict(&levels[r - 1]);
        levels.push(coarse);
    }
    Ok(levels)
}

/// Derive one coarse level (side `fine.side / 2 + 1`) from its fine parent.
///
/// Each coarse cell (i, j) aggregates a 3x3 stencil of fine cells centred at
/// (2i, 2j), with geometric weights 1 / (2^|di| * 2^|dj|); offsets falling
/// outside the fine grid are skipped, giving one-sided stencils at borders
/// and corners. Decision rule per coarse cell:
///
/// - any stencil neighbour with alpha < 1: the coarse cell is fixed
///   (alpha = 0) and its altitude is the coef*(1-alpha)-weighted average of
///   the fixed-leaning neighbours' altitudes;
/// - otherwise the coarse cell is free (alpha = 1) and its laplacian is the
///   coef*alpha-weighted sum over neighbours with alpha > 0. This is
///   deliberately a geometric-weighted sum, not an average.
fn restrict(fine: &Level) -> Level {
    let fine_side = fine.side as isize;
    let s = fine.side / 2 + 1;

    let mut alpha = ScalarField2D::new(s, s);
    let mut altitude = ScalarField2D::new(s, s);
    let mut laplacian = ScalarField2D::new(s, s);

    for i in 0..s {
        for j in 0..s {
            let mut fixed = false;
            let mut m_altitude = 0.0f32;
            let mut n_fixed = 0.0f32;
            let mut sum_lap = 0.0f32;

            for di in -1isize..=1 {
                let fi = 2 * i as isize + di;
                if fi < 0 || fi >= fine_side {
                    continue;
                }
                for dj in -1isize..=1 {
                    let fj = 2 * j as isize + dj;
                    if fj < 0 || fj >= fine_side {
                        continue;
                    }
                    let coef = 1.0f32
                        / ((1usize << di.unsigned_abs()) * (1usize << dj.unsigned_abs())) as f32;
                    let a = fine.alpha.get(fi as usize, fj as usize);

                    if a < 1.0 {
                        // a fixed altitude constraint reaches this coarse cell
                        fixed = true;
                        m_altitude += coef * (1.0 - a) * fine.altitude.get(fi as usize, fj as usize);
                        n_fixed += coef * (1.0 - a);
                    }
                    if a > 0.0 {
                        sum_lap += coef * a * fine.laplacian.get(fi as usize, fj as usize);
                    }
                }
            }

            if fixed {
                alpha.set(i, j, 0.0);
                altitude.set(i, j, m_altitude / n_fixed);
            } else {
                alpha.set(i, j, 1.0);
                laplacian.set(i, j, sum_lap);
            }
        }
    }

    Level {
        side: s,
        buffer_a: ScalarField2D::new(s, s),
        buffer_b: ScalarField2D::new(s, s),
        alpha,
        altitude,
        laplacian,
    }
}
