//! Jacobi relaxation towards the discrete harmonic shape of a pinned membrane.

use crate::excitation::Pin;
use crate::grid::Domain;
use crate::wavefield::FieldStore;
use log::debug;
use ndarray::Array2;

pub const DEFAULT_PASSES: usize = 300;

#[derive(Debug, Clone, Copy)]
pub struct RelaxationSolver {
    pub passes: usize,
    /// Stop early once no cell moves by more than this in a pass.
    pub tolerance: Option<f64>,
}

impl Default for RelaxationSolver {
    fn default() -> Self {
        Self {
            passes: DEFAULT_PASSES,
            tolerance: None,
        }
    }
}

impl RelaxationSolver {
    pub fn new(passes: usize, tolerance: Option<f64>) -> Self {
        Self { passes, tolerance }
    }

    /// Equilibrium field with the pin held at its target and zero outside the disc.
    /// Returns the field and the number of passes run.
    pub fn solve(&self, domain: &Domain, pin: &Pin) -> (Array2<f64>, usize) {
        let mut old = Array2::<f64>::zeros(domain.shape());
        for (i, j) in pin.cells(domain) {
            old[[i, j]] = pin.target;
        }
        let mut new = old.clone();
        let (nx, ny) = domain.shape();

        let mut passes = 0;
        while passes < self.passes {
            let mut max_change = 0.0_f64;
            for i in 0..nx {
                for j in 0..ny {
                    let value = if !domain.is_interior(i, j) {
                        0.0
                    } else if pin.reaches(i, j) {
                        pin.target
                    } else {
                        neighbour_average(&old, i, j)
                    };
                    max_change = max_change.max((value - old[[i, j]]).abs());
                    new[[i, j]] = value;
                }
            }
            std::mem::swap(&mut old, &mut new);
            passes += 1;

            if let Some(tol) = self.tolerance {
                if max_change < tol {
                    break;
                }
            }
        }

        debug!("Relaxation finished after {} passes", passes);
        (old, passes)
    }

    /// Solve and install the result into both buffers (zero initial velocity).
    pub fn apply(&self, field: &mut FieldStore, domain: &Domain, pin: &Pin) -> usize {
        let (state, passes) = self.solve(domain, pin);
        field.set_static(&state);
        passes
    }
}

/// Mean of the in-bounds 4-neighbours of `(i, j)`; the cell's own value if it has none.
fn neighbour_average(grid: &Array2<f64>, i: usize, j: usize) -> f64 {
    let (nx, ny) = grid.dim();
    let mut sum = 0.0;
    let mut count = 0;
    if i > 0 {
        sum += grid[[i - 1, j]];
        count += 1;
    }
    if i + 1 < nx {
        sum += grid[[i + 1, j]];
        count += 1;
    }
    if j > 0 {
        sum += grid[[i, j - 1]];
        count += 1;
    }
    if j + 1 < ny {
        sum += grid[[i, j + 1]];
        count += 1;
    }
    if count == 0 {
        grid[[i, j]]
    } else {
        sum / count as f64
    }
}
