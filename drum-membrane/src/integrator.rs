//! Damped explicit finite-difference integrator for the membrane wave equation.

use crate::excitation::Pin;
use crate::grid::Domain;
use crate::wavefield::FieldStore;
use ndarray::{Array2, Zip};

/// Advances the displacement field one unit time step:
///
/// ```text
/// next = u + (u - u_prev) * damping + c_squared * laplacian(u)
/// ```
///
/// `c_squared` must not exceed 0.5 or the scheme blows up. This is checked when the
/// configuration is validated, not here.
#[derive(Debug, Clone, Copy)]
pub struct WaveIntegrator {
    pub c_squared: f64,
    pub damping: f64,
    pub limit: f64, // Displacements are clamped to [-limit, limit]
}

impl WaveIntegrator {
    pub fn new(c_squared: f64, damping: f64, limit: f64) -> Self {
        Self {
            c_squared,
            damping,
            limit,
        }
    }

    /// New value for an interior, unpinned cell.
    #[inline]
    fn update_cell(&self, current: &Array2<f64>, previous: &Array2<f64>, i: usize, j: usize) -> f64 {
        let u = current[[i, j]];
        let laplacian = current[[i - 1, j]] + current[[i + 1, j]] + current[[i, j - 1]]
            + current[[i, j + 1]]
            - 4.0 * u;
        let velocity = u - previous[[i, j]];
        let next = u + velocity * self.damping + self.c_squared * laplacian;
        next.clamp(-self.limit, self.limit)
    }

    #[inline]
    fn next_value(
        &self,
        current: &Array2<f64>,
        previous: &Array2<f64>,
        domain: &Domain,
        pin: Option<&Pin>,
        i: usize,
        j: usize,
    ) -> f64 {
        if !domain.is_interior(i, j) {
            return current[[i, j]];
        }
        match pin {
            Some(pin) if pin.reaches(i, j) => pin.target,
            _ => self.update_cell(current, previous, i, j),
        }
    }

    /// One step with the per-cell update spread over the rayon pool.
    pub fn step(&self, field: &mut FieldStore, domain: &Domain, pin: Option<&Pin>) {
        let mut next = field.take_scratch();
        {
            let current = field.current();
            let previous = field.previous();
            Zip::indexed(&mut next).par_for_each(|(i, j), out| {
                *out = self.next_value(current, previous, domain, pin, i, j);
            });
        }
        self.finish(field, domain, pin, next);
    }

    /// Same update as [`step`](Self::step) on the calling thread.
    pub fn step_serial(&self, field: &mut FieldStore, domain: &Domain, pin: Option<&Pin>) {
        let mut next = field.take_scratch();
        {
            let current = field.current();
            let previous = field.previous();
            for ((i, j), out) in next.indexed_iter_mut() {
                *out = self.next_value(current, previous, domain, pin, i, j);
            }
        }
        self.finish(field, domain, pin, next);
    }

    fn finish(&self, field: &mut FieldStore, domain: &Domain, pin: Option<&Pin>, next: Array2<f64>) {
        field.advance(next);

        // Re-snap the pin into both buffers so it acts as a rigid constraint
        if let Some(pin) = pin {
            for (i, j) in pin.cells(domain) {
                field.pin_cell(i, j, pin.target);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn integrator() -> WaveIntegrator {
        WaveIntegrator::new(0.45, 0.995, 1000.0)
    }

    #[test]
    fn test_single_impulse_step() {
        let domain = Domain::new(10, 10, 2.0).unwrap();
        let mut field = FieldStore::new(10, 10);
        field.current_mut()[[5, 5]] = 200.0;

        integrator().step(&mut field, &domain, None);

        let laplacian = -4.0 * 200.0;
        let velocity = 200.0;
        let expected = 200.0 + velocity * 0.995 + 0.45 * laplacian;
        assert_relative_eq!(field.current()[[5, 5]], expected);
        assert_relative_eq!(field.current()[[5, 5]], 39.0, epsilon = 1e-9);
        assert_relative_eq!(field.current()[[4, 5]], 0.45 * 200.0);
        assert_relative_eq!(field.previous()[[5, 5]], 200.0);
    }

    #[test]
    fn test_parallel_matches_serial() {
        let domain = Domain::new(24, 24, 2.0).unwrap();
        let pin = Pin { x: 8, y: 12, radius: 1.0, target: -50.0 };
        let mut a = FieldStore::new(24, 24);
        let mut b = FieldStore::new(24, 24);
        for field in [&mut a, &mut b] {
            field.current_mut()[[14, 12]] = 300.0;
            field.current_mut()[[12, 15]] = -120.0;
        }
        for _ in 0..40 {
            integrator().step(&mut a, &domain, Some(&pin));
            integrator().step_serial(&mut b, &domain, Some(&pin));
        }
        assert_eq!(a.current(), b.current());
        assert_eq!(a.previous(), b.previous());
    }

    #[test]
    fn test_exterior_cells_untouched() {
        let domain = Domain::new(12, 12, 2.0).unwrap();
        let mut field = FieldStore::new(12, 12);
        field.current_mut()[[6, 6]] = 500.0;
        for _ in 0..100 {
            integrator().step(&mut field, &domain, None);
            for ((i, j), &v) in field.current().indexed_iter() {
                if !domain.is_interior(i, j) {
                    assert_eq!(v, 0.0);
                }
                assert!(v.abs() <= 1000.0);
            }
        }
    }

    #[test]
    fn test_pin_held_after_step() {
        let domain = Domain::new(20, 20, 2.0).unwrap();
        let pin = Pin { x: 10, y: 10, radius: 2.0, target: -80.0 };
        let mut field = FieldStore::new(20, 20);
        field.current_mut()[[14, 10]] = 400.0;
        for _ in 0..30 {
            integrator().step(&mut field, &domain, Some(&pin));
            for (i, j) in pin.cells(&domain) {
                assert_eq!(field.current()[[i, j]], -80.0);
                assert_eq!(field.previous()[[i, j]], -80.0);
            }
        }
    }
}
