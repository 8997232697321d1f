use crate::grid::Domain;
use ndarray::Array2;

/// Double-buffered displacement grids, indexed `[[x, y]]`.
pub struct FieldStore {
    current: Array2<f64>,
    previous: Array2<f64>,
    // Retired buffer handed back out as scratch for the next step
    spare: Option<Array2<f64>>,
}

impl FieldStore {
    pub fn new(width: usize, height: usize) -> Self {
        FieldStore {
            current: Array2::zeros((width, height)),
            previous: Array2::zeros((width, height)),
            spare: None,
        }
    }

    pub fn current(&self) -> &Array2<f64> {
        &self.current
    }

    pub fn previous(&self) -> &Array2<f64> {
        &self.previous
    }

    pub(crate) fn current_mut(&mut self) -> &mut Array2<f64> {
        &mut self.current
    }

    pub fn dim(&self) -> (usize, usize) {
        self.current.dim()
    }

    pub fn reset(&mut self) {
        self.current.fill(0.0);
        self.previous.fill(0.0);
    }

    /// A buffer of the right shape for the next step. Contents are unspecified.
    pub fn take_scratch(&mut self) -> Array2<f64> {
        self.spare
            .take()
            .unwrap_or_else(|| Array2::zeros(self.current.dim()))
    }

    /// Retire `previous`, shift `current` into `previous` and install `next`.
    pub fn advance(&mut self, next: Array2<f64>) {
        debug_assert_eq!(next.dim(), self.current.dim());
        let retired = std::mem::replace(&mut self.previous, std::mem::replace(&mut self.current, next));
        self.spare = Some(retired);
    }

    /// Hold a cell at `value` with zero velocity.
    pub fn pin_cell(&mut self, i: usize, j: usize, value: f64) {
        self.current[[i, j]] = value;
        self.previous[[i, j]] = value;
    }

    /// Install the same state into both buffers (zero velocity everywhere).
    pub fn set_static(&mut self, state: &Array2<f64>) {
        self.current.assign(state);
        self.previous.assign(state);
    }

    /// Sum of squared displacement over the interior.
    pub fn energy(&self, domain: &Domain) -> f64 {
        self.current
            .indexed_iter()
            .filter(|&((i, j), _)| domain.is_interior(i, j))
            .map(|(_, &u)| u * u)
            .sum()
    }
}
