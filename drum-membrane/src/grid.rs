use crate::error::{invalid, Result};

/// Circular simulation domain inscribed in a `width x height` grid.
///
/// The mask is derived from the grid size and margin alone, so it never changes
/// once the domain exists.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domain {
    pub width: usize,  // Number of cells in x
    pub height: usize, // Number of cells in y
    pub margin: f64,   // Cells reserved between the disc and the grid edge
}

impl Domain {
    pub fn new(width: usize, height: usize, margin: f64) -> Result<Self> {
        if width < 3 || height < 3 {
            return Err(invalid(format!(
                "Grid must be at least 3x3 (width={}, height={})",
                width, height
            )));
        }
        if margin < 0.0 || !margin.is_finite() {
            return Err(invalid(format!("margin must be a non-negative number, got {}", margin)));
        }
        if width.min(height) as f64 <= 2.0 * margin {
            return Err(invalid(format!(
                "Grid {}x{} leaves no interior with margin {}",
                width, height, margin
            )));
        }
        Ok(Domain { width, height, margin })
    }

    /// Shape suitable for `Array2::zeros`.
    pub fn shape(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Disc center in cell coordinates.
    pub fn center(&self) -> (f64, f64) {
        (self.width as f64 / 2.0, self.height as f64 / 2.0)
    }

    /// Disc radius in cells.
    pub fn radius(&self) -> f64 {
        self.width.min(self.height) as f64 / 2.0 - self.margin
    }

    pub fn is_interior(&self, i: usize, j: usize) -> bool {
        // Edge rows/columns are never interior so the 4-point stencil stays in bounds
        if i == 0 || j == 0 || i >= self.width - 1 || j >= self.height - 1 {
            return false;
        }
        let (cx, cy) = self.center();
        let dx = i as f64 - cx;
        let dy = j as f64 - cy;
        (dx * dx + dy * dy).sqrt() < self.radius()
    }

    /// Map a signed click coordinate to a cell, if it hits the membrane.
    pub fn locate(&self, x: i64, y: i64) -> Option<(usize, usize)> {
        if x < 0 || y < 0 {
            return None;
        }
        let (i, j) = (x as usize, y as usize);
        if i < self.width && j < self.height && self.is_interior(i, j) {
            Some((i, j))
        } else {
            None
        }
    }

    /// Cells whose index range could lie within `radius` of `(ci, cj)`,
    /// clipped to the grid.
    pub fn window(
        &self,
        ci: usize,
        cj: usize,
        radius: f64,
    ) -> (std::ops::Range<usize>, std::ops::Range<usize>) {
        let r = (radius.max(0.0).ceil() as usize).min(self.width.max(self.height));
        let xs = ci.saturating_sub(r)..ci.saturating_add(r + 1).min(self.width);
        let ys = cj.saturating_sub(r)..cj.saturating_add(r + 1).min(self.height);
        (xs, ys)
    }

    pub fn interior_count(&self) -> usize {
        (0..self.width)
            .flat_map(|i| (0..self.height).map(move |j| (i, j)))
            .filter(|&(i, j)| self.is_interior(i, j))
            .count()
    }
}

/// Euclidean distance between two cells.
pub fn cell_distance(a: (usize, usize), b: (usize, usize)) -> f64 {
    let dx = a.0 as f64 - b.0 as f64;
    let dy = a.1 as f64 - b.1 as f64;
    (dx * dx + dy * dy).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_grid_without_interior() {
        assert!(Domain::new(4, 10, 2.0).is_err());
        assert!(Domain::new(2, 2, 0.0).is_err());
        assert!(Domain::new(10, 10, -1.0).is_err());
        assert!(Domain::new(10, 10, 2.0).is_ok());
    }

    #[test]
    fn test_interior_is_a_disc() {
        let domain = Domain::new(10, 10, 2.0).unwrap();
        assert_eq!(domain.radius(), 3.0);
        assert!(domain.is_interior(5, 5));
        assert!(domain.is_interior(3, 5));
        // Distance exactly 3 is outside
        assert!(!domain.is_interior(2, 5));
        assert!(!domain.is_interior(0, 0));
        assert!(!domain.is_interior(9, 9));
    }

    #[test]
    fn test_interior_count_small_disc() {
        // radius 3 around (5, 5): 25 lattice points strictly inside
        let domain = Domain::new(10, 10, 2.0).unwrap();
        assert_eq!(domain.interior_count(), 25);
    }

    #[test]
    fn test_edges_never_interior() {
        let domain = Domain::new(5, 5, 0.0).unwrap();
        for k in 0..5 {
            assert!(!domain.is_interior(0, k));
            assert!(!domain.is_interior(4, k));
            assert!(!domain.is_interior(k, 0));
            assert!(!domain.is_interior(k, 4));
        }
    }

    #[test]
    fn test_locate_ignores_misses() {
        let domain = Domain::new(10, 10, 2.0).unwrap();
        assert_eq!(domain.locate(5, 5), Some((5, 5)));
        assert_eq!(domain.locate(-1, 5), None);
        assert_eq!(domain.locate(5, 10), None);
        assert_eq!(domain.locate(1, 1), None);
    }

    #[test]
    fn test_window_clipped() {
        let domain = Domain::new(10, 10, 2.0).unwrap();
        let (xs, ys) = domain.window(1, 8, 2.0);
        assert_eq!(xs, 0..4);
        assert_eq!(ys, 6..10);
    }

    #[test]
    fn test_window_huge_radius_covers_grid() {
        let domain = Domain::new(10, 10, 2.0).unwrap();
        let (xs, ys) = domain.window(5, 5, 1e30);
        assert_eq!(xs, 0..10);
        assert_eq!(ys, 0..10);
        let (xs, _) = domain.window(5, 5, f64::INFINITY);
        assert_eq!(xs, 0..10);
    }
}
