//! Taps and presses: the two ways a user excites the membrane.

use crate::config::ExcitationConfig;
use crate::grid::{cell_distance, Domain};
use crate::wavefield::FieldStore;

/// Bounded linear map of a strength in `[s_min, s_max]` onto `[r_min, r_max]`,
/// rounded to whole cells.
pub fn lerp_radius(strength: f64, s_min: f64, s_max: f64, r_min: f64, r_max: f64) -> f64 {
    let t = if s_max > s_min {
        ((strength - s_min) / (s_max - s_min)).clamp(0.0, 1.0)
    } else {
        0.0
    };
    (r_min + t * (r_max - r_min)).round()
}

/// A region held at a fixed displacement, emulating a finger pressing the membrane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pin {
    pub x: usize,
    pub y: usize,
    pub radius: f64,
    pub target: f64,
}

impl Pin {
    /// Whether the cell is within the pin radius. Ignores the domain mask.
    pub fn reaches(&self, i: usize, j: usize) -> bool {
        cell_distance((i, j), (self.x, self.y)) <= self.radius
    }

    /// Whether the pin holds this cell. Only interior cells are ever held.
    pub fn covers(&self, domain: &Domain, i: usize, j: usize) -> bool {
        domain.is_interior(i, j) && self.reaches(i, j)
    }

    /// Interior cells held by the pin.
    pub fn cells<'a>(&'a self, domain: &'a Domain) -> impl Iterator<Item = (usize, usize)> + 'a {
        let (xs, ys) = domain.window(self.x, self.y, self.radius);
        xs.flat_map(move |i| ys.clone().map(move |j| (i, j)))
            .filter(move |&(i, j)| self.covers(domain, i, j))
    }
}

pub struct Excitation {
    pub config: ExcitationConfig,
}

impl Excitation {
    pub fn new(config: ExcitationConfig) -> Self {
        Self { config }
    }

    /// Largest magnitude any cell may take.
    pub fn limit(&self) -> f64 {
        2.0 * self.config.pulse_max
    }

    pub fn pulse_radius(&self, amplitude: f64) -> f64 {
        let c = &self.config;
        lerp_radius(amplitude, c.pulse_min, c.pulse_max, c.pulse_radius_min, c.pulse_radius_max)
    }

    pub fn press_radius(&self, strength: f64) -> f64 {
        let c = &self.config;
        lerp_radius(strength, c.press_min, c.press_max, c.press_radius_min, c.press_radius_max)
    }

    /// Indentation depth for a press strength.
    pub fn press_target(&self, strength: f64) -> f64 {
        let limit = self.limit();
        (-strength).clamp(-limit, limit)
    }

    /// Build the pin a press of `strength` at `(x, y)` would create.
    pub fn pin_at(&self, x: usize, y: usize, strength: f64) -> Pin {
        Pin {
            x,
            y,
            radius: self.press_radius(strength),
            target: self.press_target(strength),
        }
    }

    /// Add `amplitude` to every interior cell within `radius` of `center`.
    ///
    /// The radius comes from the pulse slider, not from `amplitude`, so repeated
    /// taps add up exactly. Leaves `previous` alone, so the tap injects velocity
    /// as well as displacement.
    pub fn tap(
        &self,
        field: &mut FieldStore,
        domain: &Domain,
        center: (usize, usize),
        radius: f64,
        amplitude: f64,
    ) {
        let limit = self.limit();
        let (xs, ys) = domain.window(center.0, center.1, radius);
        let current = field.current_mut();
        for i in xs {
            for j in ys.clone() {
                if domain.is_interior(i, j) && cell_distance((i, j), center) <= radius {
                    current[[i, j]] = (current[[i, j]] + amplitude).clamp(-limit, limit);
                }
            }
        }
    }

    /// Set `current` and `previous` to the pin target over the pin's interior cells.
    pub fn press(&self, field: &mut FieldStore, domain: &Domain, pin: &Pin) {
        for (i, j) in pin.cells(domain) {
            field.pin_cell(i, j, pin.target);
        }
    }
}
