//! Damped wave simulation on a circular membrane with taps, a pin, and a
//! relaxation solver for the pinned resting shape.

pub mod config;
pub mod error;
pub mod excitation;
pub mod grid;
pub mod integrator;
pub mod interaction;
pub mod relaxation;
pub mod simulation;
pub mod visualisation;
pub mod wavefield;

pub use config::Config;
pub use error::{MembraneError, Result};
pub use excitation::Pin;
pub use grid::Domain;
pub use interaction::{Command, Controls, Mode, Outcome};
pub use simulation::{PinMarker, Simulation};
