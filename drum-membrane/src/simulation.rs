use crate::config::{Config, RunConfig};
use crate::error::Result;
use crate::excitation::{Excitation, Pin};
use crate::grid::Domain;
use crate::integrator::WaveIntegrator;
use crate::interaction::{ClickAction, Command, Controls, Mode, Outcome};
use crate::relaxation::RelaxationSolver;
use crate::visualisation::FieldRenderer;
use crate::wavefield::FieldStore;
use log::{debug, info, warn};
use ndarray::Array2;

/// Where the renderer should draw the pin indicator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinMarker {
    pub x: usize,
    pub y: usize,
    pub radius: f64,
}

/// A single membrane together with its pin, interaction mode and slider values.
pub struct Simulation {
    domain: Domain,
    field: FieldStore,
    integrator: WaveIntegrator,
    excitation: Excitation,
    relaxation: RelaxationSolver,
    pin: Option<Pin>,
    mode: Mode,
    controls: Controls,
    status: String,
    tick: u64,
}

impl Simulation {
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let domain = config.grid.domain()?;
        let excitation = Excitation::new(config.excitation.clone());
        let integrator = WaveIntegrator::new(
            config.physics.c_squared,
            config.physics.damping,
            excitation.limit(),
        );
        let relaxation = RelaxationSolver::new(config.relaxation.passes, config.relaxation.tolerance);
        let controls = Controls {
            pulse_amplitude: config.excitation.pulse_default,
            press_strength: config.excitation.press_default,
        };

        Ok(Self {
            domain,
            field: FieldStore::new(domain.width, domain.height),
            integrator,
            excitation,
            relaxation,
            pin: None,
            mode: Mode::AwaitingPin,
            controls,
            status: "Click the membrane to place the pin".to_string(),
            tick: 0,
        })
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn current_field(&self) -> &Array2<f64> {
        self.field.current()
    }

    pub fn previous_field(&self) -> &Array2<f64> {
        self.field.previous()
    }

    pub fn status_message(&self) -> &str {
        &self.status
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn pin(&self) -> Option<&Pin> {
        self.pin.as_ref()
    }

    pub fn pin_marker(&self) -> Option<PinMarker> {
        self.pin.map(|p| PinMarker {
            x: p.x,
            y: p.y,
            radius: p.radius,
        })
    }

    pub fn controls(&self) -> Controls {
        self.controls
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Sum of squared interior displacement.
    pub fn energy(&self) -> f64 {
        self.field.energy(&self.domain)
    }

    /// Advance one frame.
    pub fn step(&mut self) {
        self.integrator.step(&mut self.field, &self.domain, self.pin.as_ref());
        self.tick += 1;
    }

    pub fn click(&mut self, x: i64, y: i64) -> Outcome {
        let Some((i, j)) = self.domain.locate(x, y) else {
            return Outcome::Ignored;
        };

        let outcome = match self.mode.on_click((i, j), self.pin.as_ref()) {
            ClickAction::PlacePin => {
                let pin = self.excitation.pin_at(i, j, self.controls.press_strength);
                self.place_pin(pin);
                self.mode = Mode::Tapping;
                info!("Pin placed at ({}, {}), radius {}, depth {}", i, j, pin.radius, pin.target);
                Outcome::PinPlaced { x: i, y: j }
            }
            ClickAction::Tap => {
                self.tap((i, j));
                Outcome::Tapped {
                    x: i,
                    y: j,
                    amplitude: self.controls.pulse_amplitude,
                }
            }
            ClickAction::ClearAndTap => {
                self.field.reset();
                self.tap((i, j));
                Outcome::Tapped {
                    x: i,
                    y: j,
                    amplitude: self.controls.pulse_amplitude,
                }
            }
            ClickAction::RejectOnPin => Outcome::OnPin { x: i, y: j },
        };
        self.status = outcome.to_string();
        outcome
    }

    fn tap(&mut self, center: (usize, usize)) {
        let amplitude = self.controls.pulse_amplitude;
        let radius = self.excitation.pulse_radius(amplitude);
        self.excitation
            .tap(&mut self.field, &self.domain, center, radius, amplitude);
        // A wide tap may spill onto the pin; the pin wins
        if let Some(pin) = &self.pin {
            self.excitation.press(&mut self.field, &self.domain, pin);
        }
    }

    fn place_pin(&mut self, pin: Pin) {
        let passes = self.relaxation.apply(&mut self.field, &self.domain, &pin);
        debug!("Settled pinned membrane in {} passes", passes);
        self.pin = Some(pin);
    }

    /// Clear the pin and both grids and wait for a new pin.
    pub fn reset(&mut self) {
        self.field.reset();
        self.pin = None;
        self.mode = Mode::AwaitingPin;
        self.status = "Reset: click the membrane to place the pin".to_string();
        info!("Simulation reset");
    }

    pub fn toggle_pin_mode(&mut self) {
        match self.mode.toggled() {
            Mode::PinDisabled => {
                self.pin = None;
                self.field.reset();
                self.mode = Mode::PinDisabled;
                self.status = "Pin disabled: click anywhere to tap".to_string();
            }
            _ => self.reset(),
        }
        info!("Pin mode toggled, now {:?}", self.mode);
    }

    pub fn set_pulse_amplitude(&mut self, amplitude: f64) {
        if !amplitude.is_finite() {
            warn!("Ignoring non-finite pulse amplitude {}", amplitude);
            return;
        }
        let c = &self.excitation.config;
        self.controls.pulse_amplitude = amplitude.clamp(c.pulse_min, c.pulse_max);
    }

    /// Update the press strength; an existing pin is rebuilt and the membrane re-settled.
    pub fn set_press_strength(&mut self, strength: f64) {
        if !strength.is_finite() {
            warn!("Ignoring non-finite press strength {}", strength);
            return;
        }
        let c = &self.excitation.config;
        self.controls.press_strength = strength.clamp(c.press_min, c.press_max);

        if let Some(old) = self.pin {
            let pin = self.excitation.pin_at(old.x, old.y, self.controls.press_strength);
            if pin != old {
                self.place_pin(pin);
                self.status = format!("Press depth now {}", -pin.target);
            }
        }
    }

    /// Apply an external input; clicks report their outcome.
    pub fn apply(&mut self, command: Command) -> Option<Outcome> {
        match command {
            Command::Click { x, y } => return Some(self.click(x, y)),
            Command::Reset => self.reset(),
            Command::TogglePinMode => self.toggle_pin_mode(),
            Command::SetPulseAmplitude(v) => self.set_pulse_amplitude(v),
            Command::SetPressStrength(v) => self.set_press_strength(v),
        }
        None
    }

    /// Apply every scheduled command due at the current tick. `next` indexes the
    /// first unfired entry of the tick-sorted schedule.
    fn fire_due(&mut self, schedule: &[(u64, Command)], next: &mut usize) {
        while let Some(&(tick, command)) = schedule.get(*next) {
            if tick > self.tick {
                break;
            }
            if let Some(outcome) = self.apply(command) {
                info!("Tick {}: {}", self.tick, outcome);
            }
            *next += 1;
        }
    }

    /// Run `ticks` frames, firing the scheduled commands along the way.
    pub fn run(&mut self, ticks: u64, schedule: &[(u64, Command)]) {
        let end = self.tick + ticks;
        let mut next = 0;
        while self.tick < end {
            self.fire_due(schedule, &mut next);
            self.step();
        }
    }

    pub fn run_with_visualisation(&mut self, run: &RunConfig, schedule: &[(u64, Command)]) -> Result<()> {
        info!("Starting simulation with visualisation...");
        info!(
            "Grid: {}x{}, {} ticks, frame every {} ticks",
            self.domain.width, self.domain.height, run.ticks, run.frame_interval
        );

        let renderer = FieldRenderer::new(
            &run.output_dir,
            run.image_width,
            run.image_height,
            run.color_map,
            self.excitation.config.pulse_max,
        )?;

        let end = self.tick + run.ticks;
        let mut next = 0;
        while self.tick < end {
            self.fire_due(schedule, &mut next);
            self.step();

            if run.frame_interval > 0 && self.tick % run.frame_interval == 0 {
                self.render(&renderer);
            }

            if self.tick % 100 == 0 {
                info!(
                    "Tick {}/{} (energy {:.3e}, {})",
                    self.tick,
                    end,
                    self.energy(),
                    self.status
                );
            }
        }

        info!("Simulation complete! Frames saved to {}", run.output_dir);
        Ok(())
    }

    fn render(&self, renderer: &FieldRenderer) {
        match renderer.plot_field(
            self.field.current(),
            &self.domain,
            self.pin_marker(),
            self.tick,
            &self.status,
        ) {
            Ok(path) => debug!("Saved frame: {}", path.display()),
            Err(e) => warn!("Failed to render tick {}: {}", self.tick, e),
        }
    }
}
