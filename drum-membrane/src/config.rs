use crate::error::{invalid, Result};
use crate::grid::Domain;
use crate::interaction::Command;
use crate::relaxation::DEFAULT_PASSES;
use crate::visualisation::ColorMap;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Grid configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub width: usize,
    pub height: usize,
    pub margin: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 100,
            height: 100,
            margin: 2.0,
        }
    }
}

impl GridConfig {
    pub fn domain(&self) -> Result<Domain> {
        Domain::new(self.width, self.height, self.margin)
    }
}

/// Wave equation coefficients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub c_squared: f64, // Wave speed squared (unit grid spacing and time step)
    pub damping: f64,   // Multiplies the velocity term each step
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            c_squared: 0.45,
            damping: 0.995,
        }
    }
}

impl PhysicsConfig {
    fn validate(&self) -> Result<()> {
        if !(self.c_squared > 0.0 && self.c_squared <= 0.5) {
            return Err(invalid(format!(
                "c_squared must be in (0, 0.5] for a stable explicit scheme, got {}",
                self.c_squared
            )));
        }
        if !(self.damping > 0.0 && self.damping <= 1.0) {
            return Err(invalid(format!("damping must be in (0, 1], got {}", self.damping)));
        }
        Ok(())
    }
}

/// Strength ranges and the radii they map onto
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExcitationConfig {
    pub pulse_min: f64,
    pub pulse_max: f64,
    pub pulse_default: f64,
    pub pulse_radius_min: f64,
    pub pulse_radius_max: f64,
    pub press_min: f64,
    pub press_max: f64,
    pub press_default: f64,
    pub press_radius_min: f64,
    pub press_radius_max: f64,
}

impl Default for ExcitationConfig {
    fn default() -> Self {
        Self {
            pulse_min: 10.0,
            pulse_max: 500.0,
            pulse_default: 200.0,
            pulse_radius_min: 0.0,
            pulse_radius_max: 1.0,
            press_min: 10.0,
            press_max: 300.0,
            press_default: 100.0,
            press_radius_min: 1.0,
            press_radius_max: 4.0,
        }
    }
}

fn check_range(name: &str, min: f64, max: f64, default: f64) -> Result<()> {
    if !(min.is_finite() && max.is_finite() && min < max) {
        return Err(invalid(format!("{} range must satisfy min < max (min={}, max={})", name, min, max)));
    }
    if default < min || default > max {
        return Err(invalid(format!(
            "{} default {} is outside [{}, {}]",
            name, default, min, max
        )));
    }
    Ok(())
}

fn check_radii(name: &str, min: f64, max: f64, extent: f64) -> Result<()> {
    if !(min.is_finite() && max.is_finite()) || min < 0.0 || max < min {
        return Err(invalid(format!(
            "{} radius range must satisfy 0 <= min <= max (min={}, max={})",
            name, min, max
        )));
    }
    if max > extent {
        return Err(invalid(format!(
            "{} radius max {} exceeds the grid extent {}",
            name, max, extent
        )));
    }
    Ok(())
}

impl ExcitationConfig {
    /// `extent` is the larger grid side; no radius may exceed it.
    fn validate(&self, extent: f64) -> Result<()> {
        check_range("pulse", self.pulse_min, self.pulse_max, self.pulse_default)?;
        check_range("press", self.press_min, self.press_max, self.press_default)?;
        if self.pulse_min <= 0.0 || self.press_min <= 0.0 {
            return Err(invalid("pulse and press strengths must be positive"));
        }
        check_radii("pulse", self.pulse_radius_min, self.pulse_radius_max, extent)?;
        check_radii("press", self.press_radius_min, self.press_radius_max, extent)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelaxationConfig {
    pub passes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f64>,
}

impl Default for RelaxationConfig {
    fn default() -> Self {
        Self {
            passes: DEFAULT_PASSES,
            tolerance: None,
        }
    }
}

impl RelaxationConfig {
    fn validate(&self) -> Result<()> {
        if self.passes == 0 {
            return Err(invalid("relaxation passes must be positive"));
        }
        if let Some(tol) = self.tolerance {
            if !(tol > 0.0) {
                return Err(invalid(format!("relaxation tolerance must be positive, got {}", tol)));
            }
        }
        Ok(())
    }
}

/// Headless run settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub ticks: u64,
    pub frame_interval: u64, // 0 disables frame output
    pub output_dir: String,
    pub image_width: u32,
    pub image_height: u32,
    pub color_map: ColorMap,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            ticks: 600,
            frame_interval: 10,
            output_dir: "output".to_string(),
            image_width: 600,
            image_height: 600,
            color_map: ColorMap::LogHsl,
        }
    }
}

impl RunConfig {
    fn validate(&self) -> Result<()> {
        if self.image_width == 0 || self.image_height == 0 {
            return Err(invalid(format!(
                "Image dimensions must be positive (width={}, height={})",
                self.image_width, self.image_height
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Click,
    Reset,
    TogglePinMode,
    SetPulseAmplitude,
    SetPressStrength,
}

/// A collaborator input scheduled for a given tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventConfig {
    pub tick: u64,
    pub action: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

impl EventConfig {
    pub fn command(&self) -> Result<Command> {
        let value = || {
            self.value
                .ok_or_else(|| invalid(format!("{:?} event at tick {} needs a value", self.action, self.tick)))
        };
        Ok(match self.action {
            ActionKind::Click => match (self.x, self.y) {
                (Some(x), Some(y)) => Command::Click { x, y },
                _ => {
                    return Err(invalid(format!(
                        "click event at tick {} needs x and y",
                        self.tick
                    )))
                }
            },
            ActionKind::Reset => Command::Reset,
            ActionKind::TogglePinMode => Command::TogglePinMode,
            ActionKind::SetPulseAmplitude => Command::SetPulseAmplitude(value()?),
            ActionKind::SetPressStrength => Command::SetPressStrength(value()?),
        })
    }
}

/// Complete configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub grid: GridConfig,
    pub physics: PhysicsConfig,
    pub excitation: ExcitationConfig,
    pub relaxation: RelaxationConfig,
    pub run: RunConfig,
    pub events: Vec<EventConfig>,
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<()> {
        self.grid.domain()?;
        self.physics.validate()?;
        self.excitation
            .validate(self.grid.width.max(self.grid.height) as f64)?;
        self.relaxation.validate()?;
        self.run.validate()?;

        for event in &self.events {
            event.command()?;
        }
        if self.events.iter().any(|e| e.tick >= self.run.ticks) {
            warn!("Some events are scheduled after the last tick and will never fire");
        }
        Ok(())
    }

    /// Scripted commands in firing order.
    pub fn schedule(&self) -> Result<Vec<(u64, Command)>> {
        let mut schedule = self
            .events
            .iter()
            .map(|e| -> Result<(u64, Command)> { Ok((e.tick, e.command()?)) })
            .collect::<Result<Vec<_>>>()?;
        schedule.sort_by_key(|&(tick, _)| tick);
        Ok(schedule)
    }

    pub fn log_summary(&self) {
        info!("=== Membrane Configuration ===");
        info!(
            "Grid: {}x{} (margin {}, disc radius {})",
            self.grid.width,
            self.grid.height,
            self.grid.margin,
            self.grid.width.min(self.grid.height) as f64 / 2.0 - self.grid.margin
        );
        info!(
            "Physics: c^2={}, damping={}",
            self.physics.c_squared, self.physics.damping
        );
        info!(
            "Pulse: [{}, {}] default {}; press: [{}, {}] default {}",
            self.excitation.pulse_min,
            self.excitation.pulse_max,
            self.excitation.pulse_default,
            self.excitation.press_min,
            self.excitation.press_max,
            self.excitation.press_default
        );
        if let Ok(domain) = self.grid.domain() {
            info!("Interior cells: {}", domain.interior_count());
        }
        info!("Relaxation: {} passes", self.relaxation.passes);
        info!(
            "Run: {} ticks, frame every {} ticks, {} event(s)",
            self.run.ticks,
            self.run.frame_interval,
            self.events.len()
        );
        info!("==============================");
    }
}
