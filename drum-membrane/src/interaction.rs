//! Click semantics: whether a click places the pin, taps, or is rejected.

use crate::excitation::Pin;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Next click places the pin.
    #[default]
    AwaitingPin,
    /// Pin is set; clicks elsewhere tap.
    Tapping,
    /// No pin; every click clears the membrane and taps.
    PinDisabled,
}

impl Mode {
    /// Decide what a click on an interior cell does in this mode.
    pub fn on_click(self, cell: (usize, usize), pin: Option<&Pin>) -> ClickAction {
        match self {
            Mode::AwaitingPin => ClickAction::PlacePin,
            Mode::Tapping => match pin {
                Some(pin) if pin.reaches(cell.0, cell.1) => ClickAction::RejectOnPin,
                _ => ClickAction::Tap,
            },
            Mode::PinDisabled => ClickAction::ClearAndTap,
        }
    }

    /// Mode after the pin-mode toggle fires.
    pub fn toggled(self) -> Mode {
        match self {
            Mode::AwaitingPin | Mode::Tapping => Mode::PinDisabled,
            Mode::PinDisabled => Mode::AwaitingPin,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickAction {
    PlacePin,
    Tap,
    ClearAndTap,
    RejectOnPin,
}

/// Slider values supplied by the UI before each relevant call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Controls {
    pub pulse_amplitude: f64,
    pub press_strength: f64,
}

/// Inputs from the outside world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Click { x: i64, y: i64 },
    Reset,
    TogglePinMode,
    SetPulseAmplitude(f64),
    SetPressStrength(f64),
}

/// Result of a click, also rendered as the status line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    PinPlaced { x: usize, y: usize },
    Tapped { x: usize, y: usize, amplitude: f64 },
    OnPin { x: usize, y: usize },
    Ignored,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::PinPlaced { x, y } => write!(f, "Pin placed at ({}, {})", x, y),
            Outcome::Tapped { x, y, amplitude } => {
                write!(f, "Tapped ({}, {}) with strength {}", x, y, amplitude)
            }
            Outcome::OnPin { x, y } => {
                write!(f, "({}, {}) is held by the pin; tap somewhere else", x, y)
            }
            Outcome::Ignored => write!(f, "Click missed the membrane"),
        }
    }
}
