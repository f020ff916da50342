//! GPIO (General Purpose Input/Output) abstraction

use crate::error::HalResult;

/// GPIO pin levels
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Low level (0V)
    Low,
    /// High level (VCC)
    High,
}

impl Level {
    pub fn toggled(self) -> Self {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

/// Bias resistor on an input pin
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pull {
    /// No bias; the button drives the line high when pressed
    #[default]
    None,
    /// Pull-up; a pressed button shorts the line low
    Up,
    /// Pull-down; a pressed button drives the line high
    Down,
}

impl Pull {
    /// Level read while the button is held.
    pub fn active_level(self) -> Level {
        match self {
            Pull::Up => Level::Low,
            Pull::None | Pull::Down => Level::High,
        }
    }
}

/// Which level lights an output
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Polarity {
    /// A logical 0 turns the output on
    ActiveLow,
    /// A logical 1 turns the output on
    #[default]
    ActiveHigh,
}

impl Polarity {
    /// Level to drive for the requested logical state.
    pub fn level(self, on: bool) -> Level {
        match (self, on) {
            (Polarity::ActiveHigh, true) | (Polarity::ActiveLow, false) => Level::High,
            (Polarity::ActiveHigh, false) | (Polarity::ActiveLow, true) => Level::Low,
        }
    }
}

/// GPIO pin trait (object-safe)
pub trait GpioPin: Send {
    /// Read current level
    fn read(&self) -> HalResult<Level>;

    /// Write level (for output pins)
    fn write(&mut self, level: Level) -> HalResult<()>;

    /// Toggle output
    fn toggle(&mut self) -> HalResult<()> {
        let current = self.read()?;
        self.write(current.toggled())
    }
}
