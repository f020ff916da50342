//! Push button input

use crate::error::{HalError, HalResult};
use crate::gpio::{GpioPin, Pull};

/// Identifies a button on the board
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ButtonId(pub u8);

impl ButtonId {
    /// The user button
    pub const USER: ButtonId = ButtonId(0);
}

/// Logical button state, independent of wiring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonStatus {
    Released,
    Pressed,
}

impl ButtonStatus {
    pub fn is_pressed(self) -> bool {
        self == ButtonStatus::Pressed
    }
}

impl From<bool> for ButtonStatus {
    fn from(pressed: bool) -> Self {
        if pressed {
            ButtonStatus::Pressed
        } else {
            ButtonStatus::Released
        }
    }
}

/// Input sampling collaborator, called once per debounce tick.
///
/// Implementations return the logical state; electrical polarity is already
/// accounted for.
pub trait ButtonInput: Send {
    fn read(&self, button: ButtonId) -> HalResult<ButtonStatus>;
}

/// A button wired to one GPIO input.
pub struct ButtonPin<P> {
    id: ButtonId,
    pin: P,
    pull: Pull,
}

impl<P: GpioPin> ButtonPin<P> {
    pub fn new(id: ButtonId, pin: P, pull: Pull) -> Self {
        Self { id, pin, pull }
    }

    pub fn id(&self) -> ButtonId {
        self.id
    }
}

impl<P: GpioPin> ButtonInput for ButtonPin<P> {
    fn read(&self, button: ButtonId) -> HalResult<ButtonStatus> {
        if button != self.id {
            return Err(HalError::UnknownPin {
                kind: "button",
                index: button.0 as usize,
            });
        }
        let level = self.pin.read()?;
        Ok(ButtonStatus::from(level == self.pull.active_level()))
    }
}
