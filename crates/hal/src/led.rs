//! LED outputs

use core::fmt;

use crate::error::{HalError, HalResult};
use crate::gpio::{GpioPin, Polarity};

/// LEDs available on the board
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Led {
    Green = 0,
    Blue = 1,
    Red = 2,
}

impl Led {
    pub const COUNT: usize = 3;
    pub const ALL: [Led; Led::COUNT] = [Led::Green, Led::Blue, Led::Red];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> HalResult<Led> {
        Led::ALL
            .get(index)
            .copied()
            .ok_or(HalError::UnknownPin { kind: "led", index })
    }
}

impl fmt::Display for Led {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Led::Green => "green",
            Led::Blue => "blue",
            Led::Red => "red",
        };
        f.pad(name)
    }
}

/// Logical LED state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedStatus {
    Off,
    On,
}

/// Actuator collaborator driven by the LED active object.
pub trait LedOutput: Send {
    /// Drive `led` to the requested logical state.
    fn write(&mut self, led: Led, status: LedStatus) -> HalResult<()>;

    fn toggle(&mut self, led: Led) -> HalResult<()>;

    /// Turn `led` on. Equivalent to `write(led, LedStatus::On)`.
    fn set(&mut self, led: Led) -> HalResult<()> {
        self.write(led, LedStatus::On)
    }

    /// Turn `led` off. Equivalent to `write(led, LedStatus::Off)`.
    fn clear(&mut self, led: Led) -> HalResult<()> {
        self.write(led, LedStatus::Off)
    }
}

/// One GPIO output per LED, each with its own polarity.
pub struct LedPins<P> {
    pins: [(P, Polarity); Led::COUNT],
}

impl<P: GpioPin> LedPins<P> {
    /// `pins` is indexed by [`Led::index`].
    pub fn new(pins: [(P, Polarity); Led::COUNT]) -> Self {
        Self { pins }
    }
}

impl<P: GpioPin> LedOutput for LedPins<P> {
    fn write(&mut self, led: Led, status: LedStatus) -> HalResult<()> {
        let (pin, polarity) = &mut self.pins[led.index()];
        pin.write(polarity.level(status == LedStatus::On))
    }

    fn toggle(&mut self, led: Led) -> HalResult<()> {
        self.pins[led.index()].0.toggle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpio::Level;
    use crate::sim::SimPin;

    #[test]
    fn index_round_trips() {
        for led in Led::ALL {
            assert_eq!(Led::from_index(led.index()), Ok(led));
        }
        assert!(Led::from_index(Led::COUNT).is_err());
    }

    #[test]
    fn active_low_led_drives_low_when_on() {
        let green = SimPin::new(Level::High);
        let blue = SimPin::new(Level::Low);
        let red = SimPin::new(Level::Low);
        let mut leds = LedPins::new([
            (green.clone(), Polarity::ActiveLow),
            (blue.clone(), Polarity::ActiveHigh),
            (red.clone(), Polarity::ActiveHigh),
        ]);

        leds.set(Led::Green).unwrap();
        leds.set(Led::Red).unwrap();
        assert_eq!(green.level(), Level::Low);
        assert_eq!(red.level(), Level::High);

        leds.clear(Led::Green).unwrap();
        assert_eq!(green.level(), Level::High);

        leds.toggle(Led::Blue).unwrap();
        assert_eq!(blue.level(), Level::High);
    }
}
