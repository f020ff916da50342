//! Hardware collaborators for the controller
//!
//! Vendor-agnostic traits for the two peripherals the services talk to: a
//! push button sampled by the debounce worker and a bank of LEDs driven by the
//! LED active object. The [`sim`] module backs both with in-memory pins so
//! the whole system runs on a host.

pub mod button;
pub mod error;
pub mod gpio;
pub mod led;
pub mod sim;

// Re-export commonly used types
pub use button::{ButtonId, ButtonInput, ButtonPin, ButtonStatus};
pub use error::{HalError, HalResult};
pub use gpio::{GpioPin, Level, Polarity, Pull};
pub use led::{Led, LedOutput, LedPins, LedStatus};
