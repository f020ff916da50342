//! In-memory pins for host runs and tests.
//!
//! Every simulated peripheral is a cheap handle around shared state, so a
//! test can keep one clone to drive or observe it while a worker owns another.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::button::{ButtonId, ButtonInput, ButtonStatus};
use crate::error::{HalError, HalResult};
use crate::gpio::{GpioPin, Level};
use crate::led::{Led, LedOutput, LedStatus};

/// A GPIO line whose level lives in memory.
#[derive(Debug, Clone)]
pub struct SimPin {
    level: Arc<Mutex<Level>>,
}

impl SimPin {
    pub fn new(level: Level) -> Self {
        Self {
            level: Arc::new(Mutex::new(level)),
        }
    }

    pub fn level(&self) -> Level {
        *self.level.lock()
    }

    /// Drive the line from outside, as the board would.
    pub fn set_level(&self, level: Level) {
        *self.level.lock() = level;
    }
}

impl GpioPin for SimPin {
    fn read(&self) -> HalResult<Level> {
        Ok(self.level())
    }

    fn write(&mut self, level: Level) -> HalResult<()> {
        self.set_level(level);
        Ok(())
    }
}

/// The user button, already polarity-normalised.
#[derive(Debug, Clone)]
pub struct SimButton {
    id: ButtonId,
    status: Arc<Mutex<ButtonStatus>>,
}

impl SimButton {
    pub fn new(id: ButtonId) -> Self {
        Self {
            id,
            status: Arc::new(Mutex::new(ButtonStatus::Released)),
        }
    }

    pub fn press(&self) {
        self.set(ButtonStatus::Pressed);
    }

    pub fn release(&self) {
        self.set(ButtonStatus::Released);
    }

    pub fn set(&self, status: ButtonStatus) {
        *self.status.lock() = status;
    }

    pub fn status(&self) -> ButtonStatus {
        *self.status.lock()
    }
}

impl Default for SimButton {
    fn default() -> Self {
        Self::new(ButtonId::USER)
    }
}

impl ButtonInput for SimButton {
    fn read(&self, button: ButtonId) -> HalResult<ButtonStatus> {
        if button != self.id {
            return Err(HalError::UnknownPin {
                kind: "button",
                index: button.0 as usize,
            });
        }
        Ok(self.status())
    }
}

#[derive(Debug)]
struct LedBank {
    status: [LedStatus; Led::COUNT],
    history: Vec<(Led, LedStatus)>,
}

/// LED bank that remembers every write.
#[derive(Debug, Clone)]
pub struct SimLeds {
    bank: Arc<Mutex<LedBank>>,
}

impl SimLeds {
    pub fn new() -> Self {
        Self {
            bank: Arc::new(Mutex::new(LedBank {
                status: [LedStatus::Off; Led::COUNT],
                history: Vec::new(),
            })),
        }
    }

    pub fn status(&self, led: Led) -> LedStatus {
        self.bank.lock().status[led.index()]
    }

    pub fn is_on(&self, led: Led) -> bool {
        self.status(led) == LedStatus::On
    }

    /// Every state applied so far, oldest first.
    pub fn history(&self) -> Vec<(Led, LedStatus)> {
        self.bank.lock().history.clone()
    }
}

impl Default for SimLeds {
    fn default() -> Self {
        Self::new()
    }
}

impl LedOutput for SimLeds {
    fn write(&mut self, led: Led, status: LedStatus) -> HalResult<()> {
        let mut bank = self.bank.lock();
        bank.status[led.index()] = status;
        bank.history.push((led, status));
        Ok(())
    }

    fn toggle(&mut self, led: Led) -> HalResult<()> {
        let next = match self.status(led) {
            LedStatus::On => LedStatus::Off,
            LedStatus::Off => LedStatus::On,
        };
        self.write(led, next)
    }
}
