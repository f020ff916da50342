//! LED events and the responder that applies them.

use core::fmt;
use std::sync::Arc;

use ao::{ActiveContext, Behavior, Event, Signal};
use hal::{Led, LedOutput};
use log::{debug, warn};
use mempool::{Block, MemoryPool};
use thiserror::Error;

/// Pool the button service allocates LED events from.
pub type LedPool<const N: usize> = MemoryPool<LedEvent, N>;

/// One pooled LED event, as it travels through the LED object's queue.
pub type LedBlock<const N: usize> = Block<LedEvent, N>;

/// Command for the LED active object.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedEvent {
    On(Led),
    Off(Led),
    Toggle(Led),
}

impl LedEvent {
    pub const ON: Signal = Signal(0);
    pub const OFF: Signal = Signal(1);
    pub const TOGGLE: Signal = Signal(2);

    pub fn signal(&self) -> Signal {
        match self {
            LedEvent::On(_) => Self::ON,
            LedEvent::Off(_) => Self::OFF,
            LedEvent::Toggle(_) => Self::TOGGLE,
        }
    }

    pub fn led(&self) -> Led {
        match *self {
            LedEvent::On(led) | LedEvent::Off(led) | LedEvent::Toggle(led) => led,
        }
    }

    /// Decode the untyped form, where the payload is the LED index.
    pub fn from_raw(event: Event<u32>) -> Result<Self, LedEventError> {
        let led = usize::try_from(event.payload)
            .ok()
            .and_then(|index| Led::from_index(index).ok())
            .ok_or(LedEventError::UnknownLed(event.payload))?;

        match event.signal {
            Self::ON => Ok(LedEvent::On(led)),
            Self::OFF => Ok(LedEvent::Off(led)),
            Self::TOGGLE => Ok(LedEvent::Toggle(led)),
            other => Err(LedEventError::UnknownSignal(other)),
        }
    }

    pub fn into_raw(self) -> Event<u32> {
        Event::new(self.signal(), self.led().index() as u32)
    }
}

impl fmt::Display for LedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedEvent::On(led) => write!(f, "on {led}"),
            LedEvent::Off(led) => write!(f, "off {led}"),
            LedEvent::Toggle(led) => write!(f, "toggle {led}"),
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedEventError {
    #[error("unknown led signal {0}")]
    UnknownSignal(Signal),
    #[error("unknown led id {0}")]
    UnknownLed(u32),
}

/// Behavior of the LED active object.
///
/// Applies each event to the LED bank and hands the block back to `pool`.
/// Blocks from any other pool are a wiring bug and abort the worker.
pub struct LedResponder<O, const N: usize> {
    leds: O,
    pool: Arc<LedPool<N>>,
}

impl<O: LedOutput, const N: usize> LedResponder<O, N> {
    pub fn new(leds: O, pool: Arc<LedPool<N>>) -> Self {
        Self { leds, pool }
    }
}

impl<O: LedOutput + 'static, const N: usize> Behavior for LedResponder<O, N> {
    type Event = LedBlock<N>;

    fn on_event(&mut self, ctx: &mut ActiveContext, block: LedBlock<N>) {
        let Some(&event) = block.get() else {
            panic!("[{}] corrupted message: empty event block {}", ctx.name(), block.index());
        };
        debug!("[{}] event received: {}", ctx.name(), event);

        let result = match event {
            LedEvent::On(led) => self.leds.set(led),
            LedEvent::Off(led) => self.leds.clear(led),
            LedEvent::Toggle(led) => self.leds.toggle(led),
        };
        if let Err(err) = result {
            warn!("[{}] failed to apply {}: {}", ctx.name(), event, err);
        }

        self.pool.release(Some(block));
    }
}
