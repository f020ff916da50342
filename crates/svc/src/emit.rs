//! Turning button events into pooled LED events.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ao::Sender;
use hal::Led;
use heapless::Vec;
use log::warn;

use crate::button::{ButtonEvent, PressClass};
use crate::error::EmitError;
use crate::led::{LedBlock, LedEvent, LedPool};

/// Most LED events a single button event expands to.
pub const MAX_ACTIONS: usize = 2;

/// Which LED each press class acts on.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bindings {
    /// Toggled by a short press.
    pub primary: Led,
    /// Toggled by a long press.
    pub secondary: Led,
}

impl Default for Bindings {
    fn default() -> Self {
        Self {
            primary: Led::Green,
            secondary: Led::Red,
        }
    }
}

/// LED events for one button event, in emission order.
///
/// Entering `Blocked` lights both LEDs; releasing a blocked press turns them
/// off again. Releases of shorter presses emit nothing.
pub fn actions_for(event: ButtonEvent, bindings: Bindings) -> Vec<LedEvent, MAX_ACTIONS> {
    let Bindings { primary, secondary } = bindings;
    let mut actions = Vec::new();
    match event {
        ButtonEvent::Classified(PressClass::Short) => actions.extend([LedEvent::Toggle(primary)]),
        ButtonEvent::Classified(PressClass::Long) => actions.extend([LedEvent::Toggle(secondary)]),
        ButtonEvent::Classified(PressClass::Blocked) => {
            actions.extend([LedEvent::On(primary), LedEvent::On(secondary)])
        }
        ButtonEvent::Released(PressClass::Blocked) => {
            actions.extend([LedEvent::Off(primary), LedEvent::Off(secondary)])
        }
        ButtonEvent::Classified(PressClass::Initial) | ButtonEvent::Released(_) => {}
    }
    actions
}

/// What to do when the LED queue is full.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmitPolicy {
    /// Block until the queue accepts; drop only if the LED object is gone.
    #[default]
    Drop,
    /// Wait at most `timeout` for queue space, then drop.
    Backpressure { timeout: Duration },
}

/// Emission health counters.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitStats {
    pub sent: u64,
    pub dropped_no_block: u64,
    pub dropped_send_failed: u64,
}

impl EmitStats {
    pub fn dropped(&self) -> u64 {
        self.dropped_no_block + self.dropped_send_failed
    }
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    sent: AtomicU64,
    dropped_no_block: AtomicU64,
    dropped_send_failed: AtomicU64,
}

impl Counters {
    pub(crate) fn snapshot(&self) -> EmitStats {
        EmitStats {
            sent: self.sent.load(Ordering::Relaxed),
            dropped_no_block: self.dropped_no_block.load(Ordering::Relaxed),
            dropped_send_failed: self.dropped_send_failed.load(Ordering::Relaxed),
        }
    }
}

/// Producer side of the LED object: allocates, fills and sends event blocks.
///
/// Clones share the same counters.
pub struct LedEmitter<const N: usize> {
    pool: Arc<LedPool<N>>,
    target: Sender<LedBlock<N>>,
    policy: EmitPolicy,
    counters: Arc<Counters>,
}

impl<const N: usize> Clone for LedEmitter<N> {
    fn clone(&self) -> Self {
        Self {
            pool: Arc::clone(&self.pool),
            target: self.target.clone(),
            policy: self.policy,
            counters: Arc::clone(&self.counters),
        }
    }
}

impl<const N: usize> LedEmitter<N> {
    pub fn new(pool: Arc<LedPool<N>>, target: Sender<LedBlock<N>>, policy: EmitPolicy) -> Self {
        Self {
            pool,
            target,
            policy,
            counters: Arc::default(),
        }
    }

    pub fn policy(&self) -> EmitPolicy {
        self.policy
    }

    pub fn pool(&self) -> &Arc<LedPool<N>> {
        &self.pool
    }

    /// Send one event. Failures are counted and logged, never fatal.
    pub fn emit(&self, event: LedEvent) -> Result<(), EmitError> {
        let Some(mut block) = self.pool.acquire() else {
            self.counters.dropped_no_block.fetch_add(1, Ordering::Relaxed);
            warn!("cannot allocate more events, dropping {}", event);
            return Err(EmitError::PoolExhausted);
        };
        block.write(event);

        let result = match self.policy {
            EmitPolicy::Drop => self.target.send(block),
            EmitPolicy::Backpressure { timeout } => self.target.send_timeout(block, timeout),
        };
        match result {
            Ok(()) => {
                self.counters.sent.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(err) => {
                self.counters.dropped_send_failed.fetch_add(1, Ordering::Relaxed);
                warn!("error sending event {} to `{}`: {}", event, self.target.name(), err);
                self.pool.release(Some(err.into_event()));
                Err(EmitError::SendFailed(self.target.name()))
            }
        }
    }

    /// Emit every action for `event`. Each is attempted even if an earlier one failed.
    pub fn emit_all(&self, event: ButtonEvent, bindings: Bindings) -> usize {
        actions_for(event, bindings)
            .into_iter()
            .filter(|action| self.emit(*action).is_ok())
            .count()
    }

    pub fn stats(&self) -> EmitStats {
        self.counters.snapshot()
    }

    /// Counters that outlive this emitter without holding the LED queue open.
    pub(crate) fn counters(&self) -> Arc<Counters> {
        Arc::clone(&self.counters)
    }
}
