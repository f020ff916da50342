//! The button service: samples the button every tick and drives the LEDs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use hal::{ButtonId, ButtonInput, ButtonStatus};
use log::{debug, error, info, warn};

use crate::button::{ButtonEvent, DebounceConfig, Debouncer};
use crate::emit::{Bindings, Counters, EmitStats, LedEmitter};
use crate::error::{ConfigError, ServiceError};

/// Static description of one button service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonServiceConfig {
    pub name: &'static str,
    pub button: ButtonId,
    pub stack_size: usize,
    pub debounce: DebounceConfig,
    pub bindings: Bindings,
}

impl Default for ButtonServiceConfig {
    fn default() -> Self {
        Self {
            name: "button",
            button: ButtonId::USER,
            stack_size: ao::DEFAULT_STACK_SIZE,
            debounce: DebounceConfig::default(),
            bindings: Bindings::default(),
        }
    }
}

/// Debounces one button and turns classified presses into LED events.
///
/// [`ButtonService::step`] runs a single tick and can be driven by hand;
/// [`ButtonService::spawn`] runs it on its own thread at the configured period.
pub struct ButtonService<I, const N: usize> {
    name: &'static str,
    stack_size: usize,
    button: ButtonId,
    bindings: Bindings,
    input: I,
    debouncer: Debouncer,
    emitter: LedEmitter<N>,
}

impl<I: ButtonInput, const N: usize> ButtonService<I, N> {
    pub fn new(
        config: ButtonServiceConfig,
        input: I,
        emitter: LedEmitter<N>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            name: config.name,
            stack_size: config.stack_size,
            button: config.button,
            bindings: config.bindings,
            input,
            debouncer: Debouncer::new(config.debounce)?,
            emitter,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn debouncer(&self) -> &Debouncer {
        &self.debouncer
    }

    pub fn stats(&self) -> EmitStats {
        self.emitter.stats()
    }

    /// Read the button. A failed read counts as released.
    pub fn sample(&self) -> ButtonStatus {
        match self.input.read(self.button) {
            Ok(status) => status,
            Err(err) => {
                warn!("[{}] failed to read button: {}", self.name, err);
                ButtonStatus::Released
            }
        }
    }

    /// Run one tick on a fresh sample.
    pub fn step(&mut self) -> Option<ButtonEvent> {
        let status = self.sample();
        self.step_with(status)
    }

    /// Run one tick on an externally supplied sample.
    pub fn step_with(&mut self, status: ButtonStatus) -> Option<ButtonEvent> {
        let event = self.debouncer.tick(status)?;
        match event {
            ButtonEvent::Classified(class) => {
                info!("[{}] {:?} press after {} ms", self.name, class, self.debouncer.held_ms());
            }
            ButtonEvent::Released(class) => {
                info!("[{}] released ({:?})", self.name, class);
            }
        }
        self.emitter.emit_all(event, self.bindings);
        Some(event)
    }

    /// Move the service onto its own thread, ticking until stopped.
    pub fn spawn(self) -> Result<ButtonWorker<I, N>, ServiceError>
    where
        I: 'static,
    {
        let name = self.name;
        let stop = Arc::new(AtomicBool::new(false));
        let counters = self.emitter.counters();
        let period = Duration::from_millis(u64::from(self.debouncer.config().tick_ms));

        let flag = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name(name.to_string())
            .stack_size(self.stack_size)
            .spawn(move || self.run(period, &flag))
            .map_err(|source| {
                error!("[{name}] error creating worker: {source}");
                ServiceError::Spawn { name, source }
            })?;

        Ok(ButtonWorker {
            name,
            stop,
            counters,
            handle,
        })
    }

    /// Sleeps to absolute deadlines so the period does not drift.
    fn run(mut self, period: Duration, stop: &AtomicBool) -> Self {
        info!("[{}] task running, tick {:?}", self.name, period);
        let mut next_tick = Instant::now();

        while !stop.load(Ordering::Acquire) {
            self.step();

            next_tick += period;
            let now = Instant::now();
            if next_tick > now {
                thread::sleep(next_tick - now);
            }
        }

        debug!("[{}] stopped", self.name);
        self
    }
}

/// Handle to a running button service.
pub struct ButtonWorker<I, const N: usize> {
    name: &'static str,
    stop: Arc<AtomicBool>,
    counters: Arc<Counters>,
    handle: JoinHandle<ButtonService<I, N>>,
}

impl<I, const N: usize> ButtonWorker<I, N> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn stats(&self) -> EmitStats {
        self.counters.snapshot()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stop ticking and hand the service back.
    pub fn stop(self) -> Result<ButtonService<I, N>, ServiceError> {
        self.stop.store(true, Ordering::Release);
        let name = self.name;
        self.handle
            .join()
            .map_err(|_| ServiceError::WorkerPanicked { name })
    }
}
