//! Active object abstraction.
//!
//! An active object couples a bounded FIFO with exactly one worker thread.
//! The worker suspends on the queue, hands each event to its [`Behavior`] and
//! loops. Producers hold cloneable [`Sender`] handles; there is no global
//! registry.

use std::marker::PhantomData;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, SendTimeoutError, TrySendError};
use log::{debug, error, info};

use crate::config::ActiveObjectConfig;
use crate::error::{AoError, SendError};

/// Per-dispatch context passed to behaviors.
#[derive(Debug)]
pub struct ActiveContext {
    name: &'static str,
    dispatched: u64,
}

impl ActiveContext {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            dispatched: 0,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of events fully dispatched before the current one.
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }
}

/// Trait implemented by the consumer bound to an active object.
///
/// `on_event` is never re-entered: one worker drains the queue, so state owned
/// by the behavior needs no locking.
pub trait Behavior: Send + 'static {
    type Event: Send + 'static;

    /// Runs once on the worker before the first event.
    fn on_start(&mut self, _ctx: &mut ActiveContext) {}

    fn on_event(&mut self, ctx: &mut ActiveContext, event: Self::Event);
}

/// Behavior backed by a closure.
pub struct FnBehavior<E, F> {
    handler: F,
    _event: PhantomData<fn(E)>,
}

/// Wrap a closure as a [`Behavior`].
pub fn from_fn<E, F>(handler: F) -> FnBehavior<E, F>
where
    E: Send + 'static,
    F: FnMut(&mut ActiveContext, E) + Send + 'static,
{
    FnBehavior {
        handler,
        _event: PhantomData,
    }
}

impl<E, F> Behavior for FnBehavior<E, F>
where
    E: Send + 'static,
    F: FnMut(&mut ActiveContext, E) + Send + 'static,
{
    type Event = E;

    fn on_event(&mut self, ctx: &mut ActiveContext, event: E) {
        (self.handler)(ctx, event)
    }
}

/// Producer handle for an active object's queue.
pub struct Sender<E> {
    name: &'static str,
    inner: crossbeam_channel::Sender<E>,
}

impl<E> Clone for Sender<E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            inner: self.inner.clone(),
        }
    }
}

impl<E> Sender<E> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Enqueue `event`, blocking while the queue is full.
    ///
    /// Only fails when the worker is gone.
    pub fn send(&self, event: E) -> Result<(), SendError<E>> {
        self.inner
            .send(event)
            .map_err(|err| SendError::Disconnected {
                name: self.name,
                event: err.into_inner(),
            })
    }

    /// Enqueue `event` only if there is room right now.
    pub fn try_send(&self, event: E) -> Result<(), SendError<E>> {
        self.inner.try_send(event).map_err(|err| match err {
            TrySendError::Full(event) => SendError::Full {
                name: self.name,
                event,
            },
            TrySendError::Disconnected(event) => SendError::Disconnected {
                name: self.name,
                event,
            },
        })
    }

    /// Enqueue `event`, waiting at most `timeout` for room.
    pub fn send_timeout(&self, event: E, timeout: Duration) -> Result<(), SendError<E>> {
        self.inner
            .send_timeout(event, timeout)
            .map_err(|err| match err {
                SendTimeoutError::Timeout(event) => SendError::Timeout {
                    name: self.name,
                    event,
                },
                SendTimeoutError::Disconnected(event) => SendError::Disconnected {
                    name: self.name,
                    event,
                },
            })
    }

    /// Events currently waiting in the queue.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.inner.is_full()
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity().unwrap_or(usize::MAX)
    }
}

/// A running active object.
///
/// Lives for the whole process in normal operation. [`ActiveObject::join`] is
/// the orderly way down: the worker drains what is queued and exits once
/// every [`Sender`] is dropped.
pub struct ActiveObject<E> {
    sender: Sender<E>,
    worker: JoinHandle<()>,
}

impl<E: Send + 'static> ActiveObject<E> {
    /// Create the queue and spawn the worker.
    ///
    /// A failure here means the system cannot run as designed; callers treat
    /// it as fatal rather than retrying.
    pub fn start<B>(config: ActiveObjectConfig, behavior: B) -> Result<Self, AoError>
    where
        B: Behavior<Event = E>,
    {
        config.validate()?;

        let name = config.name;
        let (tx, rx) = crossbeam_channel::bounded(config.queue_capacity);

        let worker = thread::Builder::new()
            .name(name.to_string())
            .stack_size(config.stack_size)
            .spawn(move || run(name, behavior, rx))
            .map_err(|source| {
                error!("[AO] error creating worker \"{name}\": {source}");
                AoError::Spawn { name, source }
            })?;

        info!(
            "[AO] active object \"{name}\" created (queue capacity {})",
            config.queue_capacity
        );

        Ok(Self {
            sender: Sender { name, inner: tx },
            worker,
        })
    }

    pub fn name(&self) -> &'static str {
        self.sender.name
    }

    /// A new producer handle for this object's queue.
    pub fn sender(&self) -> Sender<E> {
        self.sender.clone()
    }

    /// Blocking send through the object's own handle.
    pub fn send(&self, event: E) -> Result<(), SendError<E>> {
        self.sender.send(event)
    }

    pub fn try_send(&self, event: E) -> Result<(), SendError<E>> {
        self.sender.try_send(event)
    }

    pub fn send_timeout(&self, event: E, timeout: Duration) -> Result<(), SendError<E>> {
        self.sender.send_timeout(event, timeout)
    }

    pub fn len(&self) -> usize {
        self.sender.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sender.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.sender.capacity()
    }

    /// Close this handle's side of the queue and wait for the worker.
    ///
    /// Blocks until every other [`Sender`] has been dropped and the queue is
    /// drained.
    pub fn join(self) -> Result<(), AoError> {
        let Self { sender, worker } = self;
        let name = sender.name;
        drop(sender);
        worker
            .join()
            .map_err(|_| AoError::WorkerPanicked { name })
    }
}

fn run<B: Behavior>(name: &'static str, mut behavior: B, queue: Receiver<B::Event>) {
    let mut ctx = ActiveContext::new(name);
    info!("[{name}] task running");
    behavior.on_start(&mut ctx);

    for event in queue.iter() {
        behavior.on_event(&mut ctx, event);
        ctx.dispatched += 1;
    }

    debug!("[{name}] queue closed after {} events", ctx.dispatched);
}
