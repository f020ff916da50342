//! # ao
//!
//! Active objects for small event-driven controllers. Each active object owns
//! a bounded FIFO, one worker thread that drains it, and a [`Behavior`] that
//! is dispatched once per event. Because a single worker ever touches the
//! behavior, handlers mutate their private state without locking.
//!
//! ## Module Overview
//! - [`event`]  – Signals and the raw event envelope.
//! - [`active`] – Active object worker, sender handles and behaviors.
//! - [`config`] – Start-up configuration with a builder.
//! - [`error`]  – Construction and send failures.

pub mod active;
pub mod config;
pub mod error;
pub mod event;

pub use active::{from_fn, ActiveContext, ActiveObject, Behavior, FnBehavior, Sender};
pub use config::{ActiveObjectConfig, ActiveObjectConfigBuilder};
pub use error::{AoError, SendError};
pub use event::{Event, Signal};

/// Default event queue capacity for active objects.
pub const DEFAULT_QUEUE_CAPACITY: usize = 16;

/// Default worker stack budget in bytes.
pub const DEFAULT_STACK_SIZE: usize = 64 * 1024;
