//! # svc
//!
//! Application services of the button/LED controller.
//!
//! ## Module Overview
//! - [`led`]     – LED events and the responder behavior bound to the LED active object.
//! - [`button`]  – Debounce and press classification state machine.
//! - [`emit`]    – Press-to-LED bindings and the pooled event emitter.
//! - [`service`] – The tick-driven button worker.
//! - [`filter`]  – Shift-register debounce filter for raw samples.
//!
//! Nothing here is global: the event pool and the LED object's sender are
//! handed to the services when the application wires them together.

pub mod button;
pub mod emit;
pub mod error;
pub mod filter;
pub mod led;
pub mod service;

pub use button::{
    ButtonEvent, DebounceConfig, DebounceConfigBuilder, DebounceState, Debouncer, PressClass,
};
pub use emit::{actions_for, Bindings, EmitPolicy, EmitStats, LedEmitter};
pub use error::{ConfigError, EmitError, ServiceError};
pub use filter::ShiftDebouncer;
pub use led::{LedBlock, LedEvent, LedEventError, LedPool, LedResponder};
pub use service::{ButtonService, ButtonServiceConfig, ButtonWorker};
