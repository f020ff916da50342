use std::io;

use thiserror::Error;

/// Rejected debounce or service configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("tick period must be non-zero")]
    ZeroTick,
    #[error("thresholds must increase: short {short_ms} ms < long {long_ms} ms < blocked {blocked_ms} ms")]
    ThresholdOrder {
        short_ms: u32,
        long_ms: u32,
        blocked_ms: u32,
    },
}

/// Why one emission did not reach the LED object. Never fatal.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitError {
    #[error("cannot allocate more events")]
    PoolExhausted,
    #[error("error sending event to the `{0}` queue")]
    SendFailed(&'static str),
}

/// Start-up failures of a service worker.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to spawn `{name}` worker: {source}")]
    Spawn {
        name: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("`{name}` worker panicked")]
    WorkerPanicked { name: &'static str },
}
