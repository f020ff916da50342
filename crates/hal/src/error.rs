//! Common error types for HAL operations

use thiserror::Error;

/// HAL operation errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalError {
    /// Index does not name a pin on this board
    #[error("no such {kind}: {index}")]
    UnknownPin { kind: &'static str, index: usize },
    /// Operation not supported by this pin
    #[error("operation not supported")]
    NotSupported,
    /// Hardware error occurred
    #[error("hardware error")]
    HardwareError,
}

/// Result type for HAL operations
pub type HalResult<T> = Result<T, HalError>;
