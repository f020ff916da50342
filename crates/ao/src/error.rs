use core::fmt;
use std::io;

use thiserror::Error;

/// Failures while bringing an active object up or down.
#[derive(Error, Debug)]
pub enum AoError {
    #[error("invalid active object configuration: {0}")]
    InvalidConfig(&'static str),
    #[error("failed to spawn worker `{name}`: {source}")]
    Spawn {
        name: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("worker `{name}` panicked")]
    WorkerPanicked { name: &'static str },
}

/// A send that did not enqueue. The event is handed back so the caller can
/// release whatever storage it occupies.
#[derive(Error)]
pub enum SendError<E> {
    #[error("queue of `{name}` is full")]
    Full { name: &'static str, event: E },
    #[error("timed out waiting for space in the queue of `{name}`")]
    Timeout { name: &'static str, event: E },
    #[error("`{name}` is no longer receiving events")]
    Disconnected { name: &'static str, event: E },
}

impl<E> SendError<E> {
    /// Recover the event that could not be delivered.
    pub fn into_event(self) -> E {
        match self {
            Self::Full { event, .. } | Self::Timeout { event, .. } | Self::Disconnected { event, .. } => {
                event
            }
        }
    }

    pub fn is_full(&self) -> bool {
        matches!(self, Self::Full { .. })
    }

    pub fn is_disconnected(&self) -> bool {
        matches!(self, Self::Disconnected { .. })
    }
}

impl<E> fmt::Debug for SendError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (kind, name) = match self {
            Self::Full { name, .. } => ("Full", name),
            Self::Timeout { name, .. } => ("Timeout", name),
            Self::Disconnected { name, .. } => ("Disconnected", name),
        };
        f.debug_struct(kind).field("name", name).finish_non_exhaustive()
    }
}
