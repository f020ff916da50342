//! Event and signal primitives.
//!
//! Applications describe their messages as enums carrying typed payloads. The
//! [`Event`] envelope is the untyped form (a signal plus one payload slot) used
//! at boundaries where a message arrives as raw numbers and has to be decoded.

use core::fmt;

/// Identifier for a signal. Meaning is defined by the receiving active object.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Signal(pub u16);

impl Signal {
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u16 {
        self.0
    }
}

impl From<u16> for Signal {
    #[inline]
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SIG({:#06x})", self.0)
    }
}

/// Untyped event: a signal plus one payload value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event<T = ()> {
    pub signal: Signal,
    pub payload: T,
}

impl<T> Event<T> {
    pub const fn new(signal: Signal, payload: T) -> Self {
        Self { signal, payload }
    }

    pub fn signal(&self) -> Signal {
        self.signal
    }
}

impl Event<()> {
    pub const fn empty(signal: Signal) -> Self {
        Self::new(signal, ())
    }
}
