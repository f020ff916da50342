//! Active object start-up configuration.

use crate::error::AoError;
use crate::{DEFAULT_QUEUE_CAPACITY, DEFAULT_STACK_SIZE};

/// Configuration for one active object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveObjectConfig {
    /// Worker thread name, also used in log lines.
    pub name: &'static str,
    /// Number of events the queue holds before `send` blocks.
    pub queue_capacity: usize,
    /// Stack budget for the worker thread, in bytes.
    pub stack_size: usize,
}

impl Default for ActiveObjectConfig {
    fn default() -> Self {
        Self {
            name: "ao",
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            stack_size: DEFAULT_STACK_SIZE,
        }
    }
}

impl ActiveObjectConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> ActiveObjectConfigBuilder {
        ActiveObjectConfigBuilder::default()
    }

    /// Shorthand for a named object with default sizing.
    pub fn named(name: &'static str) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    pub(crate) fn validate(&self) -> Result<(), AoError> {
        if self.name.is_empty() {
            return Err(AoError::InvalidConfig("name must not be empty"));
        }
        if self.queue_capacity == 0 {
            return Err(AoError::InvalidConfig("queue capacity must be at least 1"));
        }
        if self.stack_size == 0 {
            return Err(AoError::InvalidConfig("stack size must be non-zero"));
        }
        Ok(())
    }
}

/// Builder for ergonomic configuration construction.
#[derive(Debug, Clone, Default)]
pub struct ActiveObjectConfigBuilder {
    config: ActiveObjectConfig,
}

impl ActiveObjectConfigBuilder {
    /// Sets the worker name.
    pub fn name(mut self, name: &'static str) -> Self {
        self.config.name = name;
        self
    }

    /// Sets the queue capacity.
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    /// Sets the worker stack budget in bytes.
    pub fn stack_size(mut self, bytes: usize) -> Self {
        self.config.stack_size = bytes;
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> ActiveObjectConfig {
        self.config
    }
}
