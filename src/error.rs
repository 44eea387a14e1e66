//! Errors surfaced by the mining core.

/// Errors that can occur while configuring or running activity discovery.
///
/// Empty logs and empty traces are never errors: every stage returns an empty
/// result for them instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MiningError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Activity instance [{start}, {end}) is outside of trace {trace_index} (length {trace_len})")]
    InstanceOutOfBounds {
        trace_index: usize,
        start: usize,
        end: usize,
        trace_len: usize,
    },

    #[error("Expected instances for {expected} traces, got {actual}")]
    TraceCountMismatch { expected: usize, actual: usize },
}

impl MiningError {
    /// Shorthand for an [`MiningError::InvalidConfiguration`] error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }
}

/// Result alias used throughout the library.
pub type MiningResult<T> = Result<T, MiningError>;
