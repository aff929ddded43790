// Error types for providers, snapshot building and server lifecycle

use thiserror::Error;

/// A metrics provider query failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("{metric} unavailable: {reason}")]
    Unavailable {
        metric: &'static str,
        reason: String,
    },
    #[error("{metric} is not supported on this platform")]
    Unsupported { metric: &'static str },
    #[error("failed to read {path}: {reason}")]
    Io { path: String, reason: String },
    #[error("sysinfo lock poisoned: {0}")]
    LockPoisoned(String),
}

impl ProviderError {
    pub fn unavailable(metric: &'static str, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            metric,
            reason: reason.into(),
        }
    }
}

/// Building one snapshot failed. Provider failures pass through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("provider returned no CPU info entries")]
    EmptyCpuInfo,
    #[error("provider returned no aggregate CPU percent")]
    MissingAggregatePercent,
    #[error("provider returned a non-finite value for {field}")]
    NonFinitePercent { field: &'static str },
    #[error("{operation} task join: {reason}")]
    Join {
        operation: &'static str,
        reason: String,
    },
}

/// Invalid lifecycle transition on a sampling server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ServerError {
    #[error("sampling server is already running")]
    AlreadyRunning,
    #[error("sampling server has been stopped; create a new one to sample again")]
    Stopped,
    #[error("start() must be called from within a Tokio runtime")]
    NoRuntime,
}
