// Centralized error types for the fetch engine.

use thiserror::Error;

use crate::transport::traits::InterestError;

/// Classification of an unrecoverable network failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkErrorKind {
    /// Retry budget exhausted on interest timeouts.
    Timeout,
    /// The network explicitly rejected the interest.
    Nack,
    /// Session-level failure (connect error, protocol violation).
    Transport,
}

impl NetworkErrorKind {
    /// Stable numeric code reported upstream alongside the message.
    pub fn code(self) -> u32 {
        match self {
            NetworkErrorKind::Timeout => 1,
            NetworkErrorKind::Nack => 2,
            NetworkErrorKind::Transport => 3,
        }
    }
}

/// Errors surfaced to the caller of a fetch operation.
///
/// Cache and telemetry failures are contained at their own boundary and never
/// appear here; only the mandatory path (configuration, network fetch) fails
/// the operation.
#[derive(Debug, Error, Clone)]
pub enum FetchError {
    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("network fetch failed (code {}): {message}", .kind.code())]
    Network {
        kind: NetworkErrorKind,
        message: String,
    },

    #[error("operation aborted")]
    Aborted,
}

impl FetchError {
    pub fn network(kind: NetworkErrorKind, message: impl Into<String>) -> Self {
        Self::Network {
            kind,
            message: message.into(),
        }
    }

    /// Numeric error code: 0 for non-network errors.
    pub fn code(&self) -> u32 {
        match self {
            FetchError::Network { kind, .. } => kind.code(),
            _ => 0,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            FetchError::Network {
                kind: NetworkErrorKind::Timeout,
                ..
            }
        )
    }
}

impl From<InterestError> for FetchError {
    fn from(err: InterestError) -> Self {
        let kind = match &err {
            InterestError::Timeout(_) => NetworkErrorKind::Timeout,
            InterestError::Nack(_) => NetworkErrorKind::Nack,
            InterestError::Transport(_) => NetworkErrorKind::Transport,
        };
        FetchError::network(kind, err.to_string())
    }
}

pub type FetchResult<T> = Result<T, FetchError>;
