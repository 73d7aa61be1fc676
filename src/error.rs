use std::fmt;

use thiserror::Error;

/// Result type for console operations
pub type ConsoleResult<T> = Result<T, ConsoleError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    NetworkUnreachable,
    NonSuccessStatus(u16),
    MalformedBody,
    Timeout,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NetworkUnreachable => write!(f, "network unreachable"),
            Self::NonSuccessStatus(code) => write!(f, "non-success status {}", code),
            Self::MalformedBody => write!(f, "malformed body"),
            Self::Timeout => write!(f, "timed out"),
        }
    }
}

/// Failure of a single HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {cause}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub cause: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, cause: impl Into<String>) -> Self {
        Self {
            kind,
            cause: cause.into(),
        }
    }

    pub fn network(cause: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::NetworkUnreachable, cause)
    }

    pub fn status(code: u16, cause: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::NonSuccessStatus(code), cause)
    }

    pub fn malformed(cause: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::MalformedBody, cause)
    }

    pub fn timeout(cause: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Timeout, cause)
    }
}

/// Rejected user input, raised before anything is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("field `{0}` is out of range")]
    OutOfRange(String),
    #[error("field `{0}` is not a number")]
    NotANumber(String),
    #[error("unknown model `{0}` (expected random_forest, knn or naive_bayes)")]
    UnknownModel(String),
}

/// A payload that arrived intact but breaks a domain invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("inconsistent probability distribution: {0}")]
    InconsistentDistribution(String),
    #[error("unknown apartment category {0}")]
    UnknownCategory(i64),
    #[error("invalid metric for `{algorithm}`: {reason}")]
    InvalidMetric { algorithm: String, reason: String },
    #[error("invalid cluster {cluster_id}: {reason}")]
    InvalidCluster { cluster_id: i64, reason: String },
    #[error("prediction record {0} appears more than once")]
    DuplicateRecord(i64),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsoleError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),
}

impl ConsoleError {
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_transport(&self) -> Option<&TransportError> {
        match self {
            Self::Transport(e) => Some(e),
            _ => None,
        }
    }
}
