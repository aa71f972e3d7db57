//! Error model for bounded runs.

use std::fmt;

use thiserror::Error;

/// Handshake step at which a predicate was being driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Prime,
    ArgsDelivery,
    /// 1-indexed cycle, i.e. the number of values produced so far.
    Cycle(usize),
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prime => write!(f, "priming"),
            Self::ArgsDelivery => write!(f, "argument delivery"),
            Self::Cycle(n) => write!(f, "cycle {n}"),
        }
    }
}

/// A predicate ended its process while the driver still expected a
/// stop-signal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("predicate `{predicate}` ended during {phase} without yielding a stop-signal")]
pub struct ProtocolViolation {
    pub predicate: String,
    pub phase: Phase,
}

#[derive(Debug, Error)]
pub enum BoundError {
    #[error(transparent)]
    Protocol(#[from] ProtocolViolation),

    #[error("usage: {0}")]
    Usage(String),

    /// Raised by a predicate; display and source are the predicate's own.
    #[error(transparent)]
    Predicate(anyhow::Error),

    /// Raised by the data process or its factory.
    #[error(transparent)]
    Process(anyhow::Error),
}

impl BoundError {
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    /// Classify an error returned by a predicate.
    ///
    /// Aggregates report their children's failures through `anyhow`, so a
    /// wrapped `BoundError` or `ProtocolViolation` is unwrapped back to its
    /// own kind instead of being nested under `Predicate`.
    pub fn from_predicate(err: anyhow::Error) -> Self {
        match err.downcast::<BoundError>() {
            Ok(inner) => inner,
            Err(err) => match err.downcast::<ProtocolViolation>() {
                Ok(violation) => Self::Protocol(violation),
                Err(err) => Self::Predicate(err),
            },
        }
    }

    pub fn is_protocol(&self) -> bool {
        matches!(self, Self::Protocol(_))
    }
}
