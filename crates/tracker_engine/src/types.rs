use std::fmt;

use tracker_core::{RunId, RunMessage};

/// What the engine reports back about a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Message { run_id: RunId, message: RunMessage },
    Failed { run_id: RunId, error: StreamError },
    /// The feed closed normally.
    Ended { run_id: RunId },
}

impl EngineEvent {
    pub fn run_id(&self) -> RunId {
        match self {
            EngineEvent::Message { run_id, .. }
            | EngineEvent::Failed { run_id, .. }
            | EngineEvent::Ended { run_id } => *run_id,
        }
    }
}

/// The engine thread is gone; no command reaches it and no event will follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("engine thread stopped")]
pub struct EngineStopped;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct StreamError {
    pub kind: FailureKind,
    pub message: String,
}

impl StreamError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    Cancelled,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Cancelled => write!(f, "cancelled"),
        }
    }
}
