//! Completion error types

use std::fmt;
use thiserror::Error;

/// Completion failure with classification
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CompletionError {
    pub kind: CompletionErrorKind,
    pub message: String,
    /// HTTP status of the upstream response, when one was received
    pub status: Option<u16>,
}

impl CompletionError {
    pub fn new(kind: CompletionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn config_missing(message: impl Into<String>) -> Self {
        Self::new(CompletionErrorKind::ConfigMissing, message)
    }

    pub fn timed_out(message: impl Into<String>) -> Self {
        Self::new(CompletionErrorKind::TimedOut, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(CompletionErrorKind::RateLimited, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(CompletionErrorKind::TransportFailure, message)
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(CompletionErrorKind::UpstreamFailure, message)
    }
}

/// Failure classification. None of these are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionErrorKind {
    /// No API key configured; no call was attempted
    ConfigMissing,
    /// No complete response within the call timeout
    TimedOut,
    /// 402/429 whose body mentions credit, quota, payment or billing
    RateLimited,
    /// Connection-level failure
    TransportFailure,
    /// Any other non-2xx status, or a 2xx body without message content
    UpstreamFailure,
}

impl CompletionErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ConfigMissing => "config_missing",
            Self::TimedOut => "timed_out",
            Self::RateLimited => "rate_limited",
            Self::TransportFailure => "transport_failure",
            Self::UpstreamFailure => "upstream_failure",
        }
    }
}

impl fmt::Display for CompletionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
