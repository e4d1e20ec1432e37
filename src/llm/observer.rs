//! Best-effort call annotations
//!
//! Observers see the duration and status of every outbound completion call.
//! An observer that errors or panics never changes the call's outcome.

use super::CompletionErrorKind;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;
use thiserror::Error;

/// Timing record for one outbound call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallAnnotation {
    pub model: String,
    pub duration: Duration,
    /// HTTP status, absent when no response arrived
    pub status: Option<u16>,
    /// Failure kind, absent on success
    pub failure: Option<CompletionErrorKind>,
}

#[derive(Debug, Error)]
#[error("observer unavailable: {0}")]
pub struct ObserverError(pub String);

/// Receiver for call annotations
pub trait CompletionObserver: Send + Sync {
    fn record(&self, annotation: &CallAnnotation) -> Result<(), ObserverError>;
}

/// Default observer: emits each annotation as a tracing event
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl CompletionObserver for TracingObserver {
    fn record(&self, annotation: &CallAnnotation) -> Result<(), ObserverError> {
        let duration_ms = u64::try_from(annotation.duration.as_millis()).unwrap_or(u64::MAX);
        match annotation.failure {
            None => tracing::info!(
                model = %annotation.model,
                duration_ms,
                status = ?annotation.status,
                "Completion call succeeded"
            ),
            Some(kind) => tracing::warn!(
                model = %annotation.model,
                duration_ms,
                status = ?annotation.status,
                failure = %kind,
                "Completion call failed"
            ),
        }
        Ok(())
    }
}

/// Deliver an annotation, swallowing observer errors and panics
pub fn notify(observer: &dyn CompletionObserver, annotation: &CallAnnotation) {
    match catch_unwind(AssertUnwindSafe(|| observer.record(annotation))) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::debug!(error = %e, "Completion observer failed"),
        Err(_) => tracing::debug!("Completion observer panicked"),
    }
}
