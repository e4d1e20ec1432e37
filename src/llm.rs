//! Conversational-AI completion client
//!
//! Issues single-turn completion requests and classifies every failure
//! into a `CompletionErrorKind` the handlers can speak about.

mod error;
mod observer;
mod openrouter;
mod types;

#[cfg(test)]
pub mod testing;

pub use error::{CompletionError, CompletionErrorKind};
pub use observer::TracingObserver;
pub use openrouter::{OpenRouterClient, DEFAULT_ENDPOINT, DEFAULT_REFERER, DEFAULT_TIMEOUT};
pub use types::*;

use async_trait::async_trait;

/// Common interface for completion backends
#[async_trait]
pub trait ConversationService: Send + Sync {
    /// Attempt one completion. Never retried, never panics on upstream failure.
    async fn complete(&self, request: &ConversationRequest) -> CompletionOutcome;
}
