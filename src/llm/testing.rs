//! Mock completion backend for handler tests

use super::{Completion, CompletionError, CompletionOutcome, ConversationRequest, ConversationService};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Mock service that returns queued outcomes in order
#[derive(Default)]
pub struct MockConversationService {
    outcomes: Mutex<VecDeque<CompletionOutcome>>,
    /// Record of all requests made
    pub requests: Mutex<Vec<ConversationRequest>>,
}

impl MockConversationService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an arbitrary outcome
    pub fn queue(&self, outcome: CompletionOutcome) {
        self.outcomes.lock().unwrap().push_back(outcome);
    }

    /// Queue a successful completion
    pub fn queue_success(&self, text: impl Into<String>) {
        self.queue(Ok(Completion::new(text)));
    }

    /// Queue a failed completion
    pub fn queue_error(&self, error: CompletionError) {
        self.queue(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<ConversationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConversationService for MockConversationService {
    async fn complete(&self, request: &ConversationRequest) -> CompletionOutcome {
        self.requests.lock().unwrap().push(request.clone());
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(CompletionError::transport("No mock outcome queued")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::CompletionErrorKind;

    #[tokio::test]
    async fn test_mock_returns_queued_outcomes_in_order() {
        let mock = MockConversationService::new();
        mock.queue_success("first");
        mock.queue_error(CompletionError::timed_out("slow"));

        let request = ConversationRequest::new("sys", "question", "test-model");
        assert_eq!(mock.complete(&request).await.unwrap().text, "first");
        assert_eq!(
            mock.complete(&request).await.unwrap_err().kind,
            CompletionErrorKind::TimedOut
        );

        // Nothing left in the queue
        let result = mock.complete(&request).await;
        assert!(result.is_err());
        assert_eq!(mock.recorded_requests().len(), 3);
    }
}
