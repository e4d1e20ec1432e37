//! Ordered request dispatch
//!
//! Handlers are `(predicate, action)` pairs evaluated in registration order.
//! The first accepting predicate wins. A failing or panicking action, or an
//! envelope nobody accepts, falls through to the catch-all, so `dispatch`
//! always produces a directive.

mod handlers;

#[cfg(test)]
mod proptests;

pub use handlers::{catch_all, standard_entries};

use crate::envelope::{RequestEnvelope, ResponseDirective};
use crate::llm::ConversationService;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use thiserror::Error;

pub type HandlerResult = Result<ResponseDirective, HandlerError>;

/// Accepts or rejects an envelope
pub type Predicate = fn(&RequestEnvelope) -> bool;

/// Produces a directive for an accepted envelope
pub type Action =
    for<'a> fn(&'a RequestEnvelope, &'a SkillContext) -> BoxFuture<'a, HandlerResult>;

/// Last-resort handler; must not fail
pub type CatchAll = fn(&HandlerError) -> ResponseDirective;

/// Failures that escape a handler action
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("question had no prompt text")]
    EmptyPrompt,
    #[error("{handler} received a {received} envelope")]
    WrongEnvelope {
        handler: &'static str,
        received: &'static str,
    },
    #[error("no handler accepts {0} envelopes")]
    Unhandled(&'static str),
    #[error("handler panicked: {0}")]
    Panicked(String),
}

/// Collaborators available to handler actions
#[derive(Clone)]
pub struct SkillContext {
    pub conversation: Arc<dyn ConversationService>,
    /// Model identifier sent with every completion request
    pub model: String,
}

impl SkillContext {
    pub fn new(conversation: Arc<dyn ConversationService>, model: impl Into<String>) -> Self {
        Self {
            conversation,
            model: model.into(),
        }
    }
}

/// One registered handler
pub struct HandlerEntry {
    pub name: &'static str,
    pub predicate: Predicate,
    pub action: Action,
}

impl HandlerEntry {
    pub const fn new(name: &'static str, predicate: Predicate, action: Action) -> Self {
        Self {
            name,
            predicate,
            action,
        }
    }
}

/// Handler registry with a mandatory catch-all
pub struct Dispatcher {
    entries: Vec<HandlerEntry>,
    catch_all: CatchAll,
    context: SkillContext,
}

impl Dispatcher {
    pub fn new(context: SkillContext, entries: Vec<HandlerEntry>, catch_all: CatchAll) -> Self {
        Self {
            entries,
            catch_all,
            context,
        }
    }

    /// The skill's handlers in their fixed order
    pub fn standard(context: SkillContext) -> Self {
        Self::new(context, standard_entries(), catch_all)
    }

    /// First entry whose predicate accepts the envelope
    pub fn matching_entry(&self, envelope: &RequestEnvelope) -> Option<&HandlerEntry> {
        self.entries.iter().find(|entry| (entry.predicate)(envelope))
    }

    /// Route one envelope to exactly one handler. Never fails.
    pub async fn dispatch(&self, envelope: &RequestEnvelope) -> ResponseDirective {
        let Some(entry) = self.matching_entry(envelope) else {
            return (self.catch_all)(&HandlerError::Unhandled(envelope.kind()));
        };

        tracing::debug!(handler = entry.name, request = envelope.kind(), "Dispatching request");

        let action = entry.action;
        let context = &self.context;
        let result = AssertUnwindSafe(async move { action(envelope, context).await })
            .catch_unwind()
            .await;

        match result {
            Ok(Ok(directive)) => directive,
            Ok(Err(error)) => (self.catch_all)(&error),
            Err(payload) => (self.catch_all)(&HandlerError::Panicked(panic_message(payload.as_ref()))),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
