//! Handler actions, one per supported request variant

use super::{HandlerEntry, HandlerError, HandlerResult, SkillContext};
use crate::envelope::{RequestEnvelope, ResponseDirective};
use crate::llm::{CompletionErrorKind, ConversationRequest};
use crate::speech;
use futures::future::BoxFuture;
use futures::FutureExt;

pub const GREETING: &str = "Hi! I'm your DeepSeek friend, ready to help you understand anything. \
What would you like to learn about? Just ask me any question!";
pub const TOPIC_REPROMPT: &str = "What would you like to know?";
pub const FOLLOW_UP: &str = "Is there anything else you'd like to know?";
pub const FOLLOW_UP_REPROMPT: &str = "What else would you like to learn about?";
pub const HELP_TEXT: &str = "I'm your DeepSeek friend, an AI that loves to explain complex topics. \
You can ask me anything you're curious about, from science to history to technology. \
For example, try asking 'what is quantum computing?' or 'explain how black holes work'. \
What would you like to learn about?";
pub const FAREWELL: &str =
    "Goodbye! I enjoyed our chat. Come back anytime you want to learn something new!";
pub const APOLOGY: &str = "Sorry, I had trouble doing what you asked. Please try again.";

const PERSONA: &str = "You are a friendly, knowledgeable companion answering questions \
through a voice assistant. Explain clearly in a few short spoken sentences. \
Do not use markdown, lists, code blocks, URLs or emoji.";

/// Spoken answers should stay short
const MAX_ANSWER_TOKENS: u32 = 300;
/// Slightly below the service default so answers stay on topic
const ANSWER_TEMPERATURE: f32 = 0.6;

/// Registration order is the match order
pub fn standard_entries() -> Vec<HandlerEntry> {
    vec![
        HandlerEntry::new("session_start", is_session_start, on_session_start),
        HandlerEntry::new("user_question", is_user_question, on_user_question),
        HandlerEntry::new("help", is_help_request, on_help_request),
        HandlerEntry::new("cancel_and_stop", is_stop_request, on_stop_request),
        HandlerEntry::new("session_end", is_session_end, on_session_end),
    ]
}

/// Fixed apology for any failure that escaped a handler.
/// The error is only logged; none of its detail is spoken.
pub fn catch_all(error: &HandlerError) -> ResponseDirective {
    tracing::error!(error = %error, "Request fell through to catch-all");
    speech::directive(APOLOGY, Some(TOPIC_REPROMPT), false)
}

/// Spoken text for a failed completion. Billing problems stay vague.
pub fn apology_for(kind: CompletionErrorKind) -> &'static str {
    match kind {
        CompletionErrorKind::ConfigMissing => {
            "I apologize, but I need to be properly configured first. Please contact the skill administrator."
        }
        CompletionErrorKind::TimedOut => {
            "Sorry, that took me too long to think about. Please try asking again."
        }
        CompletionErrorKind::TransportFailure => {
            "I'm having trouble connecting right now. Please try again in a moment."
        }
        CompletionErrorKind::RateLimited => {
            "I apologize, but I'm unable to help right now. Please try again later."
        }
        CompletionErrorKind::UpstreamFailure => {
            "I'm having trouble thinking right now. Could you try asking me again?"
        }
    }
}

// Predicates

fn is_session_start(envelope: &RequestEnvelope) -> bool {
    matches!(envelope, RequestEnvelope::SessionStart)
}

fn is_user_question(envelope: &RequestEnvelope) -> bool {
    matches!(envelope, RequestEnvelope::UserQuestion { .. })
}

fn is_help_request(envelope: &RequestEnvelope) -> bool {
    matches!(envelope, RequestEnvelope::HelpRequest)
}

fn is_stop_request(envelope: &RequestEnvelope) -> bool {
    matches!(envelope, RequestEnvelope::StopRequest)
}

fn is_session_end(envelope: &RequestEnvelope) -> bool {
    matches!(envelope, RequestEnvelope::SessionEnd { .. })
}

// Actions

fn on_session_start<'a>(
    _envelope: &'a RequestEnvelope,
    _context: &'a SkillContext,
) -> BoxFuture<'a, HandlerResult> {
    async { Ok(speech::directive(GREETING, Some(TOPIC_REPROMPT), false)) }.boxed()
}

fn on_user_question<'a>(
    envelope: &'a RequestEnvelope,
    context: &'a SkillContext,
) -> BoxFuture<'a, HandlerResult> {
    async move {
        let RequestEnvelope::UserQuestion { prompt_text } = envelope else {
            return Err(HandlerError::WrongEnvelope {
                handler: "user_question",
                received: envelope.kind(),
            });
        };

        let prompt = prompt_text.trim();
        if prompt.is_empty() {
            return Err(HandlerError::EmptyPrompt);
        }

        let request = ConversationRequest::new(PERSONA, prompt, context.model.as_str())
            .with_temperature(ANSWER_TEMPERATURE)
            .with_max_tokens(MAX_ANSWER_TOKENS);

        match context.conversation.complete(&request).await {
            Ok(completion) => {
                let answer = format!("{} {FOLLOW_UP}", completion.text.trim());
                Ok(speech::directive(&answer, Some(FOLLOW_UP_REPROMPT), false))
            }
            Err(e) => {
                tracing::warn!(
                    kind = %e.kind,
                    status = ?e.status,
                    error = %e.message,
                    "Question could not be answered"
                );
                Ok(speech::directive(apology_for(e.kind), Some(TOPIC_REPROMPT), false))
            }
        }
    }
    .boxed()
}

fn on_help_request<'a>(
    _envelope: &'a RequestEnvelope,
    _context: &'a SkillContext,
) -> BoxFuture<'a, HandlerResult> {
    async { Ok(speech::directive(HELP_TEXT, Some(TOPIC_REPROMPT), false)) }.boxed()
}

fn on_stop_request<'a>(
    _envelope: &'a RequestEnvelope,
    _context: &'a SkillContext,
) -> BoxFuture<'a, HandlerResult> {
    async { Ok(speech::directive(FAREWELL, None, true)) }.boxed()
}

fn on_session_end<'a>(
    envelope: &'a RequestEnvelope,
    _context: &'a SkillContext,
) -> BoxFuture<'a, HandlerResult> {
    async move {
        if let RequestEnvelope::SessionEnd { reason } = envelope {
            tracing::info!(reason = reason.as_deref().unwrap_or("unspecified"), "Session ended");
        }
        Ok(ResponseDirective::silent_end())
    }
    .boxed()
}
