//! Property-based tests for dispatch
//!
//! Whatever arrives and whatever the completion backend does, dispatch
//! returns a well-formed directive.

use super::*;
use crate::envelope::{RequestEnvelope, ResponseDirective};
use crate::llm::testing::MockConversationService;
use crate::llm::{Completion, CompletionError, CompletionErrorKind, CompletionOutcome};
use proptest::prelude::*;
use std::sync::Arc;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_envelope() -> impl Strategy<Value = RequestEnvelope> {
    prop_oneof![
        Just(RequestEnvelope::SessionStart),
        "[a-zA-Z0-9 ?<>&']{0,40}".prop_map(|prompt_text| RequestEnvelope::UserQuestion { prompt_text }),
        Just(RequestEnvelope::HelpRequest),
        Just(RequestEnvelope::StopRequest),
        proptest::option::of("[A-Z_]{1,24}").prop_map(|reason| RequestEnvelope::SessionEnd { reason }),
        "[A-Za-z.]{1,24}".prop_map(|name| RequestEnvelope::Unrecognized { name }),
    ]
}

fn arb_error_kind() -> impl Strategy<Value = CompletionErrorKind> {
    prop_oneof![
        Just(CompletionErrorKind::ConfigMissing),
        Just(CompletionErrorKind::TimedOut),
        Just(CompletionErrorKind::RateLimited),
        Just(CompletionErrorKind::TransportFailure),
        Just(CompletionErrorKind::UpstreamFailure),
    ]
}

fn arb_outcome() -> impl Strategy<Value = CompletionOutcome> {
    prop_oneof![
        "[a-zA-Z0-9 .,<>&]{0,60}".prop_map(|text| Ok(Completion::new(text))),
        arb_error_kind().prop_map(|kind| Err(CompletionError::new(kind, "simulated failure"))),
    ]
}

fn is_voice_markup(text: &str) -> bool {
    text.starts_with("<speak><voice name=\"Joanna\">") && text.ends_with("</voice></speak>")
}

fn run_dispatch(envelope: &RequestEnvelope, outcome: CompletionOutcome) -> ResponseDirective {
    let mock = Arc::new(MockConversationService::new());
    mock.queue(outcome);
    let dispatcher = Dispatcher::standard(SkillContext::new(mock, "test-model"));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    runtime.block_on(dispatcher.dispatch(envelope))
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_dispatch_yields_well_formed_directive(
        envelope in arb_envelope(),
        outcome in arb_outcome(),
    ) {
        let directive = run_dispatch(&envelope, outcome);

        // A reprompt always keeps the session open
        prop_assert!(directive.reprompt_text().is_none() || !directive.end_session());

        if let Some(spoken) = directive.spoken_text() {
            prop_assert!(is_voice_markup(spoken), "spoken: {}", spoken);
        }
        if let Some(reprompt) = directive.reprompt_text() {
            prop_assert!(is_voice_markup(reprompt), "reprompt: {}", reprompt);
        }

        match envelope {
            RequestEnvelope::SessionEnd { .. } => {
                prop_assert_eq!(directive, ResponseDirective::silent_end());
            }
            RequestEnvelope::StopRequest => {
                prop_assert!(directive.end_session());
                prop_assert!(directive.reprompt_text().is_none());
            }
            _ => {
                prop_assert!(directive.spoken_text().is_some());
                prop_assert!(!directive.end_session());
            }
        }
    }

    #[test]
    fn prop_at_most_one_handler_matches(envelope in arb_envelope()) {
        let entries = standard_entries();
        let matching = entries.iter().filter(|e| (e.predicate)(&envelope)).count();
        match envelope {
            RequestEnvelope::Unrecognized { .. } => prop_assert_eq!(matching, 0),
            _ => prop_assert_eq!(matching, 1),
        }
    }

    #[test]
    fn prop_spoken_output_never_leaks_failure_detail(
        prompt_text in "[a-z ]{1,20}[a-z]",
        kind in arb_error_kind(),
    ) {
        let outcome = Err(CompletionError::new(kind, "HTTP 402: billing account suspended"));
        let directive = run_dispatch(&RequestEnvelope::UserQuestion { prompt_text }, outcome);
        let spoken = directive.spoken_text().unwrap_or_default();
        prop_assert!(!spoken.contains("402"));
        prop_assert!(!spoken.contains("suspended"));
    }
}
