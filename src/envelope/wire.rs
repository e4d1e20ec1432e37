//! Voice-platform JSON request/response format
//!
//! Only the fields the skill reads are modeled; everything else in the
//! platform envelope (session, context, request ids) is ignored.

use super::{RequestEnvelope, ResponseDirective};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

const RESPONSE_VERSION: &str = "1.0";

const ASK_INTENT: &str = "AskIntent";
const PROMPT_SLOT: &str = "prompt";
const HELP_INTENT: &str = "AMAZON.HelpIntent";
const CANCEL_INTENT: &str = "AMAZON.CancelIntent";
const STOP_INTENT: &str = "AMAZON.StopIntent";

#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("malformed request envelope: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("intent request without an intent")]
    MissingIntent,
}

/// Decode a platform request body into a `RequestEnvelope`
pub fn decode_request(body: &[u8]) -> Result<RequestEnvelope, EnvelopeError> {
    let envelope: WireEnvelope = serde_json::from_slice(body)?;
    let request = envelope.request;

    match request.kind.as_str() {
        "LaunchRequest" => Ok(RequestEnvelope::SessionStart),
        "SessionEndedRequest" => Ok(RequestEnvelope::SessionEnd {
            reason: request.reason,
        }),
        "IntentRequest" => {
            let intent = request.intent.ok_or(EnvelopeError::MissingIntent)?;
            Ok(decode_intent(intent))
        }
        // Request types without a handler go to the catch-all
        other => Ok(RequestEnvelope::Unrecognized {
            name: other.to_string(),
        }),
    }
}

fn decode_intent(intent: WireIntent) -> RequestEnvelope {
    match intent.name.as_str() {
        ASK_INTENT => {
            let prompt_text = intent
                .slots
                .and_then(|mut slots| slots.remove(PROMPT_SLOT))
                .and_then(|slot| slot.value)
                .unwrap_or_default();
            RequestEnvelope::UserQuestion { prompt_text }
        }
        HELP_INTENT => RequestEnvelope::HelpRequest,
        CANCEL_INTENT | STOP_INTENT => RequestEnvelope::StopRequest,
        _ => RequestEnvelope::Unrecognized { name: intent.name },
    }
}

/// Render a directive as a platform response body
pub fn encode_response(directive: &ResponseDirective) -> SkillResponse {
    SkillResponse {
        version: RESPONSE_VERSION,
        response: ResponseBody {
            output_speech: directive.spoken_text().map(OutputSpeech::ssml),
            reprompt: directive.reprompt_text().map(|text| Reprompt {
                output_speech: OutputSpeech::ssml(text),
            }),
            should_end_session: directive.end_session(),
        },
    }
}

// Request types

#[derive(Debug, Deserialize)]
struct WireEnvelope {
    request: WireRequest,
}

#[derive(Debug, Deserialize)]
struct WireRequest {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    intent: Option<WireIntent>,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireIntent {
    name: String,
    #[serde(default)]
    slots: Option<HashMap<String, WireSlot>>,
}

#[derive(Debug, Deserialize)]
struct WireSlot {
    #[serde(default)]
    value: Option<String>,
}

// Response types

/// Platform response body
#[derive(Debug, Serialize)]
pub struct SkillResponse {
    version: &'static str,
    response: ResponseBody,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResponseBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    output_speech: Option<OutputSpeech>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reprompt: Option<Reprompt>,
    should_end_session: bool,
}

#[derive(Debug, Serialize)]
struct OutputSpeech {
    #[serde(rename = "type")]
    kind: &'static str,
    ssml: String,
}

impl OutputSpeech {
    fn ssml(text: &str) -> Self {
        Self {
            kind: "SSML",
            ssml: text.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Reprompt {
    output_speech: OutputSpeech,
}
