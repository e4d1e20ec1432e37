//! Inbound request envelopes and outbound response directives

mod wire;

pub use wire::{decode_request, encode_response};

/// One normalized voice-platform request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestEnvelope {
    /// The user opened the skill without a question
    SessionStart,
    /// The user asked something
    UserQuestion { prompt_text: String },
    HelpRequest,
    /// Cancel or stop
    StopRequest,
    /// The platform closed the session; nothing may be spoken
    SessionEnd { reason: Option<String> },
    /// An intent this skill has no handler for
    Unrecognized { name: String },
}

impl RequestEnvelope {
    /// Short label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SessionStart => "session_start",
            Self::UserQuestion { .. } => "user_question",
            Self::HelpRequest => "help_request",
            Self::StopRequest => "stop_request",
            Self::SessionEnd { .. } => "session_end",
            Self::Unrecognized { .. } => "unrecognized",
        }
    }
}

/// Outbound response: speech, optional reprompt, session flag
///
/// A reprompt keeps the session open, so construction forces
/// `end_session` to false whenever a reprompt is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseDirective {
    spoken_text: Option<String>,
    reprompt_text: Option<String>,
    end_session: bool,
}

impl ResponseDirective {
    pub fn new(spoken_text: Option<String>, reprompt_text: Option<String>, end_session: bool) -> Self {
        let end_session = end_session && reprompt_text.is_none();
        Self {
            spoken_text,
            reprompt_text,
            end_session,
        }
    }

    /// Terminal directive with no speech
    pub fn silent_end() -> Self {
        Self::new(None, None, true)
    }

    pub fn spoken_text(&self) -> Option<&str> {
        self.spoken_text.as_deref()
    }

    pub fn reprompt_text(&self) -> Option<&str> {
        self.reprompt_text.as_deref()
    }

    pub fn end_session(&self) -> bool {
        self.end_session
    }
}
