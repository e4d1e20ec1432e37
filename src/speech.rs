//! Voice markup formatting
//!
//! All spoken output goes through `speak`, which escapes the text and wraps
//! it in a single SSML voice element.

use crate::envelope::ResponseDirective;

/// Named voice used for every response
pub const VOICE_NAME: &str = "Joanna";

/// Wrap raw text as SSML in the skill's voice
pub fn speak(text: &str) -> String {
    format!(
        "<speak><voice name=\"{VOICE_NAME}\">{}</voice></speak>",
        escape_markup(text.trim())
    )
}

/// Assemble a directive from raw (unmarked) text
pub fn directive(spoken_text: &str, reprompt_text: Option<&str>, end_session: bool) -> ResponseDirective {
    ResponseDirective::new(
        Some(speak(spoken_text)),
        reprompt_text.map(speak),
        end_session,
    )
}

/// Escape characters that would break the SSML document and drop the ones
/// XML cannot carry at all. Quotes are left alone since text only ever lands
/// in element content.
fn escape_markup(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\t' | '\n' | '\r' => escaped.push(c),
            c if c.is_control() || matches!(c, '\u{FFFE}' | '\u{FFFF}') => {}
            c => escaped.push(c),
        }
    }
    escaped
}
