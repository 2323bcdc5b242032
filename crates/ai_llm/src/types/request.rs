use ai_conversation::{Role, Turn};
use serde::Serialize;

/// Chat completion request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatCompletion {
    /// The model ID to use.
    pub model: String,

    /// The list of messages, oldest first.
    pub messages: Vec<Message>,

    /// Always `true`; responses are consumed as a stream of deltas.
    pub stream: bool,
}

impl ChatCompletion {
    #[must_use]
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            stream: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

impl From<&Turn> for Message {
    fn from(turn: &Turn) -> Self {
        Self::new(turn.role(), turn.content())
    }
}

/// Convert ended turns into request messages.
///
/// With a `summary_marker`, every assistant turn except the most recent one is
/// reduced to the text after the last occurrence of the marker. Turns without
/// the marker, user and system turns, and the most recent assistant turn are
/// sent in full. Turns that are still streaming are skipped.
#[must_use]
pub fn history(turns: &[Turn], summary_marker: Option<&str>) -> Vec<Message> {
    let last_assistant = turns
        .iter()
        .rposition(|turn| turn.role() == Role::Assistant && !turn.is_in_progress());

    turns
        .iter()
        .enumerate()
        .filter(|(_, turn)| !turn.is_in_progress())
        .map(|(index, turn)| match summary_marker {
            Some(marker) if turn.role() == Role::Assistant && Some(index) != last_assistant => {
                Message::new(turn.role(), compact(turn.content(), marker))
            }
            _ => Message::from(turn),
        })
        .collect()
}

fn compact<'a>(content: &'a str, marker: &str) -> &'a str {
    if marker.is_empty() {
        return content;
    }

    content
        .rfind(marker)
        .map_or(content, |i| content[i + marker.len()..].trim())
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
