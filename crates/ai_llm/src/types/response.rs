//! Chunk shapes of the supported streaming dialects.
//!
//! A single permissive struct covers OpenAI-compatible chat completion chunks,
//! Anthropic content block deltas and Gemini candidates. Unknown fields are
//! ignored.

use ai_conversation::Delta;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
pub struct Chunk {
    /// OpenAI-compatible choices.
    #[serde(default)]
    pub choices: Vec<Choice>,

    /// Gemini candidates.
    #[serde(default)]
    pub candidates: Vec<Candidate>,

    /// Anthropic event type, e.g. `content_block_delta`.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,

    /// Anthropic delta payload.
    #[serde(default)]
    pub delta: Option<TextDelta>,

    #[serde(default)]
    pub error: Option<ErrorPayload>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Choice {
    /// Streaming chunk payload.
    #[serde(default)]
    pub delta: Option<ChoiceMessage>,

    /// Non-streaming payload, for servers that ignore `stream: true`.
    #[serde(default)]
    pub message: Option<ChoiceMessage>,

    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TextDelta {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ErrorPayload {
    Object {
        message: String,
        #[serde(default)]
        code: Option<Value>,
    },
    Text(String),
    Other(Value),
}

impl ErrorPayload {
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Object {
                message,
                code: Some(code),
            } => format!("{message} ({code})"),
            Self::Object { message, .. } | Self::Text(message) => message.clone(),
            Self::Other(value) => value.to_string(),
        }
    }
}

impl Chunk {
    /// The text carried by this chunk, across all dialects.
    #[must_use]
    pub fn text(&self) -> String {
        let choices = self.choices.iter().filter_map(|choice| {
            choice
                .delta
                .as_ref()
                .or(choice.message.as_ref())
                .and_then(|message| message.content.as_deref())
        });

        let candidates = self
            .candidates
            .iter()
            .filter_map(|candidate| candidate.content.as_ref())
            .flat_map(|content| &content.parts)
            .filter_map(|part| part.text.as_deref());

        let block = self
            .kind
            .as_deref()
            .filter(|kind| *kind == "content_block_delta")
            .and(self.delta.as_ref())
            .and_then(|delta| delta.text.as_deref());

        choices.chain(candidates).chain(block).collect()
    }
}

impl From<Chunk> for Delta {
    fn from(chunk: Chunk) -> Self {
        if let Some(error) = &chunk.error {
            return Delta::error(error.message());
        }

        Delta::content(chunk.text())
    }
}
