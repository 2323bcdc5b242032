//! Helpers for serving canned completion streams.

use serde_json::{Value, json};

pub use httpmock::{
    Method::{GET, POST},
    MockServer,
};

/// Content type of a server-sent event stream.
pub const EVENT_STREAM: &str = "text/event-stream";

/// Frame each payload as one `data:` event, followed by `[DONE]`.
#[must_use]
pub fn sse_body<I, S>(payloads: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut body = payloads
        .into_iter()
        .map(|data| format!("data: {}\n\n", data.as_ref()))
        .collect::<String>();

    body.push_str("data: [DONE]\n\n");
    body
}

/// An OpenAI-compatible chunk carrying `content`.
#[must_use]
pub fn openai_chunk(content: &str) -> String {
    json!({ "choices": [{ "index": 0, "delta": { "content": content } }] }).to_string()
}

/// An OpenAI-compatible stream of the given fragments.
#[must_use]
pub fn openai_stream(fragments: &[&str]) -> String {
    sse_body(fragments.iter().map(|f| openai_chunk(f)))
}

/// An error payload, as sent in-stream or as an error response body.
#[must_use]
pub fn error_payload(message: &str) -> Value {
    json!({ "error": { "message": message } })
}
