//! Server-sent event framing.
//!
//! Lines are fed one at a time. Consecutive `data:` lines form one event,
//! joined by newlines, and are dispatched at the next blank line (or when the
//! transport closes). Comment lines dispatch immediately, so keep-alives reach
//! the consumer.
//!
//! See: <https://html.spec.whatwg.org/multipage/server-sent-events.html#event-stream-interpretation>

/// Marks the end of an OpenAI-compatible stream.
const DONE: &str = "[DONE]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// The data of one event.
    Data(String),

    /// A comment line, usually a keep-alive.
    Comment(String),

    /// The server signalled the end of the stream.
    Done,
}

#[derive(Debug, Default)]
pub struct EventDecoder {
    data: Option<String>,
}

impl EventDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line, without its line terminator.
    pub fn push_line(&mut self, line: &str) -> Option<Frame> {
        let line = line.strip_suffix('\r').unwrap_or(line);

        if line.is_empty() {
            return self.dispatch();
        }

        if let Some(comment) = line.strip_prefix(':') {
            return Some(Frame::Comment(comment.trim().to_owned()));
        }

        let (field, value) = line.split_once(':').unwrap_or((line, ""));
        let value = value.strip_prefix(' ').unwrap_or(value);

        // `event`, `id` and `retry` carry nothing we act on.
        if field == "data" {
            match &mut self.data {
                Some(data) => {
                    data.push('\n');
                    data.push_str(value);
                }
                None => self.data = Some(value.to_owned()),
            }
        }

        None
    }

    /// Flush a pending event when the transport closes.
    pub fn finish(&mut self) -> Option<Frame> {
        self.dispatch()
    }

    fn dispatch(&mut self) -> Option<Frame> {
        // An event whose data is empty is not dispatched.
        let data = self.data.take().filter(|data| !data.is_empty())?;

        if data.trim() == DONE {
            return Some(Frame::Done);
        }

        Some(Frame::Data(data))
    }
}

#[cfg(test)]
#[path = "sse_tests.rs"]
mod tests;
