use std::fmt;

/// A unit of incremental output produced by a completion stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delta {
    /// A non-empty fragment to append to the active turn.
    Content(String),

    /// A terminal failure. The text replaces the active turn's content.
    Error(String),

    /// Keep-alive or an empty chunk. Carries nothing.
    Heartbeat,
}

impl Delta {
    /// Build a content delta. Empty fragments become [`Delta::Heartbeat`].
    pub fn content(fragment: impl Into<String>) -> Self {
        let fragment = fragment.into();
        if fragment.is_empty() {
            return Self::Heartbeat;
        }

        Self::Content(fragment)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    /// Whether applying this delta changes what is displayed.
    #[must_use]
    pub fn is_content_bearing(&self) -> bool {
        !matches!(self, Self::Heartbeat)
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl fmt::Display for Delta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Content(text) | Self::Error(text) => f.write_str(text),
            Self::Heartbeat => Ok(()),
        }
    }
}
