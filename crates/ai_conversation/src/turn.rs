//! A single message in a conversation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The author of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message in the conversation.
///
/// The role is fixed at creation. Content can only be changed through the
/// owning [`Conversation`](crate::Conversation), and only while the turn is in
/// progress.
///
/// Deserialization is strict: unknown fields are rejected, and a deserialized
/// turn is never in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Turn {
    role: Role,
    content: String,

    #[serde(skip)]
    in_progress: bool,
}

impl Turn {
    /// Create an ended turn.
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            in_progress: false,
        }
    }

    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// An empty assistant turn awaiting its stream.
    pub(crate) fn pending_assistant() -> Self {
        Self {
            role: Role::Assistant,
            content: String::new(),
            in_progress: true,
        }
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        self.in_progress
    }

    pub(crate) fn push_str(&mut self, fragment: &str) {
        debug_assert!(self.in_progress, "appending to an ended turn");
        self.content.push_str(fragment);
    }

    pub(crate) fn fail(&mut self, error: &str) {
        error.clone_into(&mut self.content);
        self.in_progress = false;
    }

    /// Returns `true` if the turn was in progress.
    pub(crate) fn end(&mut self) -> bool {
        std::mem::replace(&mut self.in_progress, false)
    }
}
