use std::sync::Arc;

use ai_conversation::Role;
use ai_preview::Preview;

/// Everything a renderer needs to display a conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewTree {
    /// Version of the conversation this tree was projected from.
    pub version: u64,
    pub entries: Vec<Entry>,
}

/// The view of a single turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Position of the turn in the conversation.
    pub index: usize,
    pub role: Role,

    /// The turn's content, as markdown source.
    pub markdown: String,

    /// The content rendered to HTML, if enabled.
    pub html: Option<String>,

    /// The turn is still receiving content.
    pub in_progress: bool,

    /// The turn is in progress and has no content yet.
    pub loading: bool,

    /// Cached preview of a finalized assistant turn.
    pub preview: Option<Arc<Preview>>,
}

impl ViewTree {
    #[must_use]
    pub fn last(&self) -> Option<&Entry> {
        self.entries.last()
    }

    #[must_use]
    pub fn is_streaming(&self) -> bool {
        self.entries.iter().any(|entry| entry.in_progress)
    }
}
