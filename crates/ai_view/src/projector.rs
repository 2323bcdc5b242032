use ai_conversation::{Conversation, Role, Turn};
use ai_preview::RenderCache;
use comrak::options::{Extension, Render};

use crate::tree::{Entry, ViewTree};

/// Projects a conversation and the render cache into a [`ViewTree`].
///
/// Projection has no side effects: it never mutates the conversation and
/// never counts as a cache lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct Projector {
    html: bool,
}

impl Projector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Also render each entry's markdown to HTML.
    #[must_use]
    pub fn with_html(self, html: bool) -> Self {
        Self { html }
    }

    #[must_use]
    pub fn project(&self, conversation: &Conversation, cache: &RenderCache) -> ViewTree {
        let entries = conversation
            .turns()
            .iter()
            .enumerate()
            .map(|(index, turn)| self.entry(index, turn, cache))
            .collect();

        ViewTree {
            version: conversation.version(),
            entries,
        }
    }

    fn entry(&self, index: usize, turn: &Turn, cache: &RenderCache) -> Entry {
        let markdown = turn.content();
        let in_progress = turn.is_in_progress();

        let preview = (turn.role() == Role::Assistant && !in_progress)
            .then(|| cache.peek(markdown))
            .flatten();

        Entry {
            index,
            role: turn.role(),
            markdown: markdown.to_owned(),
            html: self.html.then(|| to_html(markdown)),
            in_progress,
            loading: in_progress && markdown.is_empty(),
            preview,
        }
    }
}

/// Render markdown to HTML. Raw HTML in the source is escaped, never passed
/// through.
#[must_use]
pub(crate) fn to_html(markdown: &str) -> String {
    let options = comrak::Options {
        extension: Extension {
            strikethrough: true,
            table: true,
            tasklist: true,
            autolink: true,
            ..Default::default()
        },
        render: Render {
            escape: true,
            ..Default::default()
        },
        ..Default::default()
    };

    comrak::markdown_to_html(markdown, &options)
}

#[cfg(test)]
#[path = "projector_tests.rs"]
mod tests;
