use std::io::Write;

use ai_conversation::Role;
use ai_preview::Preview;
use crossterm::style::Stylize as _;
use tracing::trace;

use crate::{
    error::Result,
    tree::{Entry, ViewTree},
};

/// A sink for projected views.
pub trait Renderer {
    /// Display `tree`, replacing whatever was displayed before.
    fn render(&mut self, tree: &ViewTree) -> Result<()>;
}

/// Keeps every rendered tree.
#[derive(Debug, Default)]
pub struct Recorder {
    pub trees: Vec<ViewTree>,
}

impl Recorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn last(&self) -> Option<&ViewTree> {
        self.trees.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.trees.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}

impl Renderer for Recorder {
    fn render(&mut self, tree: &ViewTree) -> Result<()> {
        self.trees.push(tree.clone());
        Ok(())
    }
}

#[derive(Debug)]
struct Shown {
    role: Role,
    markdown: String,
    ended: bool,
}

impl Shown {
    /// Whether `entry` can be displayed by appending to what is shown.
    fn continues(&self, entry: &Entry) -> bool {
        self.role == entry.role
            && entry.markdown.starts_with(&self.markdown)
            && !(self.ended && (entry.in_progress || entry.markdown != self.markdown))
    }
}

/// Writes a conversation to a terminal, incrementally.
///
/// Only the text appended since the previous render is written. When an entry
/// changes in any other way (an error replacing partial content, or a loaded
/// history) it is written again from the start, below a separator.
#[derive(Debug)]
pub struct TerminalRenderer<W> {
    out: W,
    shown: Vec<Shown>,
    color: bool,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            shown: vec![],
            color: true,
        }
    }

    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn header(&mut self, role: Role) -> Result<()> {
        let label = match role {
            Role::System => "system",
            Role::User => "you",
            Role::Assistant => "assistant",
        };

        if !self.color {
            writeln!(self.out, "## {label}")?;
            return Ok(());
        }

        let label = match role {
            Role::System => label.dim(),
            Role::User => label.bold().green(),
            Role::Assistant => label.bold().cyan(),
        };

        writeln!(self.out, "## {label}")?;
        Ok(())
    }

    fn footer(&mut self, entry: &Entry) -> Result<()> {
        writeln!(self.out)?;

        let Some(Preview::Sandbox { language, code, .. }) = entry.preview.as_deref() else {
            return Ok(());
        };

        let note = format!(
            "[preview: {}, {} lines]",
            language.as_deref().unwrap_or("html"),
            code.lines().count()
        );

        if self.color {
            writeln!(self.out, "{}", note.dim())?;
        } else {
            writeln!(self.out, "{note}")?;
        }

        Ok(())
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn render(&mut self, tree: &ViewTree) -> Result<()> {
        let diverged = self
            .shown
            .iter()
            .zip(&tree.entries)
            .position(|(shown, entry)| !shown.continues(entry))
            .or_else(|| (tree.entries.len() < self.shown.len()).then_some(tree.entries.len()));

        if let Some(index) = diverged {
            trace!(index, "View diverged, rewriting.");
            self.shown.truncate(index);
            writeln!(self.out, "\n---")?;
        }

        for (index, entry) in tree.entries.iter().enumerate() {
            if let Some(shown) = self.shown.get_mut(index) {
                let suffix = &entry.markdown[shown.markdown.len()..];
                if !suffix.is_empty() {
                    self.out.write_all(suffix.as_bytes())?;
                    shown.markdown.push_str(suffix);
                }
            } else {
                if index > 0 {
                    writeln!(self.out)?;
                }

                self.header(entry.role)?;
                self.out.write_all(entry.markdown.as_bytes())?;
                self.shown.push(Shown {
                    role: entry.role,
                    markdown: entry.markdown.clone(),
                    ended: false,
                });
            }

            if !entry.in_progress && !self.shown[index].ended {
                self.shown[index].ended = true;
                self.footer(entry)?;
            }
        }

        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "render_tests.rs"]
mod tests;
