//! The ordered turn history and the operations allowed to mutate it.

use tracing::trace;

use crate::{
    delta::Delta,
    error::{Error, Result},
    turn::Turn,
};

/// The result of applying a [`Delta`] to a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The fragment was appended to the active turn.
    Content,

    /// The active turn ended with the error text as its content.
    Error,

    /// Nothing changed.
    Ignored,
}

impl Applied {
    /// Whether the view needs to be re-rendered.
    #[must_use]
    pub fn is_content_bearing(self) -> bool {
        !matches!(self, Self::Ignored)
    }
}

/// An ordered, append-only sequence of turns.
///
/// At most one turn is in progress at any time, and it is always the last
/// turn. Content of an ended turn never changes, unless the whole history is
/// swapped out with [`Conversation::replace`].
///
/// Each observable change bumps [`Conversation::version`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    turns: Vec<Turn>,
    version: u64,
}

impl Conversation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a conversation with a system prompt.
    #[must_use]
    pub fn with_system(prompt: impl Into<String>) -> Self {
        let prompt = prompt.into();
        let mut this = Self::new();
        if !prompt.trim().is_empty() {
            this.turns.push(Turn::system(prompt));
        }

        this
    }

    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[must_use]
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// The turn currently receiving deltas, if any.
    #[must_use]
    pub fn active_turn(&self) -> Option<&Turn> {
        self.turns.last().filter(|turn| turn.is_in_progress())
    }

    #[must_use]
    pub fn is_streaming(&self) -> bool {
        self.active_turn().is_some()
    }

    /// Append a user turn.
    ///
    /// Returns `false` without touching the history if `text` is blank.
    pub fn append_user_turn(&mut self, text: impl Into<String>) -> Result<bool> {
        self.ensure_idle()?;

        let text = text.into();
        if text.trim().is_empty() {
            trace!("Ignoring empty user turn.");
            return Ok(false);
        }

        self.push(Turn::user(text));
        Ok(true)
    }

    /// Append an empty, in-progress assistant turn.
    pub fn begin_assistant_turn(&mut self) -> Result<()> {
        self.ensure_idle()?;
        self.push(Turn::pending_assistant());
        Ok(())
    }

    /// Apply a streamed delta to the active turn.
    ///
    /// Calling this without an active turn is a sequencing bug in the caller
    /// and yields [`Error::NoActiveTurn`].
    pub fn apply_delta(&mut self, delta: &Delta) -> Result<Applied> {
        let Some(turn) = self.turns.last_mut().filter(|turn| turn.is_in_progress()) else {
            return Err(Error::NoActiveTurn);
        };

        let applied = match delta {
            Delta::Content(fragment) if fragment.is_empty() => Applied::Ignored,
            Delta::Content(fragment) => {
                turn.push_str(fragment);
                Applied::Content
            }
            Delta::Error(error) => {
                turn.fail(error);
                Applied::Error
            }
            Delta::Heartbeat => Applied::Ignored,
        };

        if applied.is_content_bearing() {
            self.version += 1;
        }

        Ok(applied)
    }

    /// End the active turn, if any.
    ///
    /// Returns `true` if a turn was ended.
    pub fn end_turn(&mut self) -> bool {
        let ended = self.turns.last_mut().is_some_and(Turn::end);
        if ended {
            self.version += 1;
        }

        ended
    }

    /// Replace the whole history.
    pub fn replace(&mut self, turns: Vec<Turn>) -> Result<()> {
        self.ensure_idle()?;

        // Turns built outside this type are never in progress, but a clone of
        // a streaming conversation could be handed back in.
        if turns.iter().any(Turn::is_in_progress) {
            return Err(Error::TurnInProgress);
        }

        trace!(old = self.turns.len(), new = turns.len(), "Replacing conversation.");
        self.turns = turns;
        self.version += 1;
        Ok(())
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.is_streaming() {
            return Err(Error::TurnInProgress);
        }

        Ok(())
    }

    fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
        self.version += 1;
    }
}

#[cfg(test)]
#[path = "conversation_tests.rs"]
mod tests;
