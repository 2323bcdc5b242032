//! Import and export of conversation history.
//!
//! A transcript is a pretty-printed JSON array of `{"role", "content"}`
//! objects. It is parsed as plain data: unknown fields, unknown roles and
//! non-string content are rejected.

use std::{fs, path::Path};

use tracing::{debug, trace};

use crate::{
    conversation::Conversation,
    error::{Error, Result},
    turn::Turn,
};

/// Serialize the ended turns of a conversation.
///
/// A turn that is still streaming is left out.
pub fn to_json(conversation: &Conversation) -> Result<String> {
    let turns = conversation
        .turns()
        .iter()
        .filter(|turn| !turn.is_in_progress())
        .collect::<Vec<_>>();

    serde_json::to_string_pretty(&turns).map_err(Into::into)
}

/// Parse a transcript into turns.
pub fn from_json(json: &str) -> Result<Vec<Turn>> {
    let turns: Vec<Turn> =
        serde_json::from_str(json).map_err(|error| Error::Transcript(error.to_string()))?;

    trace!(turns = turns.len(), "Parsed transcript.");
    Ok(turns)
}

pub fn save(conversation: &Conversation, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json = to_json(conversation)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, json)?;
    debug!(path = %path.display(), turns = conversation.len(), "Saved transcript.");

    Ok(())
}

pub fn load(path: impl AsRef<Path>) -> Result<Vec<Turn>> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)?;
    let turns = from_json(&json)?;
    debug!(path = %path.display(), turns = turns.len(), "Loaded transcript.");

    Ok(turns)
}

#[cfg(test)]
#[path = "transcript_tests.rs"]
mod tests;
