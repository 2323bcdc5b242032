use std::io;

pub(crate) type Result<T> = std::result::Result<T, Error>;

/// CLI Error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("a turn is still running")]
    Busy,

    #[error("no turn is running")]
    NoTurn,

    #[error("Configuration error: {0}")]
    Config(#[from] ai_config::Error),

    #[error("Conversation error: {0}")]
    Conversation(#[from] ai_conversation::Error),

    #[error("LLM error: {0}")]
    Llm(#[from] ai_llm::Error),

    #[error("Render error: {0}")]
    View(#[from] ai_view::Error),

    #[error("Failed to fetch {url}: {source}")]
    Fetch {
        url: url::Url,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No demo manifest configured. Set `demos.manifest` in the configuration.")]
    MissingManifest,

    #[error("No preview available: the last reply has no code block.")]
    NoPreview,

    #[error("{0}")]
    Turn(String),

    #[error("{0}")]
    Command(String),
}

#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        if std::mem::discriminant(self) != std::mem::discriminant(other) {
            return false;
        }

        // Good enough for testing purposes
        format!("{self:?}") == format!("{other:?}")
    }
}
