pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("a turn is still in progress")]
    TurnInProgress,

    #[error("no turn is in progress")]
    NoActiveTurn,

    #[error("Invalid transcript: {0}")]
    Transcript(String),

    #[error("Invalid demo manifest: {0}")]
    Manifest(String),

    #[error("unknown demo: {0}")]
    UnknownDemo(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
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
