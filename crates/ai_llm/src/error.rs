pub(crate) type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Stream processing error: {0}")]
    Stream(String),

    #[error("API error (status {}): {}", .code, .message)]
    Api { code: u16, message: String },

    #[error("client config error: {0}")]
    Config(String),

    #[error("stream stalled: no data received for {0:?}")]
    Timeout(std::time::Duration),

    #[error("missing credentials: {0}")]
    Credentials(String),
}

impl Error {
    /// Whether retrying the same request may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Request(error) => error.is_timeout() || error.is_connect(),
            Self::Api { code, .. } => matches!(code, 408 | 429 | 500 | 502 | 503 | 504),
            Self::Timeout(_) => true,
            Self::Stream(_) | Self::Config(_) | Self::Credentials(_) => false,
        }
    }
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
