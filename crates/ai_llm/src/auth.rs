use std::{env, fmt};

use serde::Deserialize;
use tracing::{debug, trace};
use url::Url;

use crate::error::{Error, Result};

/// A bearer token, with an optional `:suffix` appended in the authorization
/// header.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    value: String,
    suffix: Option<String>,
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("value", &"[REDACTED]")
            .field("suffix", &self.suffix)
            .finish()
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    token: String,
}

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            suffix: None,
        }
    }

    #[must_use]
    pub fn with_suffix(mut self, suffix: Option<String>) -> Self {
        self.suffix = suffix.filter(|s| !s.is_empty());
        self
    }

    /// Read the token from an environment variable.
    pub fn from_env(var: &str) -> Result<Self> {
        match env::var(var) {
            Ok(value) if !value.trim().is_empty() => Ok(Self::new(value.trim())),
            _ => Err(Error::Credentials(format!("{var} is not set"))),
        }
    }

    /// Fetch the token from an endpoint returning `{"token": "..."}`.
    pub async fn fetch(http_client: &reqwest::Client, url: &Url) -> Result<Self> {
        trace!(%url, "Fetching token.");

        let response = http_client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Credentials(format!(
                "token endpoint returned {}",
                status.as_u16()
            )));
        }

        let TokenResponse { token } = response.json().await?;
        if token.is_empty() {
            return Err(Error::Credentials("token endpoint returned no token".into()));
        }

        debug!("Fetched token.");
        Ok(Self::new(token))
    }

    pub(crate) fn header_value(&self) -> String {
        match &self.suffix {
            Some(suffix) => format!("Bearer {}:{suffix}", self.value),
            None => format!("Bearer {}", self.value),
        }
    }
}
