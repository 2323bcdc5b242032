//! Configuration for the autoimprove client.
//!
//! All fields have defaults, so an empty (or missing) file is a valid
//! configuration. A handful of settings can be overridden from the environment,
//! see [`Config::apply_env`].

mod error;

use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use url::Url;

pub use crate::error::Error;
use crate::error::Result;

/// Application name for configuration file storage paths.
const APPLICATION: &str = "autoimprove";

/// Configuration file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "autoimprove.toml";

/// Overrides `provider.endpoint`.
pub const ENV_ENDPOINT: &str = "AUTOIMPROVE_ENDPOINT";

/// Overrides `provider.model`.
pub const ENV_MODEL: &str = "AUTOIMPROVE_MODEL";

/// Overrides `conversation.summary_marker`. An empty value unsets it.
pub const ENV_SUMMARY_MARKER: &str = "AUTOIMPROVE_SUMMARY_MARKER";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub provider: ProviderConfig,
    pub conversation: ConversationConfig,
    pub demos: DemosConfig,
    pub style: StyleConfig,
}

/// The chat completion endpoint and how to authenticate with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    /// Chat completion URL.
    pub endpoint: String,

    pub model: String,

    /// Environment variable holding the bearer token.
    pub token_env: String,

    /// Endpoint returning `{"token": "..."}`, used when `token_env` is unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,

    /// Appended to the token as `<token>:<suffix>`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_suffix: Option<String>,

    /// Seconds without data before a stream is considered stalled. Zero
    /// disables the timeout.
    pub idle_timeout_secs: u64,

    /// Retries for transient failures before a stream opens.
    pub max_retries: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_owned(),
            model: "gpt-4o-mini".to_owned(),
            token_env: "AUTOIMPROVE_TOKEN".to_owned(),
            token_url: None,
            token_suffix: None,
            idle_timeout_secs: 60,
            max_retries: 3,
        }
    }
}

impl ProviderConfig {
    pub fn endpoint(&self) -> Result<Url> {
        parse_url("provider.endpoint", &self.endpoint)
    }

    pub fn token_url(&self) -> Result<Option<Url>> {
        self.token_url
            .as_deref()
            .map(|url| parse_url("provider.token_url", url))
            .transpose()
    }

    #[must_use]
    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.idle_timeout_secs > 0).then(|| Duration::from_secs(self.idle_timeout_secs))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConversationConfig {
    /// First turn of every new conversation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    /// When set, older assistant turns are sent as the text following the
    /// last occurrence of this marker.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_marker: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemosConfig {
    /// Path or URL of the demo manifest.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StyleConfig {
    /// Use color in terminal output.
    pub color: bool,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self { color: true }
    }
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(Into::into)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(Into::into)
    }

    /// Load the configuration.
    ///
    /// An explicit `path` must exist. Without one, `./autoimprove.toml` and
    /// then the user configuration file are tried, falling back to defaults.
    /// Environment overrides are applied last.
    ///
    /// Returns the configuration and the file it was read from, if any.
    pub fn load(path: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        let path = match path {
            Some(path) if path.is_file() => Some(path.to_path_buf()),
            Some(path) => return Err(Error::NotFound(path.to_path_buf())),
            None => search_paths().into_iter().find(|path| path.is_file()),
        };

        let mut config = match &path {
            Some(path) => {
                debug!(path = %path.display(), "Loading configuration file.");
                Self::read(path)?
            }
            None => {
                debug!("No configuration file found, using defaults.");
                Self::default()
            }
        };

        config.apply_env(|key| env::var(key).ok());
        Ok((config, path))
    }

    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml(&content)
    }

    /// Write the configuration to `path`, creating parent directories.
    pub fn write(&self, path: &Path) -> Result<()> {
        let io = |source| Error::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io)?;
        }

        fs::write(path, self.to_toml()?).map_err(io)
    }

    /// Apply overrides from `lookup`, usually the process environment.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(endpoint) = lookup(ENV_ENDPOINT).filter(|v| !v.is_empty()) {
            trace!(endpoint, "Endpoint overridden from environment.");
            self.provider.endpoint = endpoint;
        }

        if let Some(model) = lookup(ENV_MODEL).filter(|v| !v.is_empty()) {
            trace!(model, "Model overridden from environment.");
            self.provider.model = model;
        }

        if let Some(marker) = lookup(ENV_SUMMARY_MARKER) {
            trace!(marker, "Summary marker overridden from environment.");
            self.conversation.summary_marker = Some(marker).filter(|m| !m.is_empty());
        }
    }
}

/// Candidate configuration files, in order of precedence.
#[must_use]
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
    paths.extend(user_config_path());
    paths
}

/// The configuration file in the user's config directory.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", APPLICATION).map(|dirs| dirs.config_dir().join("config.toml"))
}

fn parse_url(field: &'static str, value: &str) -> Result<Url> {
    Url::parse(value).map_err(|source| Error::InvalidUrl { field, source })
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
