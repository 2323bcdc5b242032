use std::io::{self, IsTerminal as _, Stdout};

use ai_config::Config;
use ai_conversation::Source;
use ai_llm::{Client, Token, retry::RetryConfig};
use ai_view::TerminalRenderer;
use tracing::{debug, warn};

use crate::{
    controller::{Controller, Settings},
    error::{Error, Result},
    source,
};

/// Context for the CLI application
pub(crate) struct Ctx {
    /// Configuration, after file and environment overrides.
    config: Config,

    /// Whether or not stdout is connected to a TTY.
    is_tty: bool,

    /// Shared HTTP client for the provider and document fetches.
    pub(crate) http: reqwest::Client,
}

impl Ctx {
    pub(crate) fn new(config: Config) -> Self {
        Self {
            config,
            is_tty: io::stdout().is_terminal(),
            http: reqwest::Client::new(),
        }
    }

    pub(crate) fn color(&self) -> bool {
        self.config.style.color && self.is_tty
    }

    /// Build the provider client, resolving credentials.
    pub(crate) async fn client(&self) -> Result<Client> {
        let provider = &self.config.provider;
        let endpoint = provider.endpoint()?;

        let mut client = Client::new(endpoint)
            .with_retry(RetryConfig {
                max_retries: provider.max_retries,
                ..RetryConfig::default()
            })
            .with_idle_timeout(provider.idle_timeout());

        let token = match Token::from_env(&provider.token_env) {
            Ok(token) => Some(token),
            Err(error) => match provider.token_url()? {
                Some(url) => Some(Token::fetch(&self.http, &url).await?),
                None => {
                    warn!(%error, "No token configured, sending unauthenticated requests.");
                    None
                }
            },
        };

        if let Some(token) = token {
            debug!("Using bearer token.");
            client = client.with_token(token.with_suffix(provider.token_suffix.clone()));
        }

        Ok(client)
    }

    /// Build a controller rendering to stdout.
    pub(crate) async fn controller(
        &self,
        model: Option<String>,
    ) -> Result<Controller<Client, TerminalRenderer<Stdout>>> {
        let client = self.client().await?;
        let renderer = TerminalRenderer::new(io::stdout()).with_color(self.color());
        let settings = Settings {
            model: model.unwrap_or_else(|| self.config.provider.model.clone()),
            system_prompt: self.config.conversation.system_prompt.clone(),
            summary_marker: self.config.conversation.summary_marker.clone(),
        };

        Ok(Controller::new(client, renderer, settings))
    }

    pub(crate) fn manifest_source(&self) -> Result<Source> {
        let manifest = self
            .config
            .demos
            .manifest
            .as_deref()
            .ok_or(Error::MissingManifest)?;

        manifest.parse().map_err(Into::into)
    }

    pub(crate) async fn load_demo(&self, query: &str) -> Result<Vec<ai_conversation::Turn>> {
        source::demo(&self.http, &self.manifest_source()?, query).await
    }

    pub(crate) async fn load_transcript(&self, src: &str) -> Result<Vec<ai_conversation::Turn>> {
        let src: Source = src.parse()?;
        source::transcript(&self.http, &src).await
    }
}
