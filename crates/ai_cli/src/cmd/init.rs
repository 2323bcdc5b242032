use std::path::PathBuf;

use ai_config::{Config, LOCAL_CONFIG_FILE};
use crossterm::style::Stylize as _;

use super::Output;
use crate::error::Error;

#[derive(Debug, clap::Args)]
pub(crate) struct Init {
    /// Where to write the configuration. Defaults to `./autoimprove.toml`.
    path: Option<PathBuf>,

    /// Overwrite an existing file.
    #[arg(short, long)]
    force: bool,
}

impl Init {
    pub(crate) fn run(&self) -> Output {
        let path = self
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE));

        if path.exists() && !self.force {
            return Err(Error::Command(format!(
                "{} already exists. Use `{}` to overwrite it.",
                path.display(),
                "--force".bold().yellow()
            )));
        }

        Config::default().write(&path)?;

        Ok(format!("Wrote default configuration to {}", path.display().to_string().bold()).into())
    }
}
