mod ask;
mod chat;
mod demos;
mod init;

use std::{fs, path::Path, sync::Arc};

use ai_conversation::{Role, transcript};
use ai_llm::Provider;
use ai_preview::Preview;
use ai_view::{Projector, Renderer, html};
use comfy_table::Row;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{
    Ctx,
    controller::Controller,
    error::{Error, Result},
};

#[derive(Debug, clap::Subcommand)]
pub(crate) enum Commands {
    /// Write the default configuration file.
    Init(init::Init),

    /// Send one prompt and stream the reply.
    #[command(visible_alias = "a")]
    Ask(ask::Ask),

    /// Start an interactive session.
    #[command(visible_alias = "c")]
    Chat(chat::Chat),

    /// List the demo conversations.
    Demos(demos::Demos),
}

impl Commands {
    pub(crate) async fn run(self, ctx: &mut Ctx) -> Output {
        match self {
            Commands::Ask(args) => args.run(ctx).await,
            Commands::Chat(args) => args.run(ctx).await,
            Commands::Demos(args) => args.run(ctx).await,
            Commands::Init(args) => args.run(),
        }
    }

    pub(crate) fn name(&self) -> &'static str {
        match self {
            Commands::Init(_) => "init",
            Commands::Ask(_) => "ask",
            Commands::Chat(_) => "chat",
            Commands::Demos(_) => "demos",
        }
    }
}

pub(crate) type Output = std::result::Result<Success, Error>;

/// The type of output that should be printed to the screen.
#[derive(Debug)]
pub(crate) enum Success {
    /// The command was successful.
    Ok,

    /// Single message to be printed to the screen.
    Message(String),

    /// List of details to be printed in a table.
    Table { header: Row, rows: Vec<Row> },
}

impl From<String> for Success {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}

/// Run `future` to completion, cancelling `cancel` on Ctrl-C.
///
/// The future is still driven after cancellation, so the turn can finish
/// cleanly.
pub(crate) async fn interruptible<F: Future>(future: F, cancel: &CancellationToken) -> F::Output {
    tokio::pin!(future);

    loop {
        tokio::select! {
            output = &mut future => return output,
            signal = tokio::signal::ctrl_c(), if !cancel.is_cancelled() => {
                if signal.is_ok() {
                    info!("Interrupted, cancelling turn.");
                    cancel.cancel();
                }
            }
        }
    }
}

pub(crate) fn save_transcript<P: Provider, R: Renderer>(
    controller: &Controller<P, R>,
    path: &Path,
) -> Result<()> {
    transcript::save(controller.conversation(), path)?;
    debug!(path = %path.display(), "Saved transcript.");
    Ok(())
}

/// Write the preview of the last finalized assistant turn.
///
/// Loaded turns were never streamed, so their preview may not be cached yet.
pub(crate) fn write_preview<P: Provider, R: Renderer>(
    controller: &Controller<P, R>,
    path: &Path,
) -> Result<()> {
    let page = controller
        .conversation()
        .turns()
        .iter()
        .rev()
        .find(|turn| turn.role() == Role::Assistant && !turn.is_in_progress())
        .map(|turn| {
            controller
                .cache()
                .peek(turn.content())
                .unwrap_or_else(|| Arc::new(Preview::from_content(turn.content())))
        })
        .and_then(|preview| html::preview_page(&preview))
        .ok_or(Error::NoPreview)?;

    write(path, &page)
}

/// Write the whole conversation as an HTML page.
pub(crate) fn write_html<P: Provider, R: Renderer>(
    controller: &Controller<P, R>,
    path: &Path,
) -> Result<()> {
    let tree = Projector::new()
        .with_html(true)
        .project(controller.conversation(), controller.cache());

    write(path, &html::page(&tree))
}

fn write(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, content)?;
    debug!(path = %path.display(), "Wrote file.");
    Ok(())
}

#[cfg(test)]
#[path = "cmd_tests.rs"]
mod tests;
