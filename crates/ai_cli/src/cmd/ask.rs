use std::path::PathBuf;

use tokio_util::sync::CancellationToken;
use tracing::info;

use super::{Output, Success, interruptible, save_transcript, write_html, write_preview};
use crate::{Ctx, controller::Outcome, error::Error};

#[derive(Debug, clap::Args)]
pub(crate) struct Ask {
    /// The prompt to send.
    prompt: String,

    /// Load a saved conversation (file path or URL) first.
    #[arg(long, value_name = "SRC", conflicts_with = "demo")]
    load: Option<String>,

    /// Load a demo conversation, by title or number, first.
    #[arg(long, value_name = "NAME")]
    demo: Option<String>,

    /// Save the conversation as JSON afterwards.
    #[arg(long, value_name = "PATH")]
    save: Option<PathBuf>,

    /// Write the preview of the reply as an HTML page.
    #[arg(long, value_name = "PATH")]
    preview: Option<PathBuf>,

    /// Write the conversation as an HTML page.
    #[arg(long, value_name = "PATH")]
    html: Option<PathBuf>,

    /// Model to use, instead of the configured one.
    #[arg(short, long)]
    model: Option<String>,
}

impl Ask {
    pub(crate) async fn run(self, ctx: &mut Ctx) -> Output {
        let mut controller = ctx.controller(self.model.clone()).await?;

        if let Some(src) = &self.load {
            controller.load(ctx.load_transcript(src).await?)?;
        } else if let Some(demo) = &self.demo {
            controller.load(ctx.load_demo(demo).await?)?;
        }

        let cancel = CancellationToken::new();
        let turn = controller.submit(&self.prompt, cancel.clone());
        let outcome = interruptible(turn, &cancel).await?;
        info!(?outcome, "Turn ended.");

        if let Some(path) = &self.save {
            save_transcript(&controller, path)?;
        }

        if let Some(path) = &self.html {
            write_html(&controller, path)?;
        }

        match outcome {
            Outcome::Completed | Outcome::Cancelled => {}
            Outcome::Errored(text) => return Err(Error::Turn(text)),
            Outcome::Ignored => return Err(Error::Command("The prompt is empty.".to_owned())),
            Outcome::Rejected => return Err(Error::Busy),
        }

        if let Some(path) = &self.preview {
            write_preview(&controller, path)?;
        }

        Ok(Success::Ok)
    }
}
