use std::{
    io::{self, Write as _},
    path::Path,
};

use ai_llm::Provider;
use ai_view::Renderer;
use crossterm::style::Stylize as _;
use tokio::io::{AsyncBufReadExt as _, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::{Output, Success, interruptible, save_transcript, write_html, write_preview};
use crate::{
    Ctx,
    controller::{Controller, Outcome},
    error::Result,
};

#[derive(Debug, clap::Args)]
pub(crate) struct Chat {
    /// Load a saved conversation (file path or URL) first.
    #[arg(long, value_name = "SRC", conflicts_with = "demo")]
    load: Option<String>,

    /// Load a demo conversation, by title or number, first.
    #[arg(long, value_name = "NAME")]
    demo: Option<String>,

    /// Model to use, instead of the configured one.
    #[arg(short, long)]
    model: Option<String>,
}

/// One line of user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Line<'a> {
    Prompt(&'a str),
    Save(&'a str),
    Load(&'a str),
    Demo(&'a str),
    Preview(&'a str),
    Html(&'a str),
    Clear,
    Help,
    Quit,
    Unknown(&'a str),
}

impl<'a> Line<'a> {
    pub(crate) fn parse(line: &'a str) -> Self {
        let trimmed = line.trim();
        let Some(command) = trimmed.strip_prefix('/') else {
            return Self::Prompt(line);
        };

        let (name, arg) = command
            .split_once(char::is_whitespace)
            .map_or((command, ""), |(name, arg)| (name, arg.trim()));

        match (name, arg) {
            ("save", arg) if !arg.is_empty() => Self::Save(arg),
            ("load", arg) if !arg.is_empty() => Self::Load(arg),
            ("demo", arg) if !arg.is_empty() => Self::Demo(arg),
            ("preview", arg) if !arg.is_empty() => Self::Preview(arg),
            ("html", arg) if !arg.is_empty() => Self::Html(arg),
            ("clear", "") => Self::Clear,
            ("help" | "?", "") => Self::Help,
            ("quit" | "exit" | "q", "") => Self::Quit,
            _ => Self::Unknown(trimmed),
        }
    }
}

const HELP: &str = "\
/save PATH     save the conversation as JSON
/load SRC      load a conversation from a file or URL
/demo NAME     load a demo conversation
/preview PATH  write the last reply's preview as HTML
/html PATH     write the conversation as HTML
/clear         start over
/quit          leave";

impl Chat {
    pub(crate) async fn run(self, ctx: &mut Ctx) -> Output {
        let mut controller = ctx.controller(self.model.clone()).await?;

        if let Some(src) = &self.load {
            controller.load(ctx.load_transcript(src).await?)?;
        } else if let Some(demo) = &self.demo {
            controller.load(ctx.load_demo(demo).await?)?;
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let color = ctx.color();

        loop {
            prompt(color)?;
            let Some(line) = lines.next_line().await? else {
                break;
            };

            match Line::parse(&line) {
                Line::Quit => break,
                Line::Prompt(text) => {
                    let cancel = CancellationToken::new();
                    let outcome = interruptible(controller.submit(text, cancel.clone()), &cancel)
                        .await?;

                    match outcome {
                        Outcome::Errored(_) | Outcome::Completed | Outcome::Ignored => {}
                        Outcome::Cancelled => notice(color, "Cancelled.")?,
                        Outcome::Rejected => notice(color, "A turn is still running.")?,
                    }
                }
                command => {
                    if let Err(error) = run_command(ctx, &mut controller, command).await {
                        info!(%error, "Command failed.");
                        notice(color, &error.to_string())?;
                    }
                }
            }
        }

        Ok(Success::Ok)
    }
}

async fn run_command<P: Provider, R: Renderer>(
    ctx: &Ctx,
    controller: &mut Controller<P, R>,
    line: Line<'_>,
) -> Result<()> {
    debug!(?line, "Running chat command.");

    match line {
        Line::Save(path) => save_transcript(controller, Path::new(path)),
        Line::Load(src) => controller.load(ctx.load_transcript(src).await?),
        Line::Demo(name) => controller.load(ctx.load_demo(name).await?),
        Line::Preview(path) => write_preview(controller, Path::new(path)),
        Line::Html(path) => write_html(controller, Path::new(path)),
        Line::Clear => controller.clear(),
        Line::Help => {
            writeln!(io::stdout(), "{HELP}")?;
            Ok(())
        }
        Line::Unknown(input) => Err(crate::error::Error::Command(format!(
            "Unknown command `{input}`. Type /help for a list of commands."
        ))),
        Line::Prompt(_) | Line::Quit => Ok(()),
    }
}

fn prompt(color: bool) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    if color {
        write!(stdout, "\n{} ", ">".bold().green())?;
    } else {
        write!(stdout, "\n> ")?;
    }

    stdout.flush()
}

fn notice(color: bool, message: &str) -> io::Result<()> {
    let mut stderr = io::stderr().lock();
    if color {
        writeln!(stderr, "{}", message.yellow())
    } else {
        writeln!(stderr, "{message}")
    }
}
