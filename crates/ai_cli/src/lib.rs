mod cmd;
pub mod controller;
mod ctx;
pub mod error;
mod source;

use std::{
    fmt,
    io::{self, Write as _},
    path::PathBuf,
    process::ExitCode,
};

use ai_config::Config;
use clap::{ArgAction, Parser};
use cmd::{Commands, Output, Success};
use comfy_table::{Row, Table};
use ctx::Ctx;
use error::Result;
use tracing::{debug, trace};

/// Iterate on single-page apps with a streaming LLM.
#[derive(Parser)]
#[command(name = "autoimprove", author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten, next_help_heading = "Global Options")]
    globals: Globals,

    #[command(subcommand, next_help_heading = "Options")]
    command: Commands,
}

#[derive(Debug, clap::Args)]
pub struct Globals {
    /// Path to the configuration file.
    #[arg(short, long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity of logging.
    ///
    /// Can be specified multiple times to increase verbosity.
    ///
    /// Defaults to printing "error" messages. For each increase in verbosity,
    /// the log level is set to "warn", "info", "debug", and "trace"
    /// respectively.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Suppress all output, including errors.
    #[arg(short, long, global = true)]
    quiet: bool,
}

impl fmt::Display for Cli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entry(&"config", &self.globals.config)
            .entry(&"verbose", &self.globals.verbose)
            .entry(&"quiet", &self.globals.quiet)
            .finish()
    }
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();
    let quiet = cli.globals.quiet;

    configure_logging(cli.globals.verbose, quiet);
    trace!(command = cli.command.name(), arguments = %cli, "Starting CLI run.");

    let (success, output) = match run_inner(cli).await {
        Ok(output) => (true, output_to_string(output)),
        Err(error) => (false, error.to_string()),
    };

    if !quiet && !output.is_empty() {
        let result = if success {
            writeln!(io::stdout(), "{output}")
        } else {
            writeln!(io::stderr(), "{output}")
        };

        if let Err(error) = result {
            debug!(%error, "Failed to write output.");
        }
    }

    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

async fn run_inner(cli: Cli) -> Output {
    match cli.command {
        Commands::Init(args) => args.run(),
        cmd => {
            let config = load_config(cli.globals.config.as_deref())?;
            let mut ctx = Ctx::new(config);
            cmd.run(&mut ctx).await
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    let (config, path) = Config::load(path)?;
    match path {
        Some(path) => debug!(path = %path.display(), "Loaded configuration."),
        None => debug!("Using default configuration."),
    }

    Ok(config)
}

fn output_to_string(output: Success) -> String {
    match output {
        Success::Ok => String::new(),
        Success::Message(msg) => msg,
        Success::Table { header, rows } => table(header, rows),
    }
}

fn table(header: Row, rows: Vec<Row>) -> String {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL_CONDENSED);
    table.set_header(header);
    table.add_rows(rows);

    table.trim_fmt()
}

fn configure_logging(verbose: u8, quiet: bool) {
    use tracing::level_filters::LevelFilter;
    use tracing_subscriber::fmt;

    let mut level = match verbose {
        0 => LevelFilter::ERROR,
        1 => LevelFilter::WARN,
        2 => LevelFilter::INFO,
        3 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    if quiet {
        level = LevelFilter::OFF;
    }

    let mut filter = vec!["off".to_owned()];
    for krate in ["cli", "config", "conversation", "llm", "preview", "view"] {
        filter.push(format!("ai_{krate}={level}"));
    }

    let format = fmt::format().with_target(false).compact();

    if level < LevelFilter::DEBUG {
        tracing_subscriber::fmt()
            .event_format(format)
            .without_time()
            .with_ansi(true)
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_env_filter(filter.join(","))
            .init();
    } else {
        tracing_subscriber::fmt()
            .event_format(format)
            .with_ansi(true)
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_env_filter(filter.join(","))
            .init();
    }
}
