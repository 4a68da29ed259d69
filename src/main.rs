use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{debug, info};

use eidos_assist::completion::{completions_at, CompletionRequest, RequestContext};
use eidos_assist::config::{self, EngineConfig};
use eidos_assist::format::{reformat_source, Mode};
use eidos_assist::highlight::{classify_line, HighlightCheckpoint, Span};
use eidos_assist::logging::init_logger;
use eidos_assist::script::tokenize;

/// Reformatting, completion and highlighting for Eidos and SLiM scripts
#[derive(Parser)]
#[command(name = "eidos-assist")]
#[command(version)]
#[command(about = "Script intelligence for Eidos and SLiM", long_about = None)]
struct Cli {
    /// Log level for stderr (overrides RUST_LOG)
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Disable ANSI colors in log output
    #[arg(long, global = true)]
    no_color: bool,

    /// Also write a debug-level session log to the user cache directory
    #[arg(long, global = true)]
    log_file: bool,

    /// JSON configuration file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reindent a script and print it
    Format {
        /// Regenerate all whitespace, not just indentation
        #[arg(long)]
        full: bool,

        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Print completions at a byte offset as JSON
    Complete {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Byte offset of the cursor
        #[arg(long)]
        offset: usize,

        #[arg(long, value_enum, default_value_t = ContextArg::Slim)]
        context: ContextArg,
    },
    /// Print the highlighted spans of each line as JSON
    Highlight {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ContextArg {
    Slim,
    Eidos,
    Console,
}

impl From<ContextArg> for RequestContext {
    fn from(arg: ContextArg) -> Self {
        match arg {
            ContextArg::Slim => RequestContext::SlimScript,
            ContextArg::Eidos => RequestContext::EidosScript,
            ContextArg::Console => RequestContext::Console,
        }
    }
}

#[derive(Serialize)]
struct HighlightedLine {
    line: usize,
    spans: Vec<Span>,
}

fn read_script(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn print_json(value: &impl Serialize) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value).context("failed to write JSON")?;
    writeln!(stdout)?;
    Ok(())
}

fn run_format(config: &EngineConfig, file: &Path, full: bool) -> Result<()> {
    let source = read_script(file)?;
    let mode = if full { Mode::FullReformat } else { Mode::Prettyprint };
    let formatted = reformat_source(&source, mode, &config.format)
        .with_context(|| format!("cannot format {}", file.display()))?;
    io::stdout().lock().write_all(formatted.as_bytes())?;
    Ok(())
}

fn run_complete(config: &EngineConfig, file: &Path, offset: usize, context: ContextArg) -> Result<()> {
    let source = read_script(file)?;
    let request = CompletionRequest::new(context.into(), config);
    let completions = completions_at(&source, offset, &request);
    debug!("{} candidates at offset {}", completions.candidates.len(), offset);
    print_json(&completions)
}

fn run_highlight(file: &Path) -> Result<()> {
    let source = read_script(file)?;
    let tokens = tokenize(&source);
    let mut checkpoint = HighlightCheckpoint::start();
    let mut line_start = 0;
    let mut lines = Vec::new();
    for (line, text) in source.split_inclusive('\n').enumerate() {
        let (spans, next) = classify_line(&tokens, line_start, text.len(), checkpoint);
        checkpoint = next;
        line_start += text.len();
        if !spans.is_empty() {
            lines.push(HighlightedLine { line, spans });
        }
    }
    print_json(&lines)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _guard = init_logger(cli.no_color, cli.log_level.as_deref(), cli.log_file)
        .context("failed to initialize logging")?;

    let config = match &cli.config {
        Some(path) => config::load(path)?,
        None => EngineConfig::default(),
    };
    info!("eidos-assist {}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Format { full, file } => run_format(&config, &file, full),
        Commands::Complete { file, offset, context } => run_complete(&config, &file, offset, context),
        Commands::Highlight { file } => run_highlight(&file),
    }
}
