//! Print the comment threads of a .docx, .xlsx or .pptx file.

use clap::{ArgAction, Parser, ValueEnum};
use longan::ooxml::opc::pending::DEFAULT_MAX_PASSES;
use longan::ooxml::threads::dump;
use longan::{CommentExtractor, ExtractOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Thread roots as a JSON array
    Json,
    /// Persons and indented threads as text
    Dump,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Package to read
    path: PathBuf,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    #[arg(long, default_value_t = DEFAULT_MAX_PASSES, help = "Retry passes for parts that arrive early")]
    max_passes: usize,

    #[arg(long, help = "Fail on malformed fragments instead of skipping them")]
    strict: bool,

    #[arg(short, long, action = ArgAction::Count, help = "Log debug output to stderr")]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose > 0 { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let options = ExtractOptions::new()
        .with_max_passes(cli.max_passes)
        .with_strict_fragments(cli.strict);
    let forest = CommentExtractor::from_path(&cli.path)?
        .with_options(options)
        .extract_async()
        .await?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.format {
        OutputFormat::Json => {
            let roots: Vec<_> = forest.roots().collect();
            serde_json::to_writer_pretty(&mut out, &roots)?;
            writeln!(out)?;
        },
        OutputFormat::Dump => dump(&forest, &mut out)?,
    }
    Ok(())
}
