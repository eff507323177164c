//! Argument parsing, subcommand handlers, and log setup for `bidiq`.

use std::path::{Path, PathBuf};

use bidiq_core::{AnalysisOptions, AnalysisProgress, Analyzer, generate_clarification_questions};
use bidiq_llm::OpenRouterClient;
use bidiq_shared::{
    AnalysisResult, AppConfig, BidIqError, ClarificationQuestion, init_config, load_config,
};
use bidiq_text::{basic_analysis, chunk_text};
use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// BidIQ: turn RFP documents into bid checklists.
#[derive(Parser)]
#[command(
    name = "bidiq",
    version,
    about = "Analyze RFP documents: requirements, timeline, budget, and required bid items.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log output on stderr: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// `bidiq` subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Analyze an RFP with the configured model.
    Analyze {
        /// Plain-text RFP file.
        file: PathBuf,

        /// Also generate clarification questions.
        #[arg(short, long)]
        questions: bool,

        /// Print compact JSON instead of pretty-printed.
        #[arg(long)]
        compact: bool,

        /// Model ID (overrides the configured default).
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Pattern-based extraction only. No API key needed.
    Extract {
        /// Plain-text RFP file.
        file: PathBuf,
    },

    /// Generate clarification questions for an RFP.
    Questions {
        /// Plain-text RFP file.
        file: PathBuf,

        /// Use pattern extraction instead of the model.
        #[arg(long)]
        heuristic: bool,
    },

    /// Show how a document would be chunked.
    Chunk {
        /// Plain-text RFP file.
        file: PathBuf,

        /// Maximum chunk size in characters (defaults to config).
        #[arg(long)]
        max_size: Option<usize>,
    },

    /// Manage `~/.bidiq/bidiq.toml`.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Write a settings file with default values.
    Init,
    /// Print the settings in effect, defaults included.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Install the global subscriber. `RUST_LOG` wins over `-v`.
///
/// Logs go to stderr so JSON output on stdout stays parseable.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "bidiq=info",
        1 => "bidiq=debug",
        _ => "bidiq=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Analyze {
            file,
            questions,
            compact,
            model,
        } => cmd_analyze(&file, questions, compact, model.as_deref()).await,
        Command::Extract { file } => cmd_extract(&file),
        Command::Questions { file, heuristic } => cmd_questions(&file, heuristic).await,
        Command::Chunk { file, max_size } => cmd_chunk(&file, max_size),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

/// Analysis plus its questions, printed by `analyze --questions`.
#[derive(Serialize)]
struct AnalysisReport<'a> {
    analysis: &'a AnalysisResult,
    questions: &'a [ClarificationQuestion],
}

async fn cmd_analyze(file: &Path, questions: bool, compact: bool, model: Option<&str>) -> Result<()> {
    let config = load_config()?;
    let text = read_document(file)?;
    let result = analyze_with_model(&config, &text, model).await?;

    let output = if questions {
        let questions = generate_clarification_questions(&result.required_items);
        let report = AnalysisReport {
            analysis: &result,
            questions: &questions,
        };
        to_json(&report, compact)?
    } else {
        to_json(&result, compact)?
    };

    println!("{output}");
    Ok(())
}

fn cmd_extract(file: &Path) -> Result<()> {
    let text = read_document(file)?;
    let result = basic_analysis(&text);
    info!(
        required_items = result.required_items.len(),
        "pattern extraction complete"
    );
    println!("{}", to_json(&result, false)?);
    Ok(())
}

async fn cmd_questions(file: &Path, heuristic: bool) -> Result<()> {
    let text = read_document(file)?;
    let result = if heuristic {
        basic_analysis(&text)
    } else {
        let config = load_config()?;
        analyze_with_model(&config, &text, None).await?
    };

    let questions = generate_clarification_questions(&result.required_items);
    if questions.is_empty() {
        println!("No required items found; nothing to clarify.");
        return Ok(());
    }

    let mut current = None;
    for q in &questions {
        if current != Some(q.section) {
            println!();
            println!("  {}", q.section);
            current = Some(q.section);
        }
        println!("    [{}] {}", q.importance, q.question);
    }
    println!();

    Ok(())
}

fn cmd_chunk(file: &Path, max_size: Option<usize>) -> Result<()> {
    let text = read_document(file)?;
    let max_size = match max_size {
        Some(size) => size,
        None => load_config()?.analysis.max_chunk_size,
    };
    if max_size == 0 {
        return Err(BidIqError::validation("--max-size must be positive").into());
    }

    let chunks = chunk_text(&text, max_size);
    println!();
    println!("  Chunks: {} (max {max_size} chars)", chunks.len());
    for (i, chunk) in chunks.iter().enumerate() {
        let preview: String = chunk.chars().take(60).collect();
        println!(
            "  {:>3}  {:>5} chars  {}",
            i + 1,
            chunk.chars().count(),
            preview.replace('\n', " ")
        );
    }
    println!();

    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Wrote default settings to {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn analyze_with_model(
    config: &AppConfig,
    text: &str,
    model: Option<&str>,
) -> Result<AnalysisResult> {
    let mut client = OpenRouterClient::from_config(config)?;
    if let Some(model) = model {
        client = client.with_model(model);
    }

    info!(model = client.model(), doc_chars = text.len(), "analyzing RFP");

    let analyzer = Analyzer::new(client, AnalysisOptions::from(config));
    let progress = CliProgress::new();
    let result = analyzer.analyze_with_progress(text, &progress).await;
    progress.finish();
    Ok(result?)
}

fn read_document(path: &Path) -> Result<String> {
    let text = std::fs::read_to_string(path).map_err(|e| BidIqError::io(path, e))?;
    Ok(text)
}

fn to_json<T: Serialize>(value: &T, compact: bool) -> Result<String> {
    let json = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    Ok(json)
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Spinner on stderr showing the current analysis phase.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .expect("valid spinner template")
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl AnalysisProgress for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn analyze_flags_parse() {
        let cli = Cli::parse_from(["bidiq", "-v", "analyze", "rfp.txt", "--questions", "--compact"]);
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Command::Analyze {
                file,
                questions,
                compact,
                model,
            } => {
                assert_eq!(file, PathBuf::from("rfp.txt"));
                assert!(questions);
                assert!(compact);
                assert!(model.is_none());
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn chunk_max_size_parses() {
        let cli = Cli::parse_from(["bidiq", "chunk", "rfp.txt", "--max-size", "500"]);
        assert!(matches!(
            cli.command,
            Command::Chunk {
                max_size: Some(500),
                ..
            }
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_document(Path::new("/nonexistent/rfp.txt")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/rfp.txt"));
    }
}
