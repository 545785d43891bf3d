//! pgn-analyze
//!
//! Loads a game from a PGN file, lichess.org, chess.com or a plain-text PGN
//! URL and asks a UCI engine for the best move in its final position.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use game_sources::GameReference;
use pgn_analyze::{AnalysisResult, Analyzer, AnalyzerConfig, DEFAULT_DEPTH};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pgn-analyze")]
#[command(about = "Chess game analysis CLI", version)]
struct Cli {
    /// PGN file path, or a lichess.org / chess.com / plain-text PGN URL
    #[arg(value_name = "GAME")]
    game: String,

    /// Search depth passed to the engine
    #[arg(short, long, default_value_t = DEFAULT_DEPTH, value_parser = clap::value_parser!(u32).range(1..))]
    depth: u32,

    /// Treat GAME as a file path regardless of its extension or shape
    #[arg(short, long)]
    force_file: bool,

    /// Config file holding `stockfishPath`
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

fn render(result: &AnalysisResult, json: bool) -> anyhow::Result<String> {
    if json {
        return Ok(serde_json::to_string(result)?);
    }
    Ok(format!(
        "Best move: {}\nEvaluation: {}",
        result.best_move, result.evaluation
    ))
}

/// The one line printed for a failed run. Only the outermost message is
/// shown; each error's text already carries its cause.
fn error_line(err: &anyhow::Error) -> String {
    format!("error: {err}")
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", error_line(&err));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AnalyzerConfig::load(cli.config.as_deref())?;
    let analyzer = Analyzer::new(config)?;

    let reference = GameReference::new(cli.game, cli.force_file);
    let result = analyzer.analyze(&reference, cli.depth).await?;

    println!("{}", render(&result, cli.json)?);
    Ok(())
}
