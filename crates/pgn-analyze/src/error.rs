//! Analyzer error types

use std::time::Duration;

use chess_core::PgnError;
use game_sources::SourceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid game reference {0:?}: expected a .pgn file or a URL (use --force-file for other paths)")]
    InvalidGameReference(String),

    #[error("Game not found: {0}")]
    GameNotFound(String),

    #[error("Invalid PGN: {0}")]
    InvalidPgn(#[from] PgnError),

    #[error("Engine I/O error: {0}")]
    EngineIo(String),

    #[error("Malformed engine output: {0}")]
    MalformedEngineOutput(String),

    #[error("Engine did not finish within {0:?}")]
    Timeout(Duration),
}

impl From<SourceError> for AnalyzeError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::InvalidGameReference(raw) => AnalyzeError::InvalidGameReference(raw),
            SourceError::GameNotFound(msg) => AnalyzeError::GameNotFound(msg),
            SourceError::HttpClient(e) => {
                AnalyzeError::Config(format!("failed to build HTTP client: {e}"))
            }
        }
    }
}
