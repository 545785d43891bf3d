//! Game source error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error(
        "invalid game reference {0:?}: expected a .pgn file or a URL (use --force-file for other paths)"
    )]
    InvalidGameReference(String),

    /// The source was reachable (or at least addressable) but yielded no usable game.
    #[error("game not found: {0}")]
    GameNotFound(String),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}
