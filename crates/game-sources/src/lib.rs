//! Game source resolution: classify a game argument and fetch its PGN from a
//! local file, lichess.org, chess.com, or any plain-text PGN URL.

pub mod clients;
pub mod error;
pub mod fetcher;
pub mod local;
pub mod reference;

pub use error::SourceError;
pub use fetcher::GameFetcher;
pub use reference::{GameReference, SourceKind};
