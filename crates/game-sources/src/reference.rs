//! Source classification for the user-supplied game argument.

use std::fmt;

use reqwest::Url;

use crate::error::SourceError;

/// The raw game argument plus the explicit "treat as file" override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameReference {
    pub raw: String,
    pub force_file: bool,
}

/// Where a game reference points. Exactly one kind per reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    LocalFile,
    Lichess,
    ChessCom,
    GenericUrl,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceKind::LocalFile => "local file",
            SourceKind::Lichess => "lichess.org",
            SourceKind::ChessCom => "chess.com",
            SourceKind::GenericUrl => "URL",
        };
        f.write_str(name)
    }
}

impl GameReference {
    pub fn new(raw: impl Into<String>, force_file: bool) -> Self {
        Self {
            raw: raw.into(),
            force_file,
        }
    }

    /// The reference as an absolute URL with a host, if it is one.
    pub fn url(&self) -> Option<Url> {
        let url = Url::parse(&self.raw).ok()?;
        url.host_str()?;
        Some(url)
    }

    /// Decide which source this reference points at. Never touches disk or network.
    ///
    /// `force_file` always wins. Otherwise a `.pgn` suffix means a local file,
    /// then the URL host picks the fetcher.
    pub fn classify(&self) -> Result<SourceKind, SourceError> {
        if self.force_file || self.raw.ends_with(".pgn") {
            return Ok(SourceKind::LocalFile);
        }

        if let Some(url) = self.url() {
            let host = url.host_str().unwrap_or_default();
            return Ok(if host == "lichess.org" {
                SourceKind::Lichess
            } else if host == "chess.com" || host.ends_with(".chess.com") {
                SourceKind::ChessCom
            } else {
                SourceKind::GenericUrl
            });
        }

        Err(SourceError::InvalidGameReference(self.raw.clone()))
    }
}
