use std::path::Path;
use std::time::Duration;

use tracing::info;

use crate::clients::chess_com::ChessComClient;
use crate::clients::generic::GenericClient;
use crate::clients::lichess::LichessClient;
use crate::clients::build_client;
use crate::error::SourceError;
use crate::local::read_pgn_file;
use crate::reference::{GameReference, SourceKind};

/// Turns a game reference into PGN text, one source at a time.
pub struct GameFetcher {
    lichess: LichessClient,
    chess_com: ChessComClient,
    generic: GenericClient,
}

impl GameFetcher {
    pub fn new(http_timeout: Duration) -> Result<Self, SourceError> {
        let client = build_client(http_timeout)?;
        Ok(Self {
            lichess: LichessClient::new(client.clone()),
            chess_com: ChessComClient::new(client.clone()),
            generic: GenericClient::new(client),
        })
    }

    /// Classify `reference` and fetch its PGN from the matching source.
    pub async fn fetch(&self, reference: &GameReference) -> Result<String, SourceError> {
        let kind = reference.classify()?;
        info!(game = %reference.raw, %kind, "Resolved game source");
        self.fetch_kind(reference, kind).await
    }

    /// Fetch with an already-decided source kind.
    pub async fn fetch_kind(
        &self,
        reference: &GameReference,
        kind: SourceKind,
    ) -> Result<String, SourceError> {
        let url = || {
            reference
                .url()
                .ok_or_else(|| SourceError::InvalidGameReference(reference.raw.clone()))
        };

        match kind {
            SourceKind::LocalFile => read_pgn_file(Path::new(&reference.raw)).await,
            SourceKind::Lichess => self.lichess.fetch_game(&url()?).await,
            SourceKind::ChessCom => self.chess_com.fetch_game(&url()?).await,
            SourceKind::GenericUrl => self.generic.fetch_game(&url()?).await,
        }
    }
}
