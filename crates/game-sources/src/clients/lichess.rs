use reqwest::{Client, Url};
use tracing::info;

use super::get_text;
use crate::error::SourceError;

const EXPORT_BASE: &str = "https://lichess.org/game/export";

/// Player-specific links append 4 characters to the 8-character game id.
const GAME_ID_LEN: usize = 8;
const PLAYER_LINK_LEN: usize = 12;

pub struct LichessClient {
    client: Client,
}

impl LichessClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Fetch a game's PGN from the export endpoint. The body is PGN already.
    ///
    /// A lichess URL whose path names no game is reported as not found; the
    /// reference itself was already classified as lichess.
    pub async fn fetch_game(&self, url: &Url) -> Result<String, SourceError> {
        let game_id = game_id_from_url(url).ok_or_else(|| {
            SourceError::GameNotFound(format!("no lichess game id in {url}"))
        })?;
        info!(%game_id, "Fetching Lichess game");

        get_text(
            &self.client,
            &export_url(&game_id),
            &format!("lichess game {game_id}"),
        )
        .await
    }
}

/// Extract the game id from `https://lichess.org/<id>[/...]` or
/// `https://lichess.org/game/export/<id>`.
pub fn game_id_from_url(url: &Url) -> Option<String> {
    let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();

    let id = match segments.as_slice() {
        ["game", "export", id, ..] => *id,
        [id, ..] => *id,
        [] => return None,
    };

    if !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }

    // Other lengths go to the export endpoint as-is and stand or fall there.
    if id.len() == PLAYER_LINK_LEN {
        Some(id[..GAME_ID_LEN].to_string())
    } else {
        Some(id.to_string())
    }
}

pub fn export_url(game_id: &str) -> String {
    format!("{EXPORT_BASE}/{game_id}?evals=0&clocks=0")
}
