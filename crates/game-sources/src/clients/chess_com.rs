//! Chess.com live games, resolved in two steps: the callback endpoint gives
//! the game's month and a player, and that player's monthly archive holds
//! the PGN.

use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, info};

use super::get_text;
use crate::error::SourceError;

const CALLBACK_BASE: &str = "https://www.chess.com/callback/live/game";
const ARCHIVE_BASE: &str = "https://api.chess.com/pub/player";
const LIVE_GAME_BASE: &str = "https://www.chess.com/game/live";

#[derive(Debug, Deserialize)]
struct CallbackResponse {
    game: CallbackGame,
    players: CallbackPlayers,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CallbackGame {
    pgn_headers: PgnHeaders,
}

#[derive(Debug, Deserialize)]
struct PgnHeaders {
    #[serde(rename = "Date")]
    date: String,
}

#[derive(Debug, Deserialize)]
struct CallbackPlayers {
    top: CallbackPlayer,
}

#[derive(Debug, Deserialize)]
struct CallbackPlayer {
    username: String,
}

#[derive(Debug, Deserialize)]
struct Archive {
    games: Vec<ArchiveGame>,
}

#[derive(Debug, Deserialize)]
struct ArchiveGame {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    pgn: Option<String>,
}

/// The monthly archive that should contain a given live game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveLocation {
    pub username: String,
    pub year: String,
    pub month: String,
}

impl ArchiveLocation {
    pub fn archive_url(&self) -> String {
        format!(
            "{ARCHIVE_BASE}/{}/games/{}/{}",
            self.username, self.year, self.month
        )
    }
}

pub struct ChessComClient {
    client: Client,
}

impl ChessComClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn fetch_game(&self, url: &Url) -> Result<String, SourceError> {
        let game_id = game_id_from_url(url).ok_or_else(|| {
            SourceError::GameNotFound(format!("no chess.com game id in {url}"))
        })?;
        info!(%game_id, "Fetching Chess.com game");

        let location = self.locate_archive(&game_id).await?;
        debug!(?location, "Resolved Chess.com archive");

        let what = format!("chess.com archive {}/{}", location.year, location.month);
        let body = get_text(&self.client, &location.archive_url(), &what).await?;
        find_game_pgn(&body, &game_id)
    }

    /// Step one: ask the callback endpoint which month and player to look under.
    async fn locate_archive(&self, game_id: &str) -> Result<ArchiveLocation, SourceError> {
        let body = get_text(
            &self.client,
            &format!("{CALLBACK_BASE}/{game_id}"),
            &format!("chess.com game {game_id}"),
        )
        .await?;
        parse_callback(&body)
    }
}

/// The final path segment of a game URL (the query string is never part of it).
pub fn game_id_from_url(url: &Url) -> Option<String> {
    let id = url.path_segments()?.filter(|s| !s.is_empty()).last()?;
    if id.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(id.to_string())
    } else {
        None
    }
}

/// Read the archive month (from the `Date` header) and the top player's
/// username out of a callback response.
pub fn parse_callback(body: &str) -> Result<ArchiveLocation, SourceError> {
    let resp: CallbackResponse = serde_json::from_str(body).map_err(|e| {
        SourceError::GameNotFound(format!("unexpected chess.com callback response: {e}"))
    })?;

    // "2024.03.15" -> ("2024", "03")
    let mut parts = resp.game.pgn_headers.date.split('.');
    let (year, month) = match (parts.next(), parts.next()) {
        (Some(y), Some(m))
            if y.len() == 4
                && m.len() == 2
                && y.chars().all(|c| c.is_ascii_digit())
                && m.chars().all(|c| c.is_ascii_digit()) =>
        {
            (y.to_string(), m.to_string())
        }
        _ => {
            return Err(SourceError::GameNotFound(format!(
                "unexpected chess.com game date {:?}",
                resp.game.pgn_headers.date
            )))
        }
    };

    Ok(ArchiveLocation {
        username: resp.players.top.username.to_lowercase(),
        year,
        month,
    })
}

/// Scan a monthly archive for the live game with this id and return its PGN.
pub fn find_game_pgn(body: &str, game_id: &str) -> Result<String, SourceError> {
    let archive: Archive = serde_json::from_str(body).map_err(|e| {
        SourceError::GameNotFound(format!("unexpected chess.com archive response: {e}"))
    })?;

    let wanted = format!("{LIVE_GAME_BASE}/{game_id}");
    let game = archive
        .games
        .into_iter()
        .find(|g| g.url.as_deref() == Some(wanted.as_str()))
        .ok_or_else(|| {
            SourceError::GameNotFound(format!("game {game_id} is not in the player's archive"))
        })?;

    match game.pgn {
        Some(pgn) if !pgn.trim().is_empty() => Ok(pgn),
        _ => Err(SourceError::GameNotFound(format!(
            "archive entry for game {game_id} has no PGN"
        ))),
    }
}
