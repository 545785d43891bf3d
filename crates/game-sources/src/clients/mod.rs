//! HTTP clients for the game hosts we know how to read from.

pub mod chess_com;
pub mod generic;
pub mod lichess;

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::error::SourceError;

const USER_AGENT: &str = concat!("pgn-analyze/", env!("CARGO_PKG_VERSION"));

/// Build the single HTTP client shared by every fetcher in a run.
pub fn build_client(timeout: Duration) -> Result<Client, SourceError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(SourceError::HttpClient)
}

/// GET `url` and return the body, treating transport errors and non-2xx
/// statuses as a missing game. `what` names the resource for the message.
async fn get_text(client: &Client, url: &str, what: &str) -> Result<String, SourceError> {
    debug!(url, "GET");

    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|e| SourceError::GameNotFound(format!("{what}: request error: {e}")))?;

    if !resp.status().is_success() {
        return Err(SourceError::GameNotFound(format!(
            "{what}: HTTP {}",
            resp.status()
        )));
    }

    resp.text()
        .await
        .map_err(|e| SourceError::GameNotFound(format!("{what}: body read error: {e}")))
}
