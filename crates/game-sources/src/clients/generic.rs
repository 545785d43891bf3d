use reqwest::{Client, Url};
use tracing::info;

use super::get_text;
use crate::error::SourceError;

/// Fetches any other URL and hands the body on as PGN text.
pub struct GenericClient {
    client: Client,
}

impl GenericClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn fetch_game(&self, url: &Url) -> Result<String, SourceError> {
        info!(%url, "Fetching PGN from URL");
        get_text(&self.client, url.as_str(), url.as_str())
            .await
            .map_err(|e| match e {
                SourceError::GameNotFound(msg) => SourceError::GameNotFound(format!(
                    "{msg} (the URL must serve plain-text PGN, not an HTML page)"
                )),
                other => other,
            })
    }
}
