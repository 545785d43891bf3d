use serde::{Deserialize, Serialize};

/// Header values picked out of the PGN tag section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameMetadata {
    pub white: Option<String>,
    pub black: Option<String>,
    pub result: Option<String>, // "1-0", "0-1", "1/2-1/2", "*"
    pub date: Option<String>,
    pub event: Option<String>,
    pub site: Option<String>,
}

/// A game replayed to its final recorded ply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadedGame {
    pub metadata: GameMetadata,
    /// Every tag in source order, including the ones mirrored in `metadata`.
    pub tags: Vec<(String, String)>,
    pub moves: Vec<String>, // SAN notation
    /// FEN of the position after the last move.
    pub fen: String,
}

impl LoadedGame {
    /// Look up a tag by name (case-sensitive, as PGN tag names are).
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn ply_count(&self) -> usize {
        self.moves.len()
    }
}
