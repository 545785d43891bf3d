//! PGN loading: replays a game with `shakmaty` and reports the final position.

pub mod error;
pub mod game_data;
pub mod pgn;

pub use error::PgnError;
pub use game_data::{GameMetadata, LoadedGame};
pub use pgn::load_game;
