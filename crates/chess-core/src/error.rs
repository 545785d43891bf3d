use thiserror::Error;

/// Reasons a PGN text could not be replayed into a position.
#[derive(Error, Debug)]
pub enum PgnError {
    #[error("no PGN game found in input")]
    Empty,

    #[error("unexpected {token:?} at byte {offset}")]
    UnexpectedToken { token: String, offset: usize },

    #[error("unterminated {what} starting at byte {offset}")]
    Unterminated { what: &'static str, offset: usize },

    #[error("invalid FEN tag {fen:?}: {reason}")]
    InvalidFen { fen: String, reason: String },

    #[error("illegal move {san} at ply {ply}: {reason}")]
    IllegalMove {
        san: String,
        ply: usize,
        reason: String,
    },

    #[error("failed to read PGN: {0}")]
    Read(#[from] std::io::Error),
}
