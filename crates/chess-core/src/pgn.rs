//! Game loading on top of `pgn-reader`: collects tags, replays SAN moves on a
//! `shakmaty` board and reports the FEN after the final ply.

use std::mem;
use std::ops::ControlFlow;

use pgn_reader::{RawTag, Reader, SanPlus, Skip, Visitor};
use shakmaty::{fen::Fen, CastlingMode, Chess, EnPassantMode, Position};
use tracing::debug;

use crate::error::PgnError;
use crate::game_data::{GameMetadata, LoadedGame};

/// Tags collected during header parsing.
#[derive(Default)]
struct GameTags {
    tags: Vec<(String, String)>,
}

/// State during movetext parsing.
struct GameState {
    tags: Vec<(String, String)>,
    board: Chess,
    moves: Vec<String>,
}

/// Visitor that replays the mainline of a single game.
struct GameLoader;

impl Visitor for GameLoader {
    type Tags = GameTags;
    type Movetext = GameState;
    type Output = Result<LoadedGame, PgnError>;

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, GameTags> {
        ControlFlow::Continue(GameTags::default())
    }

    fn tag(
        &mut self,
        tags: &mut GameTags,
        name: &[u8],
        value: RawTag<'_>,
    ) -> ControlFlow<Self::Output> {
        tags.tags.push((
            String::from_utf8_lossy(name).into_owned(),
            value.decode_utf8_lossy().into_owned(),
        ));
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, tags: GameTags) -> ControlFlow<Self::Output, GameState> {
        match starting_position(&tags.tags) {
            Ok(board) => ControlFlow::Continue(GameState {
                tags: tags.tags,
                board,
                moves: Vec::new(),
            }),
            Err(e) => ControlFlow::Break(Err(e)),
        }
    }

    fn san(&mut self, state: &mut GameState, san_plus: SanPlus) -> ControlFlow<Self::Output> {
        let san = san_plus.to_string();
        let ply = state.moves.len() + 1;

        let mv = match san_plus.san.to_move(&state.board) {
            Ok(mv) => mv,
            Err(e) => {
                return ControlFlow::Break(Err(PgnError::IllegalMove {
                    san,
                    ply,
                    reason: e.to_string(),
                }))
            }
        };

        match mem::take(&mut state.board).play(mv) {
            Ok(board) => {
                state.board = board;
                state.moves.push(san);
                ControlFlow::Continue(())
            }
            Err(e) => ControlFlow::Break(Err(PgnError::IllegalMove {
                san,
                ply,
                reason: e.to_string(),
            })),
        }
    }

    // Only the mainline determines the final position.
    fn begin_variation(&mut self, _state: &mut GameState) -> ControlFlow<Self::Output, Skip> {
        ControlFlow::Continue(Skip(true))
    }

    fn end_game(&mut self, state: GameState) -> Self::Output {
        if state.tags.is_empty() && state.moves.is_empty() {
            return Err(PgnError::Empty);
        }

        let fen = Fen::from_position(&state.board, EnPassantMode::Legal).to_string();
        debug!(plies = state.moves.len(), %fen, "Replayed game");

        Ok(LoadedGame {
            metadata: metadata_from_tags(&state.tags),
            tags: state.tags,
            moves: state.moves,
            fen,
        })
    }
}

/// Parse PGN text and replay the first game in it to its final position.
///
/// Anything the rules library rejects (illegal or ambiguous SAN, a broken
/// `FEN` tag) fails the whole load, and so does any token that is not part
/// of PGN movetext. There is no partial result.
pub fn load_game(pgn: &str) -> Result<LoadedGame, PgnError> {
    check_tokens(pgn)?;

    let mut reader = Reader::new(pgn.as_bytes());
    match reader.read_game(&mut GameLoader)? {
        Some(result) => result,
        None => Err(PgnError::Empty),
    }
}

const RESULTS: [&str; 4] = ["1-0", "0-1", "1/2-1/2", "*"];

/// Walk the whole text and reject anything `pgn-reader` would silently skip.
///
/// Tag pairs, `{}` and `;` comments, `%` escape lines, variations, NAGs and
/// `!`/`?` annotations are passed over; every other token must be a move
/// number, a game result or SAN (optionally glued to its move number).
fn check_tokens(pgn: &str) -> Result<(), PgnError> {
    let bytes = pgn.as_bytes();
    let mut i = if pgn.starts_with('\u{feff}') { 3 } else { 0 };
    let mut line_start = true;

    while i < bytes.len() {
        let start = i;
        match bytes[i] {
            b'\n' => {
                line_start = true;
                i += 1;
                continue;
            }
            c if c.is_ascii_whitespace() => i += 1,
            b'%' if line_start => i = skip_line(bytes, i),
            b';' => i = skip_line(bytes, i),
            b'{' => {
                i = find_byte(bytes, i + 1, b'}').ok_or(PgnError::Unterminated {
                    what: "comment",
                    offset: start,
                })? + 1;
            }
            b'[' => i = skip_tag(bytes, i)?,
            b'(' | b')' => i += 1,
            b'!' | b'?' => {
                while i < bytes.len() && matches!(bytes[i], b'!' | b'?') {
                    i += 1;
                }
            }
            b'$' => {
                i += 1;
                let digits = i;
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
                if i == digits {
                    return Err(unexpected(pgn, start, i));
                }
            }
            _ => {
                while i < bytes.len() && !is_delimiter(bytes[i]) {
                    i += 1;
                }
                // A stray closing brace or bracket on its own
                if i == start {
                    i += 1;
                    return Err(unexpected(pgn, start, i));
                }
                if !is_movetext_token(&bytes[start..i]) {
                    return Err(unexpected(pgn, start, i));
                }
            }
        }
        line_start = false;
    }

    Ok(())
}

fn is_delimiter(b: u8) -> bool {
    b.is_ascii_whitespace()
        || matches!(b, b'{' | b'}' | b'(' | b')' | b'[' | b']' | b';' | b'$' | b'!' | b'?')
}

fn is_movetext_token(token: &[u8]) -> bool {
    if RESULTS.iter().any(|r| r.as_bytes() == token) || SanPlus::from_ascii(token).is_ok() {
        return true;
    }

    // Move numbers: "12", "12.", "12...", or glued to the move as in "12.Nf3"
    let digits = token.iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return false;
    }
    let rest = &token[digits..];
    let dots = rest.iter().take_while(|&&b| b == b'.').count();
    let san = &rest[dots..];
    san.is_empty() || (dots > 0 && SanPlus::from_ascii(san).is_ok())
}

fn skip_line(bytes: &[u8], from: usize) -> usize {
    find_byte(bytes, from, b'\n').unwrap_or(bytes.len())
}

fn find_byte(bytes: &[u8], from: usize, needle: u8) -> Option<usize> {
    bytes[from..]
        .iter()
        .position(|&b| b == needle)
        .map(|pos| from + pos)
}

/// Skip a `[Name "value"]` tag pair, honouring `\"` escapes in the value.
fn skip_tag(bytes: &[u8], start: usize) -> Result<usize, PgnError> {
    let mut i = start + 1;
    let mut in_quotes = false;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if in_quotes => i += 1,
            b'"' => in_quotes = !in_quotes,
            b']' if !in_quotes => return Ok(i + 1),
            _ => {}
        }
        i += 1;
    }
    Err(PgnError::Unterminated {
        what: "tag pair",
        offset: start,
    })
}

fn unexpected(pgn: &str, start: usize, end: usize) -> PgnError {
    PgnError::UnexpectedToken {
        token: String::from_utf8_lossy(&pgn.as_bytes()[start..end]).into_owned(),
        offset: start,
    }
}

/// Starting board: the `FEN` tag when present, otherwise the standard setup.
fn starting_position(tags: &[(String, String)]) -> Result<Chess, PgnError> {
    let Some(fen) = find_tag(tags, "FEN") else {
        return Ok(Chess::default());
    };

    let mode = match find_tag(tags, "Variant") {
        Some(v) if v.eq_ignore_ascii_case("chess960") => CastlingMode::Chess960,
        _ => CastlingMode::Standard,
    };

    let invalid = |reason: String| PgnError::InvalidFen {
        fen: fen.to_string(),
        reason,
    };

    let setup: Fen = fen.parse().map_err(|e| invalid(format!("{e}")))?;
    setup
        .into_position(mode)
        .map_err(|e| invalid(format!("{e}")))
}

fn find_tag<'a>(tags: &'a [(String, String)], name: &str) -> Option<&'a str> {
    tags.iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

fn metadata_from_tags(tags: &[(String, String)]) -> GameMetadata {
    let get = |name: &str| find_tag(tags, name).map(str::to_string);
    GameMetadata {
        white: get("White"),
        black: get("Black"),
        result: get("Result"),
        date: get("Date"),
        event: get("Event"),
        site: get("Site"),
    }
}
