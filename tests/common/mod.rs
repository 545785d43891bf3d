#![allow(dead_code)]

use std::io::Write;

use tempfile::NamedTempFile;

/// A lichess export (evals and clocks off) ending in mate.
pub const LICHESS_PGN: &str = r#"[Event "Rated Blitz game"]
[Site "https://lichess.org/abcd1234"]
[Date "2024.03.15"]
[White "alice"]
[Black "bob"]
[Result "1-0"]
[WhiteElo "1500"]
[BlackElo "1480"]
[TimeControl "180+0"]
[ECO "C50"]
[Termination "Normal"]

1. e4 e5 2. Bc4 Nc6 3. Qh5 Nf6 4. Qxf7# 1-0
"#;

pub const LICHESS_FEN: &str = "r1bqkb1r/pppp1Qpp/2n2n2/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 4";

/// A chess.com archive PGN with clock comments, game still in progress.
pub const CHESS_COM_PGN: &str = r#"[Event "Live Chess"]
[Site "Chess.com"]
[Date "2024.03.15"]
[Round "-"]
[White "MagnusFan"]
[Black "Alice"]
[Result "*"]
[TimeControl "180"]
[Link "https://www.chess.com/game/live/123456789"]

1. e4 {[%clk 0:02:59.9]} 1... e5 {[%clk 0:02:58.7]} 2. Nf3 {[%clk 0:02:57.1]} 2... Nc6 {[%clk 0:02:55.0]} 3. Bb5 {[%clk 0:02:55.9]} 3... a6 {[%clk 0:02:50.2]} *
"#;

pub const CHESS_COM_FEN: &str =
    "r1bqkbnr/1ppp1ppp/p1n5/1B2p3/4P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 0 4";

/// Write `contents` to a temp file whose name ends in `suffix`.
pub fn temp_file(contents: &str, suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file.flush().expect("flush temp file");
    file
}
