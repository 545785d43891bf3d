//! Best move and evaluation extraction from raw engine output.
//!
//! The engine's text is not a structured message, so extraction anchors on
//! line prefixes and pulls values out with patterns. Everything else in the
//! output is ignored.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::AnalyzeError;

static BEST_MOVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[a-h][1-8][a-h][1-8]").unwrap());
static EVALUATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[+-]\d+\.\d+").unwrap());

const BEST_MOVE_PREFIX: &str = "bestmove";
const EVALUATION_PREFIX: &str = "Final evaluation";

/// Best move and evaluation for the analyzed position
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Best move in UCI coordinates, e.g. `e2e4`
    pub best_move: String,
    /// Signed score in pawns exactly as the engine printed it, e.g. `+0.35`
    pub evaluation: String,
}

impl AnalysisResult {
    pub fn pawns(&self) -> Option<f64> {
        self.evaluation.parse().ok()
    }
}

/// Pull the best move and final evaluation out of the full engine output.
pub fn extract_result(output: &str) -> Result<AnalysisResult, AnalyzeError> {
    let best_line = last_line_starting_with(output, BEST_MOVE_PREFIX).ok_or_else(|| {
        AnalyzeError::MalformedEngineOutput("no `bestmove` line in engine output".into())
    })?;
    let best_move = BEST_MOVE_RE
        .find(best_line)
        .map(|m| m.as_str().to_ascii_lowercase())
        .ok_or_else(|| {
            AnalyzeError::MalformedEngineOutput(format!("no move in {best_line:?}"))
        })?;

    let eval_line = last_line_starting_with(output, EVALUATION_PREFIX).ok_or_else(|| {
        AnalyzeError::MalformedEngineOutput("no `Final evaluation` line in engine output".into())
    })?;
    let evaluation = EVALUATION_RE
        .find(eval_line)
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| {
            AnalyzeError::MalformedEngineOutput(format!("no score in {eval_line:?}"))
        })?;

    Ok(AnalysisResult {
        best_move,
        evaluation,
    })
}

/// The last line whose text (ignoring leading whitespace) starts with
/// `prefix`, with the prefix removed.
fn last_line_starting_with<'a>(output: &'a str, prefix: &str) -> Option<&'a str> {
    output
        .lines()
        .filter_map(|line| line.trim_start().strip_prefix(prefix))
        .last()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_basic() {
        let output = "bestmove e2e4 ponder e7e5\nFinal evaluation: +0.35 (white side)\n";
        let result = extract_result(output).unwrap();
        assert_eq!(
            result,
            AnalysisResult {
                best_move: "e2e4".to_string(),
                evaluation: "+0.35".to_string(),
            }
        );
        assert_eq!(result.pawns(), Some(0.35));
    }

    #[test]
    fn test_extract_tolerates_diagnostics() {
        let output = "\
Stockfish 16 by the Stockfish developers (see AUTHORS file)
id name Stockfish 16
option name Threads type spin default 1 min 1 max 1024
uciok
info string NNUE evaluation using nn-5af11540bbfe.nnue enabled
info depth 1 seldepth 1 multipv 1 score cp 18 nodes 20 pv d2d4
info depth 20 seldepth 28 multipv 1 score cp -112 nodes 812345 pv g8f6 b1c3
bestmove G8F6 ponder b1c3

     Contributing terms for the classical eval:
NNUE evaluation        -1.05 (white side)
Final evaluation       -1.12 (white side) [with scaled NNUE, optimism, ...]
";
        let result = extract_result(output).unwrap();
        assert_eq!(result.best_move, "g8f6");
        assert_eq!(result.evaluation, "-1.12");
        assert_eq!(result.pawns(), Some(-1.12));
    }

    #[test]
    fn test_last_bestmove_wins() {
        let output = "bestmove d2d4\nbestmove c2c4 ponder e7e5\nFinal evaluation +0.10\n";
        assert_eq!(extract_result(output).unwrap().best_move, "c2c4");
    }

    #[test]
    fn test_promotion_keeps_coordinates() {
        let output = "bestmove a7a8q\nFinal evaluation +9.50 (white side)\n";
        assert_eq!(extract_result(output).unwrap().best_move, "a7a8");
    }

    #[test]
    fn test_missing_bestmove() {
        let output = "info depth 1 score cp 0\nFinal evaluation +0.10 (white side)\n";
        assert!(matches!(
            extract_result(output),
            Err(AnalyzeError::MalformedEngineOutput(_))
        ));
    }

    #[test]
    fn test_bestmove_without_move() {
        let output = "bestmove (none)\nFinal evaluation +0.00\n";
        assert!(matches!(
            extract_result(output),
            Err(AnalyzeError::MalformedEngineOutput(_))
        ));
    }

    #[test]
    fn test_missing_or_scoreless_evaluation() {
        assert!(matches!(
            extract_result("bestmove e2e4\n"),
            Err(AnalyzeError::MalformedEngineOutput(_))
        ));
        assert!(matches!(
            extract_result("bestmove e2e4\nFinal evaluation: none (in check)\n"),
            Err(AnalyzeError::MalformedEngineOutput(_))
        ));
    }

    #[test]
    fn test_serializes_camel_case() {
        let result = AnalysisResult {
            best_move: "e2e4".to_string(),
            evaluation: "+0.35".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&result).unwrap(),
            r#"{"bestMove":"e2e4","evaluation":"+0.35"}"#
        );
    }
}
