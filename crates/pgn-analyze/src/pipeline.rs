//! classify -> fetch -> load -> analyze -> extract, one stage at a time.

use chess_core::{load_game, LoadedGame};
use game_sources::{GameFetcher, GameReference};
use tracing::{debug, info};

use crate::config::AnalyzerConfig;
use crate::error::AnalyzeError;
use crate::extract::AnalysisResult;
use crate::stockfish::{analyze_position, EngineRequest};

pub struct Analyzer {
    config: AnalyzerConfig,
    fetcher: GameFetcher,
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Result<Self, AnalyzeError> {
        let fetcher = GameFetcher::new(config.http_timeout)?;
        Ok(Self { config, fetcher })
    }

    /// Resolve the reference to PGN text and replay it to the final position.
    pub async fn load(&self, reference: &GameReference) -> Result<LoadedGame, AnalyzeError> {
        let pgn = self.fetcher.fetch(reference).await?;
        let game = load_game(&pgn)?;

        debug!(
            white = game.metadata.white.as_deref().unwrap_or("?"),
            black = game.metadata.black.as_deref().unwrap_or("?"),
            moves = ?game.moves,
            "Game loaded"
        );
        info!(fen = %game.fen, plies = game.ply_count(), "Final position");
        Ok(game)
    }

    /// Analyze the final position of the referenced game.
    pub async fn analyze(
        &self,
        reference: &GameReference,
        depth: u32,
    ) -> Result<AnalysisResult, AnalyzeError> {
        let game = self.load(reference).await?;
        let request = EngineRequest::new(game.fen, depth);
        let result = analyze_position(&self.config, &request).await?;
        info!(best_move = %result.best_move, evaluation = %result.evaluation, "Analysis complete");
        Ok(result)
    }
}
