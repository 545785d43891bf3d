pub mod config;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod stockfish;

pub use config::AnalyzerConfig;
pub use error::AnalyzeError;
pub use extract::{extract_result, AnalysisResult};
pub use pipeline::Analyzer;
pub use stockfish::{EngineProcess, EngineRequest, DEFAULT_DEPTH};
