//! Analyzer configuration from environment variables and the persisted
//! config file.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::AnalyzeError;

const DEFAULT_ENGINE_TIMEOUT_SECS: u64 = 120;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug)]
pub struct AnalyzerConfig {
    /// Path to the UCI engine binary
    pub stockfish_path: PathBuf,

    /// Upper bound on one engine session; `None` waits forever
    pub engine_timeout: Option<Duration>,

    /// Per-request timeout for game downloads
    pub http_timeout: Duration,
}

/// On-disk shape of the config file.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    stockfish_path: Option<PathBuf>,
    engine_timeout_secs: Option<u64>,
    http_timeout_secs: Option<u64>,
}

impl AnalyzerConfig {
    pub fn new(stockfish_path: impl Into<PathBuf>) -> Self {
        Self {
            stockfish_path: stockfish_path.into(),
            engine_timeout: Some(Duration::from_secs(DEFAULT_ENGINE_TIMEOUT_SECS)),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }

    /// Load configuration. Environment variables override the config file.
    ///
    /// `config_path` is the `--config` flag; without it the file is looked up
    /// via `PGN_ANALYZE_CONFIG` and then `~/.config/pgn-analyze/config.json`,
    /// and a missing default file is not an error.
    pub fn load(config_path: Option<&Path>) -> Result<Self, AnalyzeError> {
        let file = match config_path {
            Some(path) => read_config_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => read_config_file(&path)?,
                _ => ConfigFile::default(),
            },
        };

        let config = Self::from_sources(file, |key| env::var(key).ok())?;
        info!(stockfish_path = %config.stockfish_path.display(), "Config loaded");
        Ok(config)
    }

    fn from_sources(
        file: ConfigFile,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AnalyzeError> {
        let stockfish_path = var("STOCKFISH_PATH")
            .map(PathBuf::from)
            .or(file.stockfish_path)
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| {
                AnalyzeError::Config(
                    "stockfishPath is not set (set STOCKFISH_PATH or add it to the config file)"
                        .to_string(),
                )
            })?;

        let engine_timeout_secs = var("ENGINE_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .or(file.engine_timeout_secs)
            .unwrap_or(DEFAULT_ENGINE_TIMEOUT_SECS);

        let http_timeout_secs = var("HTTP_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .or(file.http_timeout_secs)
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);

        Ok(Self {
            stockfish_path,
            // 0 disables the engine deadline
            engine_timeout: (engine_timeout_secs > 0)
                .then(|| Duration::from_secs(engine_timeout_secs)),
            http_timeout: Duration::from_secs(http_timeout_secs),
        })
    }
}

fn default_config_path() -> Option<PathBuf> {
    if let Ok(path) = env::var("PGN_ANALYZE_CONFIG") {
        return Some(PathBuf::from(path));
    }
    let home = env::var_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("pgn-analyze")
            .join("config.json"),
    )
}

fn read_config_file(path: &Path) -> Result<ConfigFile, AnalyzeError> {
    debug!(path = %path.display(), "Reading config file");
    let text = std::fs::read_to_string(path).map_err(|e| {
        AnalyzeError::Config(format!("failed to read {}: {e}", path.display()))
    })?;
    serde_json::from_str(&text)
        .map_err(|e| AnalyzeError::Config(format!("failed to parse {}: {e}", path.display())))
}
