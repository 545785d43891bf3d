//! One-shot UCI engine session over a child process (async I/O)
//!
//! The whole command script is written at once and stdin is closed, then
//! stdout is drained until the engine exits. The process is terminated on
//! every path once the exchange is over.

use std::io;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::debug;

use crate::config::AnalyzerConfig;
use crate::error::AnalyzeError;
use crate::extract::{extract_result, AnalysisResult};

pub const DEFAULT_DEPTH: u32 = 20;

/// A position to analyze and how deep to search it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineRequest {
    pub fen: String,
    pub depth: u32,
}

impl EngineRequest {
    pub fn new(fen: impl Into<String>, depth: u32) -> Self {
        Self {
            fen: fen.into(),
            depth,
        }
    }

    /// The full command script sent to the engine.
    pub fn script(&self) -> String {
        [
            "uci".to_string(),
            format!("position fen {}", self.fen),
            format!("go depth {}", self.depth),
            "eval".to_string(),
            "quit".to_string(),
        ]
        .join("\n")
            + "\n"
    }
}

/// The process side of a session. Implemented by [`StockfishProcess`] and by
/// test doubles.
#[allow(async_fn_in_trait)]
pub trait EngineProcess {
    /// Write `script` in one go, then close stdin.
    async fn send_script(&mut self, script: &str) -> io::Result<()>;

    /// Read stdout until it closes.
    async fn read_output(&mut self) -> io::Result<String>;

    /// Kill the process. Must be a no-op if it already exited.
    async fn terminate(&mut self);
}

/// A spawned engine binary with piped stdin/stdout.
pub struct StockfishProcess {
    process: Child,
    stdin: Option<ChildStdin>,
    stdout: ChildStdout,
}

impl StockfishProcess {
    pub fn spawn(path: &Path) -> Result<Self, AnalyzeError> {
        let mut process = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                AnalyzeError::EngineIo(format!("Failed to spawn {}: {e}", path.display()))
            })?;

        let stdin = process.stdin.take();
        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| AnalyzeError::EngineIo("engine stdout was not captured".into()))?;

        Ok(Self {
            process,
            stdin,
            stdout,
        })
    }
}

impl EngineProcess for StockfishProcess {
    async fn send_script(&mut self, script: &str) -> io::Result<()> {
        let mut stdin = self
            .stdin
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "engine stdin is closed"))?;

        for cmd in script.lines() {
            debug!(cmd, "SF <");
        }
        stdin.write_all(script.as_bytes()).await?;
        stdin.flush().await?;
        // Dropping stdin closes the pipe; the engine runs to `quit` and exits.
        drop(stdin);
        Ok(())
    }

    async fn read_output(&mut self) -> io::Result<String> {
        let mut output = String::new();
        self.stdout.read_to_string(&mut output).await?;
        for line in output.lines() {
            debug!(line, "SF >");
        }
        Ok(output)
    }

    async fn terminate(&mut self) {
        // Errors here mean the process is already gone.
        let _ = self.process.kill().await;
    }
}

/// Send the request's script and collect all output. `process` is terminated
/// exactly once, whatever the outcome.
pub async fn run_session<P: EngineProcess>(
    mut process: P,
    request: &EngineRequest,
    timeout: Option<Duration>,
) -> Result<String, AnalyzeError> {
    let script = request.script();

    let outcome = match timeout {
        Some(limit) => match tokio::time::timeout(limit, exchange(&mut process, &script)).await {
            Ok(result) => result,
            Err(_) => Err(AnalyzeError::Timeout(limit)),
        },
        None => exchange(&mut process, &script).await,
    };

    process.terminate().await;
    debug!(ok = outcome.is_ok(), "Engine session closed");
    outcome
}

async fn exchange<P: EngineProcess>(process: &mut P, script: &str) -> Result<String, AnalyzeError> {
    process
        .send_script(script)
        .await
        .map_err(|e| AnalyzeError::EngineIo(format!("Failed to write to engine: {e}")))?;
    process
        .read_output()
        .await
        .map_err(|e| AnalyzeError::EngineIo(format!("Failed to read from engine: {e}")))
}

/// Analyze one position with the configured engine binary.
pub async fn analyze_position(
    config: &AnalyzerConfig,
    request: &EngineRequest,
) -> Result<AnalysisResult, AnalyzeError> {
    debug!(fen = %request.fen, depth = request.depth, "Starting engine session");
    let process = StockfishProcess::spawn(&config.stockfish_path)?;
    let output = run_session(process, request, config.engine_timeout).await?;
    extract_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    const ENGINE_OUTPUT: &str = "\
id name Stockfish 16
uciok
info depth 20 seldepth 25 multipv 1 score cp 35 nodes 100000 pv e2e4 e7e5
bestmove e2e4 ponder e7e5
Final evaluation       +0.35 (white side) [with scaled NNUE, optimism, ...]
";

    enum Behavior {
        Reply(&'static str),
        FailWrite,
        Hang,
    }

    struct FakeProcess {
        behavior: Behavior,
        sent: Arc<std::sync::Mutex<String>>,
        terminations: Arc<AtomicUsize>,
    }

    impl FakeProcess {
        fn new(behavior: Behavior) -> (Self, Arc<AtomicUsize>, Arc<std::sync::Mutex<String>>) {
            let terminations = Arc::new(AtomicUsize::new(0));
            let sent = Arc::new(std::sync::Mutex::new(String::new()));
            let fake = Self {
                behavior,
                sent: sent.clone(),
                terminations: terminations.clone(),
            };
            (fake, terminations, sent)
        }
    }

    impl EngineProcess for FakeProcess {
        async fn send_script(&mut self, script: &str) -> io::Result<()> {
            if let Behavior::FailWrite = self.behavior {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
            }
            self.sent.lock().unwrap().push_str(script);
            Ok(())
        }

        async fn read_output(&mut self) -> io::Result<String> {
            match self.behavior {
                Behavior::Reply(text) => Ok(text.to_string()),
                Behavior::Hang => std::future::pending::<io::Result<String>>().await,
                Behavior::FailWrite => unreachable!(),
            }
        }

        async fn terminate(&mut self) {
            self.terminations.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_script() {
        let request = EngineRequest::new(START_FEN, 20);
        assert_eq!(
            request.script(),
            format!("uci\nposition fen {START_FEN}\ngo depth 20\neval\nquit\n")
        );
    }

    #[tokio::test]
    async fn test_session_returns_output_and_terminates_once() {
        let (fake, terminations, sent) = FakeProcess::new(Behavior::Reply(ENGINE_OUTPUT));
        let request = EngineRequest::new(START_FEN, 12);

        let output = run_session(fake, &request, None).await.unwrap();
        assert_eq!(output, ENGINE_OUTPUT);
        assert_eq!(terminations.load(Ordering::SeqCst), 1);
        assert!(sent.lock().unwrap().contains("go depth 12\n"));

        let result = extract_result(&output).unwrap();
        assert_eq!(result.best_move, "e2e4");
        assert_eq!(result.evaluation, "+0.35");
    }

    #[tokio::test]
    async fn test_terminates_once_when_output_is_unusable() {
        let (fake, terminations, _) = FakeProcess::new(Behavior::Reply("uciok\n"));
        let output = run_session(fake, &EngineRequest::new(START_FEN, 20), None)
            .await
            .unwrap();
        assert!(matches!(
            extract_result(&output),
            Err(AnalyzeError::MalformedEngineOutput(_))
        ));
        assert_eq!(terminations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_write_failure_is_engine_io() {
        let (fake, terminations, _) = FakeProcess::new(Behavior::FailWrite);
        let err = run_session(fake, &EngineRequest::new(START_FEN, 20), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AnalyzeError::EngineIo(_)));
        assert_eq!(terminations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_hung_engine_times_out_and_is_terminated() {
        let (fake, terminations, _) = FakeProcess::new(Behavior::Hang);
        let limit = Duration::from_millis(50);
        let err = run_session(fake, &EngineRequest::new(START_FEN, 20), Some(limit))
            .await
            .unwrap_err();
        assert!(matches!(err, AnalyzeError::Timeout(d) if d == limit));
        assert_eq!(terminations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_binary_is_engine_io() {
        let config = AnalyzerConfig::new("/definitely/not/a/stockfish");
        let err = analyze_position(&config, &EngineRequest::new(START_FEN, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, AnalyzeError::EngineIo(_)));
    }

    // `cat` echoes the script back: a real spawn, write, half-close and drain,
    // but no engine answers in the output.
    #[cfg(unix)]
    #[tokio::test]
    async fn test_real_process_round_trip() {
        let process = StockfishProcess::spawn(Path::new("cat")).unwrap();
        let request = EngineRequest::new(START_FEN, 3);
        let output = run_session(process, &request, Some(Duration::from_secs(10)))
            .await
            .unwrap();
        assert_eq!(output, request.script());
        assert!(matches!(
            extract_result(&output),
            Err(AnalyzeError::MalformedEngineOutput(_))
        ));
    }
}
