use std::path::Path;

use tracing::debug;

use crate::error::SourceError;

/// Read a PGN file from disk in full.
pub async fn read_pgn_file(path: &Path) -> Result<String, SourceError> {
    debug!(path = %path.display(), "Reading PGN file");
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| SourceError::GameNotFound(format!("could not read {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_reads_whole_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[Event \"Test\"]\n\n1. e4 *\n").unwrap();

        let text = read_pgn_file(file.path()).await.unwrap();
        assert!(text.starts_with("[Event \"Test\"]"));
        assert!(text.contains("1. e4 *"));
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let err = read_pgn_file(Path::new("/definitely/not/here.pgn"))
            .await
            .unwrap_err();
        match err {
            SourceError::GameNotFound(msg) => assert!(msg.contains("/definitely/not/here.pgn")),
            other => panic!("expected GameNotFound, got {other:?}"),
        }
    }
}
