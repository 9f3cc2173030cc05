//! File-backed `TranscriptStore`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::{fs::OpenOptions, io::AsyncWriteExt};

use crate::domain::{TranscriptError, TranscriptStore};

/// Appends transcript lines to a text file.
///
/// The file is opened in create+append mode on every flush, so it may be
/// rotated or removed between flushes.
#[derive(Debug, Clone)]
pub struct FileTranscriptStore {
    path: PathBuf,
}

impl FileTranscriptStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> TranscriptError {
        TranscriptError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl TranscriptStore for FileTranscriptStore {
    async fn append(&self, lines: &[String]) -> Result<(), TranscriptError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| self.io_error(e))?;

        let mut contents = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
        for line in lines {
            contents.push_str(line);
            contents.push('\n');
        }

        file.write_all(contents.as_bytes())
            .await
            .map_err(|e| self.io_error(e))?;
        file.flush().await.map_err(|e| self.io_error(e))?;

        tracing::debug!(
            "Appended {} line(s) to {}",
            lines.len(),
            self.path.display()
        );
        Ok(())
    }
}
