//! JSON-lines row store.
//!
//! Each row is one line holding a JSON array of six strings. The file is only
//! ever appended to; the row count is recovered by counting lines on open.
//! A failed write is cut back out of the file, and an unterminated trailing
//! line found on open is dropped.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::record::Row;
use crate::store::{RowStore, StoreError};

struct Appender {
    file: File,
    rows: u64,
}

impl Appender {
    /// Write one encoded row. On failure the file is cut back to its previous
    /// length so a partial line never stays behind.
    async fn write_line(&mut self, line: &[u8]) -> Result<u64, StoreError> {
        let committed = self.file.metadata().await?.len();

        let written = async {
            self.file.write_all(line).await?;
            self.file.flush().await
        }
        .await;

        if let Err(error) = written {
            if let Err(rollback) = self.file.set_len(committed).await {
                tracing::error!(error = %rollback, committed, "Failed to roll back partial row");
            }
            return Err(error.into());
        }

        self.rows += 1;
        Ok(self.rows)
    }
}

/// Appends rows to a JSON-lines file.
pub struct FileStore {
    path: PathBuf,
    inner: Mutex<Appender>,
}

impl FileStore {
    /// Open (or create) the file at `path`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let (rows, committed, length) = match tokio::fs::read(&path).await {
            Ok(content) => {
                let committed = content.iter().rposition(|b| *b == b'\n').map_or(0, |i| i + 1);
                let rows = String::from_utf8_lossy(&content[..committed])
                    .lines()
                    .filter(|l| !l.trim().is_empty())
                    .count() as u64;
                (rows, committed as u64, content.len() as u64)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => (0, 0, 0),
            Err(e) => return Err(e.into()),
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        // A torn final line has no newline and was never acknowledged.
        if committed < length {
            tracing::warn!(
                path = %path.display(),
                dropped_bytes = length - committed,
                "Truncating incomplete trailing row"
            );
            file.set_len(committed).await?;
        }

        tracing::info!(path = %path.display(), rows, "Opened row store");

        Ok(Self {
            path,
            inner: Mutex::new(Appender { file, rows }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RowStore for FileStore {
    async fn append(&self, row: Row) -> Result<u64, StoreError> {
        let mut line = serde_json::to_vec(&row)?;
        line.push(b'\n');

        self.inner.lock().await.write_line(&line).await
    }

    async fn len(&self) -> Result<u64, StoreError> {
        Ok(self.inner.lock().await.rows)
    }
}
