use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::warn;

use super::{ResultSink, ResultSinkError};
use crate::survey::domain::EvaluationRecord;

/// Writes each record as a JSON document beneath a root directory, using the
/// record's storage key as the relative path. Documents appear atomically.
#[derive(Debug, Clone)]
pub struct DirectoryResultSink {
    root: PathBuf,
}

impl DirectoryResultSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}

#[async_trait]
impl ResultSink for DirectoryResultSink {
    async fn store(&self, record: &EvaluationRecord) -> Result<String, ResultSinkError> {
        let key = record.storage_key();
        let path = self.root.join(&key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let body = serde_json::to_vec_pretty(record)?;
        let staging = StagingFile::new(path.with_extension("json.partial"));
        tokio::fs::write(staging.path(), body).await?;
        tokio::fs::rename(staging.path(), &path).await?;
        staging.commit();
        Ok(key)
    }
}

/// Removes the staging document unless it was renamed into place. Runs on error
/// returns and when the write future is dropped by a timeout.
struct StagingFile {
    path: PathBuf,
    committed: bool,
}

impl StagingFile {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            committed: false,
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for StagingFile {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => warn!(path = %self.path.display(), "removed partial evaluation record"),
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => warn!(
                path = %self.path.display(),
                error = %err,
                "unable to remove partial evaluation record"
            ),
        }
    }
}
