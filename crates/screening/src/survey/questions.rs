use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

/// Source of raw question-set documents addressed by (language, age group).
#[async_trait]
pub trait QuestionSetProvider: Send + Sync {
    /// Returns the document, or `None` when no set exists for the pair.
    async fn fetch(
        &self,
        lang_code: &str,
        age_group: &str,
    ) -> Result<Option<String>, QuestionSetError>;
}

/// Error enumeration for question-set lookups.
#[derive(Debug, thiserror::Error)]
pub enum QuestionSetError {
    #[error("unable to read question set {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("question set {path} is not valid JSON: {source}")]
    InvalidDocument {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Serves `{root}/survey/{lang}/{age_group}.json` from disk.
#[derive(Debug, Clone)]
pub struct DirectoryQuestionSets {
    root: PathBuf,
}

impl DirectoryQuestionSets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves the document path, or `None` if either segment is not a plain name.
    pub fn document_path(&self, lang_code: &str, age_group: &str) -> Option<PathBuf> {
        if !is_plain_segment(lang_code) || !is_plain_segment(age_group) {
            return None;
        }

        Some(
            self.root
                .join("survey")
                .join(lang_code)
                .join(format!("{age_group}.json")),
        )
    }
}

fn is_plain_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
}

async fn read_document(path: &Path) -> Result<Option<String>, QuestionSetError> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(QuestionSetError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_str::<serde_json::Value>(&raw).map_err(|source| {
        QuestionSetError::InvalidDocument {
            path: path.to_path_buf(),
            source,
        }
    })?;

    Ok(Some(raw))
}

#[async_trait]
impl QuestionSetProvider for DirectoryQuestionSets {
    async fn fetch(
        &self,
        lang_code: &str,
        age_group: &str,
    ) -> Result<Option<String>, QuestionSetError> {
        let Some(path) = self.document_path(lang_code, age_group) else {
            debug!(lang_code, age_group, "rejected question set address");
            return Ok(None);
        };

        debug!(path = %path.display(), "retrieving survey questions");
        read_document(&path).await
    }
}
