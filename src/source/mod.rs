use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

use crate::comment::RawComment;
use crate::github::GithubError;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("GitHub fetch failed: {0}")]
    Github(#[from] GithubError),

    #[error("Failed to read comments file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to decode comments JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Where raw review comments come from.
/// Implementations must be Send + Sync so the driver can hold them as trait objects.
#[async_trait]
pub trait CommentSource: Send + Sync {
    /// Short label for logs and report titles (e.g. a PR URL or file path)
    fn describe(&self) -> String;

    async fn fetch(&self) -> Result<Vec<RawComment>, SourceError>;
}

/// Comments stored as a JSON array of [`RawComment`], either in a file or inline.
pub enum JsonSource {
    File(PathBuf),
    Inline {
        label: String,
        json: &'static str,
    },
}

#[async_trait]
impl CommentSource for JsonSource {
    fn describe(&self) -> String {
        match self {
            JsonSource::File(path) => path.display().to_string(),
            JsonSource::Inline { label, .. } => label.clone(),
        }
    }

    async fn fetch(&self) -> Result<Vec<RawComment>, SourceError> {
        let comments: Vec<RawComment> = match self {
            JsonSource::File(path) => {
                let text = tokio::fs::read_to_string(path).await?;
                serde_json::from_str(&text)?
            }
            JsonSource::Inline { json, .. } => serde_json::from_str(json)?,
        };
        debug!(source = %self.describe(), count = comments.len(), "loaded comments");
        Ok(comments)
    }
}
