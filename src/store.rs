//! The seam between the endpoints and the service persisting the catalog document.

pub mod github;
pub mod memory;

use async_trait::async_trait;
use axum::http::StatusCode;
use derive_more::derive::{AsRef, Deref, Display, From};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use github::GitHubStore;
pub use memory::MemoryStore;

/// An opaque token identifying the currently stored content of the catalog file. Writing with a
/// stale revision is rejected by the store.
#[derive(
    Deref, AsRef, Display, From, Serialize, Deserialize, Clone, PartialEq, Eq, Hash, Debug,
)]
#[as_ref(forward)]
#[serde(transparent)]
pub struct Revision(String);

/// The identifier of the commit a write created.
#[derive(
    Deref, AsRef, Display, From, Serialize, Deserialize, Clone, PartialEq, Eq, Hash, Debug,
)]
#[as_ref(forward)]
#[serde(transparent)]
pub struct CommitId(String);

/// An error from a [`DocumentStore`] operation. Its message is reported to API callers as-is.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum StoreError {
    /// A setting the operation needs isn't configured.
    #[error("environment variable `{0}` is not set")]
    MissingConfig(&'static str),

    /// The request couldn't be sent or its response couldn't be read.
    #[error(transparent)]
    Request(#[from] reqwest::Error),

    /// The store responded with a non-success status.
    #[error("GitHub API error: {message} ({status})")]
    Status {
        /// The response status.
        status: StatusCode,

        /// The store's error message, or the status's canonical reason if it gave none.
        message: String,
    },

    /// The stored content was in an encoding other than base64.
    #[error("unsupported content encoding {0:?}")]
    UnsupportedEncoding(String),

    /// The stored content wasn't valid base64.
    #[error("invalid base64 content: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The stored content or a response body wasn't valid JSON of the expected shape.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// Constructs a [`StoreError::Status`] with the status's canonical reason as its message.
    pub fn status(status: StatusCode) -> Self {
        Self::Status {
            status,
            message: status.canonical_reason().unwrap_or("Unknown Status").into(),
        }
    }

    /// Returns the upstream response status, if the error came from one.
    pub fn upstream_status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Request(error) => error.status(),
            _ => None,
        }
    }
}

/// Reads and writes the catalog document.
///
/// Implementations make a single attempt per call. Revision checks are the store's job: a write
/// against a revision that isn't current must fail.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Gets the catalog document's parsed content.
    ///
    /// # Errors
    ///
    /// Fails if the document doesn't exist, can't be fetched, or isn't valid JSON.
    async fn get_document(&self) -> Result<Value, StoreError>;

    /// Gets the revision of the stored document, or `None` if there's no document yet.
    ///
    /// # Errors
    ///
    /// Fails if the store can't say whether the document exists. This is distinct from the
    /// document not existing.
    async fn get_revision(&self) -> Result<Option<Revision>, StoreError>;

    /// Replaces the stored document with `content`, returning the resulting commit.
    ///
    /// `revision` must be the current revision, or `None` to create the document.
    ///
    /// # Errors
    ///
    /// Fails if the revision is stale or the store rejects the write.
    async fn put_document(
        &self,
        content: &[u8],
        revision: Option<&Revision>,
    ) -> Result<CommitId, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_mentions_reason() {
        let error = StoreError::status(StatusCode::NOT_FOUND);

        assert_eq!(error.upstream_status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(error.to_string(), "GitHub API error: Not Found (404 Not Found)");
    }

    #[test]
    fn missing_config_names_variable() {
        assert_eq!(
            StoreError::MissingConfig("GITHUB_OWNER").to_string(),
            "environment variable `GITHUB_OWNER` is not set",
        );
    }
}
