//! A [`DocumentStore`] kept in memory, for tests and local development without a repository.

use async_trait::async_trait;
use axum::http::StatusCode;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::store::{CommitId, DocumentStore, Revision, StoreError};

/// The file name used in conflict messages.
const CATALOG_FILE: &str = "icons.json";

/// The stored file and its version counter.
#[derive(Default, Debug)]
struct State {
    /// The current file, if one was written.
    file: Option<StoredFile>,

    /// How many writes have succeeded.
    version: u64,
}

/// A file's content along with its revision.
#[derive(Clone, Debug)]
struct StoredFile {
    /// The raw file content.
    content: Vec<u8>,

    /// The content's revision.
    revision: Revision,
}

/// A [`DocumentStore`] holding the document in memory with the same revision rules as GitHub.
#[derive(Default, Debug)]
pub struct MemoryStore {
    /// The store's state. Every operation takes the lock for its whole duration.
    state: Mutex<State>,
}

impl MemoryStore {
    /// Constructs an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructs a store already holding `content`.
    pub fn with_content<C: Into<Vec<u8>>>(content: C) -> Self {
        let version = 1;

        Self {
            state: Mutex::new(State {
                file: Some(StoredFile {
                    content: content.into(),
                    revision: revision_for(version),
                }),
                version,
            }),
        }
    }

    /// Returns the raw content currently stored, if any.
    pub async fn content(&self) -> Option<Vec<u8>> {
        let state = self.state.lock().await;

        state.file.as_ref().map(|file| file.content.clone())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_document(&self) -> Result<Value, StoreError> {
        let state = self.state.lock().await;

        let file = state
            .file
            .as_ref()
            .ok_or_else(|| StoreError::status(StatusCode::NOT_FOUND))?;

        Ok(serde_json::from_slice(&file.content)?)
    }

    async fn get_revision(&self) -> Result<Option<Revision>, StoreError> {
        let state = self.state.lock().await;

        Ok(state.file.as_ref().map(|file| file.revision.clone()))
    }

    async fn put_document(
        &self,
        content: &[u8],
        revision: Option<&Revision>,
    ) -> Result<CommitId, StoreError> {
        let mut state = self.state.lock().await;

        match (&state.file, revision) {
            (None, None) => {}
            (Some(file), Some(revision)) if file.revision == *revision => {}
            (Some(_), None) => {
                return Err(StoreError::Status {
                    status: StatusCode::UNPROCESSABLE_ENTITY,
                    message: "\"sha\" wasn't supplied.".into(),
                });
            }
            (_, Some(revision)) => {
                return Err(StoreError::Status {
                    status: StatusCode::CONFLICT,
                    message: format!("{CATALOG_FILE} does not match {revision}"),
                });
            }
        }

        state.version += 1;
        let version = state.version;

        state.file = Some(StoredFile {
            content: content.to_vec(),
            revision: revision_for(version),
        });

        Ok(CommitId::from(format!("{version:040x}")))
    }
}

/// Returns the revision for a version number. Revisions and commit IDs never collide.
fn revision_for(version: u64) -> Revision {
    Revision::from(format!("blob-{version:x}"))
}
