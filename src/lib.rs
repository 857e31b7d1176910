//! A web service reading and writing an icon catalog stored as a JSON file in a GitHub
//! repository.
//!
//! The repository is the only persistence layer: reads fetch the file, and writes commit a new
//! version of it referencing the revision they replace.

pub mod api;
pub mod catalog;
pub mod config;
mod percent_encoding;
pub(crate) mod response;
pub mod store;

use std::{fmt, sync::Arc};

pub use api::routes::router;

use crate::{config::Config, store::DocumentStore};

/// The state shared by every request handler. Nothing in it changes after startup.
#[derive(Clone)]
pub struct AppState {
    /// The process-wide configuration.
    pub config: Arc<Config>,

    /// Where the catalog document is persisted.
    pub store: Arc<dyn DocumentStore>,
}

impl AppState {
    /// Constructs the state from its parts.
    pub fn new<S: DocumentStore + 'static>(config: Config, store: S) -> Self {
        Self {
            config: Arc::new(config),
            store: Arc::new(store),
        }
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
