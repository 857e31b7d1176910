//! The icon catalog as currently stored in the repository.

use axum::{
    extract::State,
    http::{Method, StatusCode},
};
use axum_macros::debug_handler;
use serde_json::Value;
use tracing::error;

use crate::{api, response::Response, store::DocumentStore, AppState};

/// The methods this route accepts.
const ALLOWED_METHODS: &str = "GET, OPTIONS";

/// Returns the stored catalog document unchanged.
#[debug_handler]
pub(crate) async fn handler(State(state): State<AppState>, method: Method) -> Response {
    let mut response = Response::new();

    response.cors(ALLOWED_METHODS);

    if method == Method::OPTIONS {
        return response;
    }

    if method != Method::GET {
        return response.error(&api::Error::MethodNotAllowed, ALLOWED_METHODS);
    }

    match fetch(state.store.as_ref()).await {
        Ok(document) => response.json(StatusCode::OK, &document),
        Err(error) => response.error(&error, ALLOWED_METHODS),
    }
}

/// Reads the catalog document from the store in a single attempt.
///
/// # Errors
///
/// Returns [`api::Error::FetchFailed`] if the store fails for any reason, including the document
/// not existing.
pub async fn fetch(store: &dyn DocumentStore) -> Result<Value, api::Error> {
    store.get_document().await.map_err(|source| {
        error!(
            error = %source,
            upstream_status = ?source.upstream_status(),
            "failed to fetch icons",
        );
        api::Error::FetchFailed(source)
    })
}
