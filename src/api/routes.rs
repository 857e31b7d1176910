//! All routes for the HTTP API.

use axum::{routing::any, Router};
use tower_http::trace::TraceLayer;

use crate::{api, AppState};

pub mod get_icons;
pub mod update_icons;

/// Builds the API router. Each route handles its own method dispatch so it can answer preflight
/// requests and unknown methods with its own CORS headers.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/get-icons", any(get_icons::handler))
        .route("/api/update-icons", any(update_icons::handler))
        .fallback(|| async { api::Error::RouteNotFound })
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
