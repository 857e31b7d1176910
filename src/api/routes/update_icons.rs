//! Replaces the icon catalog by committing a new version to the repository.

use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode},
};
use axum_macros::debug_handler;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::{
    api,
    catalog::CatalogDocument,
    config::Config,
    response::Response,
    store::{CommitId, DocumentStore, StoreError},
    AppState,
};

/// The methods this route accepts.
const ALLOWED_METHODS: &str = "POST, OPTIONS";

/// A `POST` request body for this API route.
///
/// Every field is optional so authentication can be checked before the payload is validated.
#[derive(Deserialize, Default, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    /// Every icon record.
    pub all_icons: Option<Value>,

    /// The Chainguard-specific icon records.
    pub chainguard_specific: Option<Value>,

    /// The admin password.
    pub password: Option<String>,
}

/// A `POST` response body for this API route.
#[derive(Serialize, Clone, PartialEq, Eq, Debug)]
pub struct UpdateResponse {
    /// Always `true`. Failures use an error body instead.
    pub success: bool,

    /// A human-readable confirmation.
    pub message: &'static str,

    /// The commit that stores the new catalog.
    pub commit: CommitId,
}

/// Authenticates the request and commits the submitted catalog.
#[debug_handler]
pub(crate) async fn handler(
    State(state): State<AppState>,
    method: Method,
    body: Bytes,
) -> Response {
    let mut response = Response::new();

    response.cors(ALLOWED_METHODS);

    if method == Method::OPTIONS {
        return response;
    }

    if method != Method::POST {
        return response.error(&api::Error::MethodNotAllowed, ALLOWED_METHODS);
    }

    // A body that isn't a JSON object carries no password, so it's rejected as unauthorized.
    let request = serde_json::from_slice(&body).unwrap_or_else(|error| {
        debug!(%error, "unparsable update request body");
        UpdateRequest::default()
    });

    match update(&state.config, state.store.as_ref(), request, Utc::now()).await {
        Ok(body) => response.json(StatusCode::OK, &body),
        Err(error) => response.error(&error, ALLOWED_METHODS),
    }
}

/// Replaces the stored catalog with the request's collections, stamped with `now`.
///
/// The current revision is read first and the write references it, so the store rejects the write
/// if another one landed in between. The two store calls are never concurrent.
///
/// # Errors
///
/// * [`api::Error::Unauthorized`] if the password doesn't match the configured admin password.
/// * [`api::Error::InvalidDataFormat`] if either collection is missing or `null`.
/// * [`api::Error::UpdateFailed`] if the store fails to report the revision or to write.
pub async fn update(
    config: &Config,
    store: &dyn DocumentStore,
    request: UpdateRequest,
    now: DateTime<Utc>,
) -> Result<UpdateResponse, api::Error> {
    let authorized = matches!(
        (&config.admin_password, &request.password),
        (Some(expected), Some(given)) if expected == given
    );

    if !authorized {
        warn!("rejected icon update with a wrong or missing password");
        return Err(api::Error::Unauthorized);
    }

    let (Some(all_icons), Some(chainguard_specific)) =
        (request.all_icons, request.chainguard_specific)
    else {
        return Err(api::Error::InvalidDataFormat);
    };

    let document = CatalogDocument::stamped(all_icons, chainguard_specific, now);
    let content = document
        .to_pretty_json()
        .map_err(|source| update_failed(source.into()))?;

    let revision = store.get_revision().await.map_err(update_failed)?;
    let commit = store
        .put_document(&content, revision.as_ref())
        .await
        .map_err(update_failed)?;

    info!(%commit, ?revision, "updated icons");

    Ok(UpdateResponse {
        success: true,
        message: "Icons updated successfully",
        commit,
    })
}

/// Logs a store failure and wraps it as an [`api::Error::UpdateFailed`].
fn update_failed(source: StoreError) -> api::Error {
    error!(
        error = %source,
        upstream_status = ?source.upstream_status(),
        "failed to update icons",
    );
    api::Error::UpdateFailed(source)
}
