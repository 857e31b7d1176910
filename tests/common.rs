//! Common code for integration tests

use std::sync::Arc;

use anyhow::Error;
use axum::{
    body::{Body, Bytes},
    http::{header::CONTENT_TYPE, HeaderMap, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use icon_catalog::{config::Config, router, store::DocumentStore, AppState};
use serde_json::Value;
use tower::ServiceExt;

/// The admin password every test app is configured with
pub(crate) const PASSWORD: &str = "correct horse battery staple";

/// A response as seen by the client
#[derive(Debug)]
pub(crate) struct TestResponse {
    pub(crate) status: StatusCode,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Bytes,
}

impl TestResponse {
    /// Parses the body as JSON
    pub(crate) fn json(&self) -> Result<Value, Error> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Gets a header as a string, or an empty string if it's missing
    pub(crate) fn header(&self, name: &str) -> &str {
        self.headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
    }
}

/// Configuration for a fully configured repository
pub(crate) fn config() -> Config {
    Config {
        owner: Some("octo".into()),
        repo: Some("icons".into()),
        token: Some("ghp_test".into()),
        admin_password: Some(PASSWORD.into()),
        ..Config::default()
    }
}

/// Builds the API router around the specified store
pub(crate) fn app(store: Arc<dyn DocumentStore>) -> Router {
    app_with_config(config(), store)
}

/// Builds the API router around the specified configuration and store
pub(crate) fn app_with_config(config: Config, store: Arc<dyn DocumentStore>) -> Router {
    router(AppState {
        config: Arc::new(config),
        store,
    })
}

/// Sends a request through the router and collects the response
pub(crate) async fn send<B: Into<Body>>(
    app: Router,
    method: Method,
    uri: &str,
    body: B,
) -> Result<TestResponse, Error> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(body.into())?;

    let response = app.oneshot(request).await?;
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await?.to_bytes();

    Ok(TestResponse {
        status,
        headers,
        body,
    })
}
