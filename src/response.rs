//! See [`Response`].

use axum::{
    body::Body,
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN, ALLOW, CONTENT_TYPE,
        },
        HeaderName, HeaderValue, StatusCode,
    },
};
use serde::Serialize;
use tracing::error;

use crate::api;

/// A wrapper for [`axum::response::Response`] with a simpler API.
#[derive(Debug)]
pub(crate) struct Response {
    /// The [`axum::response::Response`] value being wrapped.
    inner: axum::response::Response,
}

impl Response {
    /// Constructs a new empty `200 OK` [`Response`].
    pub(crate) fn new() -> Self {
        Self {
            inner: axum::response::Response::new(Body::empty()),
        }
    }

    /// Sets a [`StatusCode`] on the response.
    pub(crate) fn status(&mut self, status: StatusCode) -> &mut Self {
        *self.inner.status_mut() = status;

        self
    }

    /// Sets a header on the response.
    pub(crate) fn header(&mut self, name: HeaderName, value: HeaderValue) -> &mut Self {
        self.inner.headers_mut().insert(name, value);

        self
    }

    /// Sets headers allowing any origin to call the listed methods with a `Content-Type` header.
    pub(crate) fn cors(&mut self, methods: &'static str) -> &mut Self {
        self.header(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"))
            .header(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(methods))
            .header(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("Content-Type"))
    }

    /// Sets a [`Body`] on the response.
    pub(crate) fn body<T: Into<Body>>(mut self, body: T) -> Self {
        *self.inner.body_mut() = body.into();

        self
    }

    /// Sets a [`StatusCode`] and a JSON body on the response.
    pub(crate) fn json<T: Serialize>(mut self, status: StatusCode, value: &T) -> Self {
        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => bytes,
            Err(error) => {
                error!(%error, "failed to serialize response body");
                return self.plain_error(StatusCode::INTERNAL_SERVER_ERROR);
            }
        };

        self.status(status)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        self.body(bytes)
    }

    /// Sets an [`api::Error`]'s status and JSON body on the response. A `405` also gets an `Allow`
    /// header listing `allowed_methods`.
    pub(crate) fn error(mut self, error: &api::Error, allowed_methods: &'static str) -> Self {
        if matches!(error, api::Error::MethodNotAllowed) {
            self.header(ALLOW, HeaderValue::from_static(allowed_methods));
        }

        self.json(error.status(), &error.body())
    }

    /// Sets a [`StatusCode`], and sets it along with its canonical reason text (e.g. `404 Not
    /// Found`) as a `text/plain` body on the response.
    pub(crate) fn plain_error(mut self, status: StatusCode) -> Self {
        self.status(status)
            .header(CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        self.body(status.to_string())
    }
}

impl axum::response::IntoResponse for Response {
    fn into_response(self) -> axum::response::Response {
        self.inner
    }
}
