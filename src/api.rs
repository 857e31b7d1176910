//! The HTTP API for reading and updating the icon catalog.

pub mod routes;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::store::StoreError;

/// An API error. Every error is reported to the client as a JSON [`ErrorBody`].
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The route doesn't accept the request method.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// The admin password was missing or wrong.
    #[error("Unauthorized")]
    Unauthorized,

    /// The request body was missing a required collection.
    #[error("Invalid data format")]
    InvalidDataFormat,

    /// The catalog couldn't be read from the store.
    #[error("Failed to fetch icons data")]
    FetchFailed(#[source] StoreError),

    /// The catalog couldn't be written to the store.
    #[error("Failed to update icons")]
    UpdateFailed(#[source] StoreError),

    /// No route matched the request URI.
    #[error("Not found")]
    RouteNotFound,
}

impl Error {
    /// Gets the error's HTTP response status code.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::InvalidDataFormat => StatusCode::BAD_REQUEST,
            Self::FetchFailed(_) | Self::UpdateFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::RouteNotFound => StatusCode::NOT_FOUND,
        }
    }

    /// Gets the error's JSON response body.
    pub fn body(&self) -> ErrorBody {
        let message = match self {
            Self::FetchFailed(source) | Self::UpdateFailed(source) => Some(source.to_string()),
            _ => None,
        };

        ErrorBody {
            error: self.to_string(),
            message,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

/// A JSON response body for an API error.
#[derive(Serialize, Clone, PartialEq, Eq, Debug)]
pub struct ErrorBody {
    /// A short description of the error class.
    pub error: String,

    /// What went wrong upstream, for errors caused by the store.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
