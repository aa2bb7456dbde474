//! Unified server error type.
//!
//! Handlers return `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`]. A missing resource becomes a 404 page;
//! every internal failure is logged with full detail but answered with a
//! generic 500 page so that SQL or hashing details never reach the client.
//!
//! Validation and sign-in failures are not errors at this level: handlers
//! turn them into a re-rendered form.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use taskmanager_core::CoreError;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ServerError {
    /// The caller referenced a resource that does not exist (or is not theirs).
    #[error("not found: {0}")]
    NotFound(String),

    /// Propagated from the SQLite store.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Core(CoreError),

    #[error("template error: {0}")]
    Render(#[from] minijinja::Error),
}

impl From<CoreError> for ServerError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::NotFound(what) => ServerError::NotFound(what),
            CoreError::Database(e) => ServerError::Database(e),
            other => ServerError::Core(other),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match &self {
            ServerError::NotFound(what) => {
                tracing::info!(resource = %what, "not found");
                (StatusCode::NOT_FOUND, Html(NOT_FOUND_PAGE)).into_response()
            }
            ServerError::Database(e) => {
                error!(error = %e, "database error");
                internal()
            }
            ServerError::Core(e) => {
                error!(error = %e, "core error");
                internal()
            }
            ServerError::Render(e) => {
                error!(error = %e, "template error");
                internal()
            }
        }
    }
}

fn internal() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Html(SERVER_ERROR_PAGE)).into_response()
}

const NOT_FOUND_PAGE: &str =
    "<!doctype html><html><head><title>Not Found</title></head><body><h1>Not Found</h1>\
     <p>The requested resource was not found on this server.</p><p><a href=\"/\">Home</a></p></body></html>";

const SERVER_ERROR_PAGE: &str =
    "<!doctype html><html><head><title>Server Error</title></head><body><h1>Server Error (500)</h1>\
     <p><a href=\"/\">Home</a></p></body></html>";
