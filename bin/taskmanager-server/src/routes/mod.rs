//! Axum router construction.
//!
//! [`build`] assembles the complete application router:
//! - Page routes (home, profile), task routes and account routes
//! - Health / heartbeat route
//! - A 404 page for anything else
//! - Middleware layers (per-request trace id, frame and sniffing headers)

mod accounts;
mod health;
mod pages;
mod tasks;

use std::sync::Arc;

use axum::http::header::{LOCATION, SET_COOKIE, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{middleware, Router};
use tower::ServiceBuilder;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::error::ServerError;
use crate::middleware::trace;
use crate::state::AppState;

pub const HOME_PATH: &str = "/";
pub const TASKS_PATH: &str = "/tasks/";
pub const SIGN_IN_PATH: &str = "/sign_in/";
pub const PROFILE_PATH: &str = "/accounts/profile/";

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(pages::router())
        .merge(tasks::router())
        .merge(accounts::router())
        .merge(health::router())
        .fallback(not_found)
        // Outermost layers execute first on the way in.
        .layer(
            ServiceBuilder::new()
                .layer(SetResponseHeaderLayer::if_not_present(
                    X_FRAME_OPTIONS,
                    HeaderValue::from_static("DENY"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                )),
        )
        .layer(middleware::from_fn(trace::trace_middleware))
        .with_state(state)
}

async fn not_found() -> ServerError {
    ServerError::NotFound("route".to_owned())
}

/// `302 Found` to `location`.
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(LOCATION, location.to_owned())]).into_response()
}

/// `302 Found` that also sets (or clears) a cookie.
pub fn found_with_cookie(location: &str, cookie: String) -> Response {
    (
        StatusCode::FOUND,
        [(LOCATION, location.to_owned()), (SET_COOKIE, cookie)],
    )
        .into_response()
}
