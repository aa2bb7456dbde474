//! Home and profile pages.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use minijinja::context;
use taskmanager_core::entities::{SessionStore, TaskStore};

use crate::error::ServerError;
use crate::middleware::session::{Authenticated, RequestContext};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(home))
        .route("/accounts/profile/", get(profile))
}

async fn home(State(state): State<Arc<AppState>>, ctx: RequestContext) -> Result<Html<String>, ServerError> {
    state.views.render("index.html", context! { user_status => ctx.user_status() })
}

/// Task totals per status for the signed-in account.
async fn profile(State(state): State<Arc<AppState>>, user: Authenticated) -> Result<Html<String>, ServerError> {
    let counts = state.store.count_by_status(user.0.account.id).await?;
    let message = state.store.take_flash(&user.0.session.id).await?;
    state.views.render(
        "profile.html",
        context! {
            user_status => user.user_status(),
            message => message,
            active => counts.active,
            finished => counts.finished,
            failed => counts.failed,
        },
    )
}
