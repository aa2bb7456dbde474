//! Sign up, sign in, logout, password change and account deletion.
//!
//! The core account operations do the work; these handlers map their
//! outcome onto redirects, cookies and re-rendered forms.

use std::sync::Arc;

use axum::extract::State;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Form, Router};
use minijinja::context;
use taskmanager_core::accounts::{self, SignedIn};
use taskmanager_core::entities::SessionStore;
use taskmanager_core::forms::{PasswordChangeForm, SignInForm, SignUpForm};
use taskmanager_core::{CoreError, FormErrors};
use tracing::info;

use crate::error::ServerError;
use crate::middleware::session::{clear_session_cookie, session_cookie, Authenticated, RequestContext};
use crate::routes::{found, found_with_cookie, HOME_PATH, PROFILE_PATH};
use crate::state::AppState;

const REGISTRATION_FAILED: &str = "Error: Registration error. Try again";
const PASSWORD_NOT_UPDATED: &str = "Password has not been updated";
const BAD_CREDENTIALS: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sign_up/", get(sign_up_form).post(sign_up))
        .route("/sign_in/", get(sign_in_form).post(sign_in))
        .route("/logout", get(logout))
        .route("/password_change", get(password_change_form).post(password_change))
        .route("/delete_user", get(delete_user))
}

async fn sign_up_form(State(state): State<Arc<AppState>>, ctx: RequestContext) -> Result<Html<String>, ServerError> {
    render_sign_up(&state, &ctx, &SignUpForm::default(), &FormErrors::new(), None)
}

async fn sign_up(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Form(form): Form<SignUpForm>,
) -> Result<Response, ServerError> {
    let ttl = state.config.session_ttl();
    match accounts::register(state.store.as_ref(), &state.notifier, &form, ttl).await {
        Ok(signed_in) => Ok(switch_session(&state, &ctx, signed_in).await?),
        Err(CoreError::Validation(errors)) => {
            info!(username = %form.username.trim(), "registration rejected");
            render_sign_up(&state, &ctx, &form, &errors, Some(REGISTRATION_FAILED)).map(IntoResponse::into_response)
        }
        Err(e) => Err(e.into()),
    }
}

async fn sign_in_form(State(state): State<Arc<AppState>>, ctx: RequestContext) -> Result<Response, ServerError> {
    if ctx.0.is_some() {
        return Ok(found(PROFILE_PATH));
    }
    render_sign_in(&state, &ctx, &SignInForm::default(), &FormErrors::new()).map(IntoResponse::into_response)
}

async fn sign_in(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Form(form): Form<SignInForm>,
) -> Result<Response, ServerError> {
    let ttl = state.config.session_ttl();
    match accounts::authenticate(state.store.as_ref(), &form, ttl).await {
        Ok(signed_in) => Ok(switch_session(&state, &ctx, signed_in).await?),
        Err(CoreError::Validation(errors)) => {
            render_sign_in(&state, &ctx, &form, &errors).map(IntoResponse::into_response)
        }
        Err(CoreError::Auth) => {
            let mut errors = FormErrors::new();
            errors.add_non_field(BAD_CREDENTIALS);
            render_sign_in(&state, &ctx, &form, &errors).map(IntoResponse::into_response)
        }
        Err(e) => Err(e.into()),
    }
}

/// Replace whatever session the browser had with the new one and go to the
/// profile page.
async fn switch_session(state: &AppState, ctx: &RequestContext, signed_in: SignedIn) -> Result<Response, ServerError> {
    if let Some(previous) = &ctx.0 {
        state.store.delete_session(&previous.session.id).await?;
    }
    let cookie = session_cookie(&signed_in.session, &state.config);
    Ok(found_with_cookie(PROFILE_PATH, cookie))
}

async fn logout(State(state): State<Arc<AppState>>, user: Authenticated) -> Result<Response, ServerError> {
    accounts::logout(state.store.as_ref(), &user.0.session).await?;
    Ok(found_with_cookie(HOME_PATH, clear_session_cookie(&state.config)))
}

async fn password_change_form(
    State(state): State<Arc<AppState>>,
    user: Authenticated,
) -> Result<Html<String>, ServerError> {
    render_password_change(&state, &user, &FormErrors::new(), None)
}

async fn password_change(
    State(state): State<Arc<AppState>>,
    user: Authenticated,
    Form(form): Form<PasswordChangeForm>,
) -> Result<Response, ServerError> {
    match accounts::change_password(state.store.as_ref(), &user.0.session, &form).await {
        Ok(()) => Ok(found(PROFILE_PATH)),
        Err(CoreError::Validation(errors)) => {
            info!(account_id = user.0.account.id, "password not changed: invalid form");
            render_password_change(&state, &user, &errors, Some(PASSWORD_NOT_UPDATED))
                .map(IntoResponse::into_response)
        }
        Err(e) => Err(e.into()),
    }
}

/// Deleting the account also removes its tasks and every session.
async fn delete_user(State(state): State<Arc<AppState>>, user: Authenticated) -> Result<Response, ServerError> {
    if accounts::delete_account(state.store.as_ref(), &user.0.session).await? {
        Ok(found_with_cookie(HOME_PATH, clear_session_cookie(&state.config)))
    } else {
        Ok(found(PROFILE_PATH))
    }
}

fn render_sign_up(
    state: &AppState,
    ctx: &RequestContext,
    form: &SignUpForm,
    errors: &FormErrors,
    message: Option<&str>,
) -> Result<Html<String>, ServerError> {
    state.views.render(
        "sign_up.html",
        context! { user_status => ctx.user_status(), form => form, errors => errors, message => message },
    )
}

fn render_sign_in(
    state: &AppState,
    ctx: &RequestContext,
    form: &SignInForm,
    errors: &FormErrors,
) -> Result<Html<String>, ServerError> {
    state.views.render(
        "sign_in.html",
        context! { user_status => ctx.user_status(), form => form, errors => errors },
    )
}

fn render_password_change(
    state: &AppState,
    user: &Authenticated,
    errors: &FormErrors,
    message: Option<&str>,
) -> Result<Html<String>, ServerError> {
    state.views.render(
        "password_change.html",
        context! { user_status => user.user_status(), errors => errors, message => message },
    )
}
