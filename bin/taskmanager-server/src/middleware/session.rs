//! Session cookie handling.
//!
//! The browser holds an opaque 32-hex-character token in the `sessionid`
//! cookie; everything else lives in the `sessions` table. Handlers learn who
//! is calling through two extractors:
//!
//! - [`RequestContext`] never rejects and is used by pages that render for
//!   anonymous visitors too.
//! - [`Authenticated`] redirects anonymous callers to the sign-in page.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use taskmanager_core::entities::{AccountRecord, AccountStore, SessionRecord, SessionStore};

use crate::config::Config;
use crate::error::ServerError;
use crate::routes::{found, SIGN_IN_PATH};
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "sessionid";

const TOKEN_LEN: usize = 32;

/// The signed-in caller.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub session: SessionRecord,
    pub account: AccountRecord,
}

/// Caller identity for pages open to everyone.
#[derive(Debug, Clone)]
pub struct RequestContext(pub Option<CurrentUser>);

impl RequestContext {
    /// Username shown in the page header, if signed in.
    pub fn user_status(&self) -> Option<&str> {
        self.0.as_ref().map(|u| u.account.username.as_str())
    }
}

/// Caller identity for protected pages.
#[derive(Debug, Clone)]
pub struct Authenticated(pub CurrentUser);

impl Authenticated {
    pub fn user_status(&self) -> &str {
        &self.0.account.username
    }
}

impl FromRequestParts<Arc<AppState>> for RequestContext {
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let Some(token) = session_token(parts) else {
            return Ok(Self(None));
        };
        let Some(session) = state.store.get_session(&token).await? else {
            return Ok(Self(None));
        };
        let Some(account) = state.store.get_account(session.account_id).await? else {
            return Ok(Self(None));
        };
        Ok(Self(Some(CurrentUser { session, account })))
    }
}

impl FromRequestParts<Arc<AppState>> for Authenticated {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        match RequestContext::from_request_parts(parts, state).await {
            Ok(RequestContext(Some(user))) => Ok(Self(user)),
            Ok(RequestContext(None)) => {
                tracing::debug!(path = %parts.uri.path(), "anonymous request to protected page");
                Err(found(SIGN_IN_PATH))
            }
            Err(e) => Err(e.into_response()),
        }
    }
}

/// Extract a well-formed session token from the `Cookie` headers.
fn session_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim())
        .filter(|value| is_token(value))
        .map(str::to_owned)
}

fn is_token(value: &str) -> bool {
    value.len() == TOKEN_LEN && value.bytes().all(|b| b.is_ascii_hexdigit())
}

/// `Set-Cookie` value that stores `session` in the browser.
pub fn session_cookie(session: &SessionRecord, config: &Config) -> String {
    let max_age = (session.expires_at - session.created_at).num_seconds().max(0);
    format!(
        "{SESSION_COOKIE}={}; Max-Age={max_age}; Path=/; HttpOnly; SameSite=Lax{}",
        session.id,
        secure_attr(config)
    )
}

/// `Set-Cookie` value that removes the session cookie.
pub fn clear_session_cookie(config: &Config) -> String {
    format!(
        "{SESSION_COOKIE}=; Max-Age=0; Path=/; HttpOnly; SameSite=Lax{}",
        secure_attr(config)
    )
}

fn secure_attr(config: &Config) -> &'static str {
    if config.cookie_secure { "; Secure" } else { "" }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;
    use axum::http::Request;
    use chrono::{Duration, Utc};

    fn parts_with_cookies(values: &[&str]) -> Parts {
        let mut builder = Request::builder().uri("/tasks/");
        for v in values {
            builder = builder.header(COOKIE, *v);
        }
        builder.body(()).unwrap().into_parts().0
    }

    const TOKEN: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn token_is_found_among_other_cookies() {
        let parts = parts_with_cookies(&[format!("theme=dark; {SESSION_COOKIE}={TOKEN}; lang=en").as_str()]);
        assert_eq!(session_token(&parts).as_deref(), Some(TOKEN));
    }

    #[test]
    fn token_is_found_in_a_second_cookie_header() {
        let parts = parts_with_cookies(&["theme=dark", format!("{SESSION_COOKIE}={TOKEN}").as_str()]);
        assert_eq!(session_token(&parts).as_deref(), Some(TOKEN));
    }

    #[test]
    fn malformed_tokens_are_ignored() {
        for bad in ["short", "zz23456789abcdef0123456789abcdef", "", "' OR 1=1 --"] {
            let parts = parts_with_cookies(&[format!("{SESSION_COOKIE}={bad}").as_str()]);
            assert_eq!(session_token(&parts), None, "{bad}");
        }
        assert_eq!(session_token(&parts_with_cookies(&[])), None);
    }

    #[test]
    fn cookie_attributes() {
        let now = Utc::now();
        let session = SessionRecord {
            id: TOKEN.into(),
            account_id: 1,
            created_at: now,
            expires_at: now + Duration::seconds(600),
        };
        let mut config = Config::default();
        let cookie = session_cookie(&session, &config);
        assert!(cookie.starts_with(&format!("{SESSION_COOKIE}={TOKEN};")));
        assert!(cookie.contains("Max-Age=600"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(!cookie.contains("Secure"));

        config.cookie_secure = true;
        assert!(session_cookie(&session, &config).ends_with("; Secure"));
        assert!(clear_session_cookie(&config).contains("Max-Age=0"));
    }
}
