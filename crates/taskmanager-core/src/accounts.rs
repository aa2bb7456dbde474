//! Account lifecycle: registration, sign-in, password change, deletion.
//!
//! These functions combine form cleaning with the checks that need the
//! store, and open or close sessions. They are generic over the store
//! traits so the server can hand in its concrete [`crate::entities::SqliteStore`].
//!
//! Argon2 is deliberately slow, so hashing and verification run on the
//! blocking pool instead of the async worker threads.

use chrono::Duration;
use tracing::{info, warn};

use crate::auth::{hash_password, verify_password, verify_password_dummy};
use crate::entities::{AccountRecord, AccountStore, SessionRecord, SessionStore};
use crate::error::{CoreError, FormErrors};
use crate::forms::{PasswordChangeForm, SignInForm, SignUpForm};
use crate::notifier::NotifierHandle;

const USERNAME_TAKEN: &str = "A user with that username already exists.";
const OLD_PASSWORD_WRONG: &str = "Your old password was entered incorrectly. Please enter it again.";

/// Result of a successful registration or sign-in.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub account: AccountRecord,
    pub session: SessionRecord,
}

/// Create an account, sign it in and queue the welcome message.
///
/// All field problems are reported together, including a taken username.
/// The notifier is fire-and-forget: its outcome never affects the result.
pub async fn register<S>(
    store: &S,
    notifier: &NotifierHandle,
    form: &SignUpForm,
    session_ttl: Duration,
) -> Result<SignedIn, CoreError>
where
    S: AccountStore + SessionStore,
{
    let cleaned = form.clean();
    let username = form.username.trim();
    let mut errors = cleaned.as_ref().err().cloned().unwrap_or_default();
    if !username.is_empty() && store.username_exists(username).await? {
        errors.add("username", USERNAME_TAKEN);
    }
    let new = match cleaned {
        Ok(new) if errors.is_empty() => new,
        _ => return Err(CoreError::Validation(errors)),
    };

    let password_hash = hash_blocking(new.password).await?;
    let account = match store.insert_account(&new.username, &new.email, &password_hash).await {
        Ok(account) => account,
        // Lost a race with a concurrent registration of the same name.
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            let mut errors = FormErrors::new();
            errors.add("username", USERNAME_TAKEN);
            return Err(CoreError::Validation(errors));
        }
        Err(e) => return Err(e.into()),
    };
    let session = store.create_session(account.id, session_ttl).await?;
    info!(account_id = account.id, username = %account.username, "account registered");

    notifier.enqueue(&account.email, &account.username);
    Ok(SignedIn { account, session })
}

/// Check credentials and open a session.
pub async fn authenticate<S>(store: &S, form: &SignInForm, session_ttl: Duration) -> Result<SignedIn, CoreError>
where
    S: AccountStore + SessionStore,
{
    let (username, password) = form.clean().map_err(CoreError::Validation)?;
    let Some(account) = store.find_account_by_username(&username).await? else {
        run_blocking(move || verify_password_dummy(&password)).await?;
        info!(username = %username, "sign-in failed: unknown user");
        return Err(CoreError::Auth);
    };
    let stored = account.password_hash.clone();
    if !run_blocking(move || verify_password(&password, &stored)).await? {
        info!(account_id = account.id, "sign-in failed: wrong password");
        return Err(CoreError::Auth);
    }
    let session = store.create_session(account.id, session_ttl).await?;
    info!(account_id = account.id, "signed in");
    Ok(SignedIn { account, session })
}

/// Verify the old password and store the new one. The calling session stays
/// valid; the account's other sessions are ended.
pub async fn change_password<S>(store: &S, session: &SessionRecord, form: &PasswordChangeForm) -> Result<(), CoreError>
where
    S: AccountStore + SessionStore,
{
    let account = store
        .get_account(session.account_id)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("account {}", session.account_id)))?;

    let cleaned = form.clean(&account.username);
    let mut errors = cleaned.as_ref().err().cloned().unwrap_or_default();
    if !form.old_password.is_empty() {
        let old = form.old_password.clone();
        let stored = account.password_hash.clone();
        if !run_blocking(move || verify_password(&old, &stored)).await? {
            errors.add("old_password", OLD_PASSWORD_WRONG);
        }
    }
    let new_password = match cleaned {
        Ok(p) if errors.is_empty() => p,
        _ => return Err(CoreError::Validation(errors)),
    };

    let hash = hash_blocking(new_password).await?;
    if !store.update_password_hash(account.id, &hash).await? {
        return Err(CoreError::NotFound(format!("account {}", account.id)));
    }
    let dropped = store.delete_other_sessions(account.id, &session.id).await?;
    info!(account_id = account.id, other_sessions_ended = dropped, "password changed");
    Ok(())
}

/// Delete the signed-in account. Its tasks and sessions are removed by the
/// database cascade, which also ends `session`.
pub async fn delete_account<S>(store: &S, session: &SessionRecord) -> Result<bool, CoreError>
where
    S: AccountStore,
{
    let deleted = store.delete_account(session.account_id).await?;
    if deleted {
        info!(account_id = session.account_id, "account deleted");
    } else {
        warn!(account_id = session.account_id, "account was not deleted");
    }
    Ok(deleted)
}

/// End `session`.
pub async fn logout<S>(store: &S, session: &SessionRecord) -> Result<bool, CoreError>
where
    S: SessionStore,
{
    let ended = store.delete_session(&session.id).await?;
    info!(account_id = session.account_id, "signed out");
    Ok(ended)
}

async fn hash_blocking(password: String) -> Result<String, CoreError> {
    run_blocking(move || hash_password(&password)).await?
}

async fn run_blocking<T, F>(f: F) -> Result<T, CoreError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| CoreError::PasswordHash(format!("hashing task failed: {e}")))
}

// ── Tests ──────────────────────────────────────────────────────────────────────
