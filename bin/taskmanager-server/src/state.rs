//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use taskmanager_core::entities::SqliteStore;
use taskmanager_core::notifier::NotifierHandle;

use crate::config::Config;
use crate::views::Views;

/// State shared across all HTTP handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Accounts, tasks and sessions.
    pub store: Arc<SqliteStore>,
    /// Welcome-message queue.
    pub notifier: NotifierHandle,
    /// Compiled page templates.
    pub views: Arc<Views>,
}
