//! Welcome-message delivery after registration.
//!
//! Registration only ever calls [`NotifierHandle::enqueue`], which pushes
//! onto an unbounded `flume` channel and returns immediately. A detached
//! tokio worker drains the channel and hands each message to the configured
//! [`Notifier`]. Delivery failures are logged and dropped; nothing is
//! reported back to the user.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;
use tracing::{error, info, Instrument};

pub const WELCOME_SUBJECT: &str = "Welcome to TaskManager";

pub fn welcome_body(display_name: &str) -> String {
    format!("Hello {display_name}! Thank you for registering at TaskManager.")
}

#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("delivery rejected: {0}")]
    Rejected(String),
}

/// Sends one welcome message.
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    async fn notify(&self, address: &str, display_name: &str) -> Result<(), NotifierError>;
}

/// Writes the message to the log instead of sending it. Used when no
/// delivery endpoint is configured.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, address: &str, display_name: &str) -> Result<(), NotifierError> {
        info!(to = %address, subject = WELCOME_SUBJECT, body = %welcome_body(display_name), "welcome message");
        Ok(())
    }
}

/// POSTs `{to, subject, body}` as JSON to a mail relay endpoint.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Result<Self, NotifierError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client, url: url.into() })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, address: &str, display_name: &str) -> Result<(), NotifierError> {
        let resp = self
            .client
            .post(&self.url)
            .json(&json!({
                "to": address,
                "subject": WELCOME_SUBJECT,
                "body": welcome_body(display_name),
            }))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(NotifierError::Rejected(format!("relay answered {}", resp.status())));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct WelcomeMessage {
    address: String,
    display_name: String,
}

/// Cheap, cloneable sender side of the notification queue.
#[derive(Debug, Clone)]
pub struct NotifierHandle {
    tx: flume::Sender<WelcomeMessage>,
}

impl NotifierHandle {
    /// Start the delivery worker on the current tokio runtime.
    ///
    /// The worker stops once every handle has been dropped and the queue is
    /// drained; the returned join handle resolves at that point.
    pub fn spawn(notifier: Arc<dyn Notifier>) -> (Self, tokio::task::JoinHandle<()>) {
        let (tx, rx) = flume::unbounded();
        let worker = tokio::spawn(run_worker(rx, notifier).in_current_span());
        (Self { tx }, worker)
    }

    /// Queue a welcome message. Never blocks and never fails the caller.
    pub fn enqueue(&self, address: &str, display_name: &str) {
        let msg = WelcomeMessage {
            address: address.to_owned(),
            display_name: display_name.to_owned(),
        };
        if let Err(e) = self.tx.send(msg) {
            error!(to = %e.into_inner().address, "notifier queue is closed; welcome message was not sent");
        }
    }
}

async fn run_worker(rx: flume::Receiver<WelcomeMessage>, notifier: Arc<dyn Notifier>) {
    while let Ok(msg) = rx.recv_async().await {
        if let Err(e) = notifier.notify(&msg.address, &msg.display_name).await {
            error!(to = %msg.address, error = %e, "welcome message was not sent");
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
