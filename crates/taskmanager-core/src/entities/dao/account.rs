use chrono::{DateTime, Utc};

/// A row in the `accounts` table.
///
/// `password_hash` is an Argon2 PHC string; the plaintext is never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRecord {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}
