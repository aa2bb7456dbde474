use crate::entities::{decode_ts, encode_ts, now, SessionRecord, SqliteStore};

use std::future::Future;

use chrono::Duration;
use uuid::Uuid;

pub trait SessionStore: Send + Sync + 'static {
    /// Open a session for `account_id` that expires after `ttl`, capped at
    /// [`max_session_ttl`].
    fn create_session(
        &self,
        account_id: i64,
        ttl: Duration,
    ) -> impl Future<Output = Result<SessionRecord, sqlx::Error>> + Send;
    /// Look up a live session. Expired rows are deleted and reported as absent.
    fn get_session(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<SessionRecord>, sqlx::Error>> + Send;
    fn delete_session(&self, id: &str) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;
    /// Drop every session of `account_id` except `keep_id`.
    fn delete_other_sessions(
        &self,
        account_id: i64,
        keep_id: &str,
    ) -> impl Future<Output = Result<u64, sqlx::Error>> + Send;
    /// Replace the pending flash message of a session.
    fn set_flash(&self, id: &str, message: &str) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
    /// Return and clear the pending flash message.
    fn take_flash(&self, id: &str) -> impl Future<Output = Result<Option<String>, sqlx::Error>> + Send;
    fn purge_expired_sessions(&self) -> impl Future<Output = Result<u64, sqlx::Error>> + Send;
}

/// Upper bound applied to every requested session lifetime.
pub fn max_session_ttl() -> Duration {
    Duration::days(3650)
}

/// 128-bit random token, hex encoded.
fn new_session_id() -> String {
    Uuid::new_v4().simple().to_string()
}

impl SessionStore for SqliteStore {
    async fn create_session(&self, account_id: i64, ttl: Duration) -> Result<SessionRecord, sqlx::Error> {
        let created_at = now();
        let record = SessionRecord {
            id: new_session_id(),
            account_id,
            created_at,
            expires_at: created_at + ttl.min(max_session_ttl()),
        };
        sqlx::query(
            "INSERT INTO sessions (id, account_id, flash, created_at, expires_at) \
             VALUES (?1, ?2, NULL, ?3, ?4)",
        )
        .bind(&record.id)
        .bind(record.account_id)
        .bind(encode_ts(&record.created_at))
        .bind(encode_ts(&record.expires_at))
        .execute(self.pool())
        .await?;
        Ok(record)
    }

    async fn get_session(&self, id: &str) -> Result<Option<SessionRecord>, sqlx::Error> {
        let row: Option<(String, i64, String, String)> = sqlx::query_as(
            "SELECT id, account_id, created_at, expires_at FROM sessions WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        let Some((id, account_id, created_at, expires_at)) = row else {
            return Ok(None);
        };
        let record = SessionRecord {
            id,
            account_id,
            created_at: decode_ts(&created_at, "sessions.created_at"),
            expires_at: decode_ts(&expires_at, "sessions.expires_at"),
        };
        if record.is_expired(now()) {
            tracing::debug!(account_id, "dropping expired session");
            self.delete_session(&record.id).await?;
            return Ok(None);
        }
        Ok(Some(record))
    }

    async fn delete_session(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = ?1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_other_sessions(&self, account_id: i64, keep_id: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE account_id = ?1 AND id <> ?2")
            .bind(account_id)
            .bind(keep_id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected())
    }

    async fn set_flash(&self, id: &str, message: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE sessions SET flash = ?1 WHERE id = ?2")
            .bind(message)
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    async fn take_flash(&self, id: &str) -> Result<Option<String>, sqlx::Error> {
        let mut tx = self.pool().begin().await?;
        // Write first so the transaction holds the write lock before it
        // reads; a read lock cannot be upgraded while another writer waits.
        let pending = sqlx::query("UPDATE sessions SET flash = flash WHERE id = ?1 AND flash IS NOT NULL")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if pending.rows_affected() == 0 {
            tx.commit().await?;
            return Ok(None);
        }
        let row: Option<(Option<String>,)> =
            sqlx::query_as("SELECT flash FROM sessions WHERE id = ?1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let flash = row.and_then(|(flash,)| flash);
        if flash.is_some() {
            sqlx::query("UPDATE sessions SET flash = NULL WHERE id = ?1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(flash)
    }

    async fn purge_expired_sessions(&self) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?1")
            .bind(encode_ts(&now()))
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected())
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;
    use crate::entities::AccountStore;

    async fn store_with_account() -> (SqliteStore, i64) {
        let store = SqliteStore::connect_in_memory().await.unwrap();
        let acc = store.insert_account("tester", "a@a.qw", "h").await.unwrap();
        (store, acc.id)
    }

    #[tokio::test]
    async fn live_session_is_returned() {
        let (store, account) = store_with_account().await;
        let session = store.create_session(account, Duration::hours(1)).await.unwrap();
        assert_eq!(session.id.len(), 32);
        assert_eq!(store.get_session(&session.id).await.unwrap(), Some(session));
    }

    #[tokio::test]
    async fn huge_ttl_is_capped() {
        let (store, account) = store_with_account().await;
        let session = store.create_session(account, Duration::MAX).await.unwrap();
        assert_eq!(session.expires_at - session.created_at, max_session_ttl());
        assert_eq!(store.get_session(&session.id).await.unwrap(), Some(session));
    }

    #[tokio::test]
    async fn expired_session_is_absent_and_removed() {
        let (store, account) = store_with_account().await;
        let session = store.create_session(account, Duration::seconds(-1)).await.unwrap();
        assert_eq!(store.get_session(&session.id).await.unwrap(), None);
        assert!(!store.delete_session(&session.id).await.unwrap());
    }

    #[tokio::test]
    async fn purge_removes_only_expired_sessions() {
        let (store, account) = store_with_account().await;
        store.create_session(account, Duration::seconds(-1)).await.unwrap();
        let live = store.create_session(account, Duration::hours(1)).await.unwrap();
        assert_eq!(store.purge_expired_sessions().await.unwrap(), 1);
        assert!(store.get_session(&live.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn flash_is_read_once() {
        let (store, account) = store_with_account().await;
        let session = store.create_session(account, Duration::hours(1)).await.unwrap();
        assert_eq!(store.take_flash(&session.id).await.unwrap(), None);

        store.set_flash(&session.id, "Task has not been removed").await.unwrap();
        assert_eq!(
            store.take_flash(&session.id).await.unwrap().as_deref(),
            Some("Task has not been removed")
        );
        assert_eq!(store.take_flash(&session.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn concurrent_flash_traffic_on_a_file_database_succeeds() {
        let path = std::env::temp_dir().join(format!("taskmanager-flash-{}.db", Uuid::new_v4().simple()));
        let url = format!("sqlite://{}", path.display());
        let store = SqliteStore::connect(&url, 5).await.unwrap();
        let account = store.insert_account("tester", "a@a.qw", "h").await.unwrap().id;
        let session = store.create_session(account, Duration::hours(1)).await.unwrap();

        let mut workers = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            let id = session.id.clone();
            workers.push(tokio::spawn(async move {
                for _ in 0..10 {
                    store.set_flash(&id, &format!("message {i}")).await?;
                    store.take_flash(&id).await?;
                }
                Ok::<_, sqlx::Error>(())
            }));
        }
        for worker in workers {
            worker.await.unwrap().unwrap();
        }
        assert_eq!(store.take_flash(&session.id).await.unwrap(), None);

        store.pool().close().await;
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
        }
    }

    #[tokio::test]
    async fn delete_other_sessions_keeps_the_current_one() {
        let (store, account) = store_with_account().await;
        let current = store.create_session(account, Duration::hours(1)).await.unwrap();
        let other = store.create_session(account, Duration::hours(1)).await.unwrap();

        assert_eq!(store.delete_other_sessions(account, &current.id).await.unwrap(), 1);
        assert!(store.get_session(&current.id).await.unwrap().is_some());
        assert!(store.get_session(&other.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn deleting_the_account_ends_its_sessions() {
        let (store, account) = store_with_account().await;
        let session = store.create_session(account, Duration::hours(1)).await.unwrap();
        store.delete_account(account).await.unwrap();
        assert_eq!(store.get_session(&session.id).await.unwrap(), None);
    }
}
