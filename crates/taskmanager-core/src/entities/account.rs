use crate::entities::{decode_ts, encode_ts, now, AccountRecord, SqliteStore};

use std::future::Future;

pub trait AccountStore: Send + Sync + 'static {
    /// Insert a new account. Fails with a unique violation if the username
    /// is already taken.
    fn insert_account(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> impl Future<Output = Result<AccountRecord, sqlx::Error>> + Send;
    fn get_account(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<Option<AccountRecord>, sqlx::Error>> + Send;
    fn find_account_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Option<AccountRecord>, sqlx::Error>> + Send;
    fn username_exists(&self, username: &str) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;
    fn update_password_hash(
        &self,
        id: i64,
        password_hash: &str,
    ) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;
    /// Delete the account; its tasks and sessions go with it.
    fn delete_account(&self, id: i64) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;
}

type AccountRow = (i64, String, String, String, String);

fn account_from_row((id, username, email, password_hash, created_at): AccountRow) -> AccountRecord {
    AccountRecord {
        id,
        username,
        email,
        password_hash,
        created_at: decode_ts(&created_at, "accounts.created_at"),
    }
}

impl AccountStore for SqliteStore {
    async fn insert_account(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<AccountRecord, sqlx::Error> {
        let created_at = now();
        let result = sqlx::query(
            "INSERT INTO accounts (username, email, password_hash, created_at) \
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(encode_ts(&created_at))
        .execute(self.pool())
        .await?;
        Ok(AccountRecord {
            id: result.last_insert_rowid(),
            username: username.to_owned(),
            email: email.to_owned(),
            password_hash: password_hash.to_owned(),
            created_at,
        })
    }

    async fn get_account(&self, id: i64) -> Result<Option<AccountRecord>, sqlx::Error> {
        let row: Option<AccountRow> = sqlx::query_as(
            "SELECT id, username, email, password_hash, created_at FROM accounts WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(account_from_row))
    }

    async fn find_account_by_username(&self, username: &str) -> Result<Option<AccountRecord>, sqlx::Error> {
        let row: Option<AccountRow> = sqlx::query_as(
            "SELECT id, username, email, password_hash, created_at FROM accounts WHERE username = ?1",
        )
        .bind(username)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(account_from_row))
    }

    async fn username_exists(&self, username: &str) -> Result<bool, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM accounts WHERE username = ?1")
            .bind(username)
            .fetch_one(self.pool())
            .await?;
        Ok(count > 0)
    }

    async fn update_password_hash(&self, id: i64, password_hash: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE accounts SET password_hash = ?1 WHERE id = ?2")
            .bind(password_hash)
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_account(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = ?1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
