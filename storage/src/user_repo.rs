//! User repository: every user seen in an update, keyed by platform id.
//!
//! Backs `@username` mention resolution through [`UserDirectory`]. Usernames are unique among
//! stored rows: when a username moves to another account, the old row loses it.

use async_trait::async_trait;
use modbot_core::{User, UserDirectory};
use tracing::{debug, info, instrument};

use crate::error::StorageError;
use crate::sqlite_pool::SqlitePoolManager;
use crate::user_record::UserRecord;

#[derive(Clone)]
pub struct UserRepository {
    pool_manager: SqlitePoolManager,
}

impl UserRepository {
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        let pool_manager = SqlitePoolManager::new(database_url).await?;
        let repo = Self { pool_manager };
        repo.init().await?;
        Ok(repo)
    }

    async fn init(&self) -> Result<(), StorageError> {
        info!("Creating users table if not exist");
        let pool = self.pool_manager.pool();

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY,
                is_bot INTEGER NOT NULL DEFAULT 0,
                first_name TEXT NOT NULL,
                last_name TEXT,
                username TEXT,
                language_code TEXT,
                first_seen TEXT NOT NULL,
                last_seen TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_username ON users(lower(username))")
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Inserts the user or refreshes its profile and `last_seen`; `first_seen` is kept.
    #[instrument(skip(self, user), fields(user_id = user.id))]
    pub async fn upsert(&self, user: &User) -> Result<(), StorageError> {
        let record = UserRecord::seen_now(user);
        let mut tx = self.pool_manager.pool().begin().await?;

        if let Some(username) = &record.username {
            sqlx::query("UPDATE users SET username = NULL WHERE lower(username) = lower(?) AND id != ?")
                .bind(username)
                .bind(record.id)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query(
            r#"
            INSERT INTO users (id, is_bot, first_name, last_name, username, language_code, first_seen, last_seen)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                is_bot = excluded.is_bot,
                first_name = excluded.first_name,
                last_name = excluded.last_name,
                username = excluded.username,
                language_code = excluded.language_code,
                last_seen = excluded.last_seen
            "#,
        )
        .bind(record.id)
        .bind(record.is_bot)
        .bind(&record.first_name)
        .bind(&record.last_name)
        .bind(&record.username)
        .bind(&record.language_code)
        .bind(record.first_seen)
        .bind(record.last_seen)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!(username = ?record.username, "User upserted");
        Ok(())
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, StorageError> {
        let record = sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool_manager.pool())
            .await?;
        Ok(record)
    }

    /// Case-insensitive; a leading `@` is ignored.
    pub async fn find_record_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, StorageError> {
        let wanted = username.trim_start_matches('@');
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT * FROM users WHERE lower(username) = lower(?) ORDER BY last_seen DESC LIMIT 1",
        )
        .bind(wanted)
        .fetch_optional(self.pool_manager.pool())
        .await?;
        Ok(record)
    }

    pub async fn count(&self) -> Result<i64, StorageError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool_manager.pool())
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl UserDirectory for UserRepository {
    async fn find_by_username(&self, username: &str) -> modbot_core::Result<Option<User>> {
        Ok(self
            .find_record_by_username(username)
            .await?
            .map(User::from))
    }

    async fn remember(&self, user: &User) -> modbot_core::Result<()> {
        Ok(self.upsert(user).await?)
    }
}
