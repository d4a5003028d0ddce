//! Row model of the `users` table.

use chrono::{DateTime, Utc};
use modbot_core::User;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub is_bot: bool,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub language_code: Option<String>,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl UserRecord {
    /// Record for a user seen now.
    pub fn seen_now(user: &User) -> Self {
        let now = Utc::now();
        Self {
            id: user.id,
            is_bot: user.is_bot,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            username: user.username.clone(),
            language_code: user.language_code.clone(),
            first_seen: now,
            last_seen: now,
        }
    }
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        User {
            id: record.id,
            is_bot: record.is_bot,
            first_name: record.first_name,
            last_name: record.last_name,
            username: record.username,
            language_code: record.language_code,
        }
    }
}
