//! User directory: resolves `@username` mentions to known users.
//!
//! The core only reads through [`UserDirectory`]; durable implementations live in `storage`.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::types::User;

/// Lookup service keyed by platform user id and (case-insensitive) username.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Finds a user by username (without `@`). `Ok(None)` when unknown.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Records or refreshes a user seen in an update.
    async fn remember(&self, user: &User) -> Result<()>;
}

/// Process-local directory; forgets everything on restart.
#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<i64, User>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let wanted = username.trim_start_matches('@');
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| {
                u.username
                    .as_deref()
                    .is_some_and(|name| name.eq_ignore_ascii_case(wanted))
            })
            .cloned())
    }

    async fn remember(&self, user: &User) -> Result<()> {
        self.users.write().await.insert(user.id, user.clone());
        Ok(())
    }
}
