//! User storage seam.

use crate::error::StoreError;
use crate::role::Role;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// A stored user account.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    /// `pbkdf2_sha256$...` credential string.
    pub hashed_password: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for [`UserStore::create`].
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub full_name: Option<String>,
    pub hashed_password: String,
    pub role: Role,
}

/// Trait for user storage backends.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError>;

    async fn get_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Insert a new active user. Fails with [`StoreError::DuplicateEmail`]
    /// when the email is taken.
    async fn create(&self, user: NewUser) -> Result<UserRecord, StoreError>;

    /// All users, oldest first.
    async fn list(&self) -> Result<Vec<UserRecord>, StoreError>;

    async fn update_password_hash(&self, id: Uuid, hashed_password: String)
    -> Result<(), StoreError>;

    async fn set_active(&self, id: Uuid, is_active: bool) -> Result<(), StoreError>;
}

/// Process-local store, used by tests and single-node deployments.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<Uuid, UserRecord>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        // Email uniqueness check and insert share one write lock.
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateEmail(user.email));
        }

        let now = Utc::now();
        let record = UserRecord {
            id: Uuid::new_v4(),
            email: user.email,
            full_name: user.full_name,
            hashed_password: user.hashed_password,
            role: user.role,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn list(&self) -> Result<Vec<UserRecord>, StoreError> {
        let mut all: Vec<UserRecord> = self.users.read().await.values().cloned().collect();
        all.sort_by_key(|u| u.created_at);
        Ok(all)
    }

    async fn update_password_hash(
        &self,
        id: Uuid,
        hashed_password: String,
    ) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        user.hashed_password = hashed_password;
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn set_active(&self, id: Uuid, is_active: bool) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        user.is_active = is_active;
        user.updated_at = Utc::now();
        Ok(())
    }
}
