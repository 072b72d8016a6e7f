//! In-memory storage backend
//!
//! Used by tests and for running the bot without a database. A unit of work
//! takes the table lock on first access and keeps it until commit or rollback,
//! so units of work that touch storage are serialized. A snapshot taken with
//! the lock is restored on rollback or when the unit of work is dropped.

use std::collections::BTreeMap;
use std::sync::Arc;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use crate::database::storage::{Storage, UnitOfWork};
use crate::models::user::{User, UpsertUserRequest};
use crate::utils::errors::{BotError, Result};

type UserTable = BTreeMap<i64, User>;

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    users: Arc<Mutex<UserTable>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed state of one user
    pub async fn user(&self, id: i64) -> Option<User> {
        self.users.lock().await.get(&id).cloned()
    }

    /// Seed or replace a user directly, bypassing units of work
    pub async fn insert_user(&self, user: User) {
        self.users.lock().await.insert(user.id, user);
    }

    pub async fn len(&self) -> usize {
        self.users.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.lock().await.is_empty()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>> {
        Ok(Box::new(MemoryUnitOfWork {
            users: Arc::clone(&self.users),
            guard: None,
            snapshot: None,
        }))
    }
}

struct MemoryUnitOfWork {
    users: Arc<Mutex<UserTable>>,
    guard: Option<OwnedMutexGuard<UserTable>>,
    snapshot: Option<UserTable>,
}

impl MemoryUnitOfWork {
    async fn table(&mut self) -> Result<&mut UserTable> {
        if self.guard.is_none() {
            let guard = Arc::clone(&self.users).lock_owned().await;
            self.snapshot = Some(guard.clone());
            self.guard = Some(guard);
        }

        self.guard
            .as_deref_mut()
            .ok_or_else(|| BotError::Storage("unit of work already finished".to_string()))
    }

    fn restore(&mut self) {
        if let (Some(guard), Some(snapshot)) = (self.guard.as_mut(), self.snapshot.take()) {
            **guard = snapshot;
        }
        self.guard = None;
    }
}

impl Drop for MemoryUnitOfWork {
    fn drop(&mut self) {
        self.restore();
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn upsert_user(&mut self, request: &UpsertUserRequest) -> Result<()> {
        let now = Utc::now();
        let table = self.table().await?;

        match table.get_mut(&request.id) {
            Some(user) => user.apply_identity(request.clone(), now),
            None => {
                table.insert(request.id, User::from_request(request.clone(), now));
            }
        }

        Ok(())
    }

    async fn find_user_by_id(&mut self, id: i64) -> Result<Option<User>> {
        Ok(self.table().await?.get(&id).cloned())
    }

    async fn find_user_by_username(&mut self, username: &str) -> Result<Option<User>> {
        Ok(self
            .table()
            .await?
            .values()
            .filter(|user| user.username.as_deref() == Some(username))
            .max_by_key(|user| user.updated_at)
            .cloned())
    }

    async fn list_users(&mut self, limit: i64, offset: i64) -> Result<Vec<User>> {
        let limit = usize::try_from(limit).map_err(|_| BotError::InvalidInput(format!("bad limit {}", limit)))?;
        let offset = usize::try_from(offset).map_err(|_| BotError::InvalidInput(format!("bad offset {}", offset)))?;

        Ok(self.table().await?.values().skip(offset).take(limit).cloned().collect())
    }

    async fn count_users(&mut self) -> Result<i64> {
        Ok(self.table().await?.len() as i64)
    }

    async fn add_bonuses(&mut self, id: i64, amount: i64) -> Result<Option<User>> {
        let now = Utc::now();
        let Some(user) = self.table().await?.get_mut(&id) else {
            return Ok(None);
        };

        user.bonuses = user
            .bonuses
            .checked_add(amount)
            .ok_or(BotError::BalanceOverflow { user_id: id })?;
        user.updated_at = now;

        Ok(Some(user.clone()))
    }

    async fn withdraw_bonuses(&mut self, id: i64, amount: i64) -> Result<Option<User>> {
        let now = Utc::now();
        let Some(user) = self.table().await?.get_mut(&id) else {
            return Ok(None);
        };

        if user.bonuses < amount {
            return Ok(None);
        }

        user.bonuses -= amount;
        user.updated_at = now;

        Ok(Some(user.clone()))
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let mut this = self;
        this.snapshot = None;
        this.guard = None;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        let mut this = self;
        this.restore();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(id: i64, username: &str) -> UpsertUserRequest {
        UpsertUserRequest {
            id,
            chat_id: id * 10,
            first_name: format!("User{}", id),
            last_name: None,
            username: Some(username.to_string()),
        }
    }

    #[tokio::test]
    async fn test_commit_makes_changes_visible() {
        let storage = MemoryStorage::new();

        let mut uow = storage.begin().await.unwrap();
        uow.upsert_user(&request(1, "alice")).await.unwrap();
        uow.commit().await.unwrap();

        let user = storage.user(1).await.unwrap();
        assert_eq!(user.bonuses, 0);
        assert_eq!(user.username.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn test_rollback_discards_changes() {
        let storage = MemoryStorage::new();

        let mut uow = storage.begin().await.unwrap();
        uow.upsert_user(&request(1, "alice")).await.unwrap();
        uow.rollback().await.unwrap();

        assert!(storage.user(1).await.is_none());
    }

    #[tokio::test]
    async fn test_drop_without_commit_discards_changes() {
        let storage = MemoryStorage::new();
        {
            let mut uow = storage.begin().await.unwrap();
            uow.upsert_user(&request(2, "bob")).await.unwrap();
        }

        assert!(storage.is_empty().await);
    }

    #[tokio::test]
    async fn test_withdraw_guard() {
        let storage = MemoryStorage::new();
        let mut uow = storage.begin().await.unwrap();
        uow.upsert_user(&request(1, "alice")).await.unwrap();
        uow.add_bonuses(1, 30).await.unwrap();

        assert!(uow.withdraw_bonuses(1, 31).await.unwrap().is_none());
        assert_eq!(uow.withdraw_bonuses(1, 30).await.unwrap().unwrap().bonuses, 0);
        assert!(uow.withdraw_bonuses(99, 1).await.unwrap().is_none());
        uow.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_username_lookup_is_case_sensitive() {
        let storage = MemoryStorage::new();
        let mut uow = storage.begin().await.unwrap();
        uow.upsert_user(&request(1, "Alice")).await.unwrap();

        assert!(uow.find_user_by_username("Alice").await.unwrap().is_some());
        assert!(uow.find_user_by_username("alice").await.unwrap().is_none());
        uow.commit().await.unwrap();
    }
}
