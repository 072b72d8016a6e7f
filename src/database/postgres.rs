//! PostgreSQL storage backend

use async_trait::async_trait;
use sqlx::{Postgres, Transaction};
use crate::database::connection::DatabasePool;
use crate::database::repositories::UserRepository;
use crate::database::storage::{Storage, UnitOfWork};
use crate::models::user::{User, UpsertUserRequest};
use crate::utils::errors::Result;

/// Storage backed by a Postgres connection pool
#[derive(Debug, Clone)]
pub struct PgStorage {
    pool: DatabasePool,
}

impl PgStorage {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }
}

#[async_trait]
impl Storage for PgStorage {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }
}

/// A unit of work wrapping one database transaction
///
/// sqlx rolls the transaction back if it is dropped uncommitted.
pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn upsert_user(&mut self, request: &UpsertUserRequest) -> Result<()> {
        UserRepository::upsert(&mut self.tx, request).await
    }

    async fn find_user_by_id(&mut self, id: i64) -> Result<Option<User>> {
        UserRepository::find_by_id(&mut self.tx, id).await
    }

    async fn find_user_by_username(&mut self, username: &str) -> Result<Option<User>> {
        UserRepository::find_by_username(&mut self.tx, username).await
    }

    async fn list_users(&mut self, limit: i64, offset: i64) -> Result<Vec<User>> {
        UserRepository::list(&mut self.tx, limit, offset).await
    }

    async fn count_users(&mut self) -> Result<i64> {
        UserRepository::count(&mut self.tx).await
    }

    async fn add_bonuses(&mut self, id: i64, amount: i64) -> Result<Option<User>> {
        UserRepository::add_bonuses(&mut self.tx, id, amount).await
    }

    async fn withdraw_bonuses(&mut self, id: i64, amount: i64) -> Result<Option<User>> {
        UserRepository::withdraw_bonuses(&mut self.tx, id, amount).await
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
