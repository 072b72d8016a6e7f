//! Storage abstraction and the per-event transactional context
//!
//! A [`Storage`] hands out [`UnitOfWork`]s. Every inbound event is processed
//! inside exactly one unit of work, which the handler receives as an explicit
//! parameter through [`with_transaction`].

use async_trait::async_trait;
use tracing::{debug, warn};
use crate::models::user::{User, UpsertUserRequest};
use crate::utils::errors::Result;

/// Source of units of work
#[async_trait]
pub trait Storage: Send + Sync {
    /// Open a new, independent unit of work
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>>;
}

/// One atomic scope of storage changes
///
/// Changes become visible to other units of work only after [`commit`].
/// Dropping a unit of work without committing discards its changes.
///
/// [`commit`]: UnitOfWork::commit
#[async_trait]
pub trait UnitOfWork: Send {
    /// Insert a user or overwrite its identity fields; the balance is never touched
    async fn upsert_user(&mut self, request: &UpsertUserRequest) -> Result<()>;

    async fn find_user_by_id(&mut self, id: i64) -> Result<Option<User>>;

    /// Exact, case-sensitive username match
    async fn find_user_by_username(&mut self, username: &str) -> Result<Option<User>>;

    async fn list_users(&mut self, limit: i64, offset: i64) -> Result<Vec<User>>;

    async fn count_users(&mut self) -> Result<i64>;

    /// Atomically add to a balance; `None` if the user does not exist
    async fn add_bonuses(&mut self, id: i64, amount: i64) -> Result<Option<User>>;

    /// Atomically subtract from a balance only if it stays non-negative
    ///
    /// Returns `None` when the user does not exist or the balance is
    /// insufficient; in both cases nothing is written.
    async fn withdraw_bonuses(&mut self, id: i64, amount: i64) -> Result<Option<User>>;

    async fn commit(self: Box<Self>) -> Result<()>;

    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// Work executed inside a unit of work
#[async_trait]
pub trait Transactional<T>: Send {
    async fn run(self, uow: &mut dyn UnitOfWork) -> Result<T>;
}

/// Run `handler` inside a fresh unit of work
///
/// Commits when the handler succeeds. When it fails, the unit of work is
/// rolled back and the handler's error is returned unchanged.
pub async fn with_transaction<T, H>(storage: &dyn Storage, handler: H) -> Result<T>
where
    H: Transactional<T>,
    T: Send,
{
    let mut uow = storage.begin().await?;

    match handler.run(uow.as_mut()).await {
        Ok(value) => {
            uow.commit().await?;
            debug!("Unit of work committed");
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = uow.rollback().await {
                warn!(error = %rollback_err, "Rollback failed");
            }
            debug!(error = %err, "Unit of work rolled back");
            Err(err)
        }
    }
}
