//! User directory
//!
//! Registration and lookup of bot users. All operations run inside the
//! caller's unit of work.

use tracing::{debug, info};
use crate::database::storage::UnitOfWork;
use crate::models::user::{User, UpsertUserRequest};
use crate::utils::errors::{BotError, Result};

/// One page of the user listing
#[derive(Debug, Clone, PartialEq)]
pub struct UserPage {
    pub users: Vec<User>,
    pub total: i64,
}

/// Directory of known users, bound to one unit of work
pub struct UserDirectory<'a> {
    uow: &'a mut dyn UnitOfWork,
}

impl<'a> UserDirectory<'a> {
    pub fn new(uow: &'a mut dyn UnitOfWork) -> Self {
        Self { uow }
    }

    /// Register a user or refresh their identity fields
    ///
    /// A new user starts with a zero balance; an existing balance is kept.
    pub async fn upsert_user(&mut self, request: &UpsertUserRequest) -> Result<()> {
        debug!(user_id = request.id, username = ?request.username, "Upserting user");
        self.uow.upsert_user(request).await?;
        info!(user_id = request.id, "User registered or refreshed");
        Ok(())
    }

    pub async fn get_by_id(&mut self, user_id: i64) -> Result<User> {
        self.uow
            .find_user_by_id(user_id)
            .await?
            .ok_or(BotError::UserNotFound { user_id })
    }

    /// Exact lookup by Telegram username, without the leading `@`
    ///
    /// An unknown username is an expected outcome and yields `None`.
    pub async fn get_by_username(&mut self, username: &str) -> Result<Option<User>> {
        let user = self.uow.find_user_by_username(username).await?;
        debug!(username = username, found = user.is_some(), "Username lookup");
        Ok(user)
    }

    pub async fn get_balance(&mut self, user_id: i64) -> Result<i64> {
        Ok(self.get_by_id(user_id).await?.bonuses)
    }

    /// Users ordered by id, with the total count
    pub async fn list_users(&mut self, limit: i64, offset: i64) -> Result<UserPage> {
        if limit <= 0 || offset < 0 {
            return Err(BotError::InvalidInput(format!(
                "invalid page: limit {}, offset {}",
                limit, offset
            )));
        }

        let users = self.uow.list_users(limit, offset).await?;
        let total = self.uow.count_users().await?;
        Ok(UserPage { users, total })
    }
}
