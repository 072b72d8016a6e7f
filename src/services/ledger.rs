//! Bonus balance ledger
//!
//! Every mutation is a single conditional update inside the caller's unit of
//! work, so a balance can never go negative regardless of interleaving.

use tracing::debug;
use crate::database::storage::UnitOfWork;
use crate::models::user::User;
use crate::utils::errors::{BotError, Result};

/// A balance mutation that was applied
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceChange {
    /// The user after the change
    pub user: User,
    pub previous: i64,
}

impl BalanceChange {
    pub fn current(&self) -> i64 {
        self.user.bonuses
    }
}

/// Outcome of a withdrawal
#[derive(Debug, Clone, PartialEq)]
pub enum Debit {
    Applied(BalanceChange),
    /// The balance was lower than the requested amount; nothing changed
    Refused { balance: i64, user: User },
}

/// Balance operations, bound to one unit of work
pub struct BalanceLedger<'a> {
    uow: &'a mut dyn UnitOfWork,
}

impl<'a> BalanceLedger<'a> {
    pub fn new(uow: &'a mut dyn UnitOfWork) -> Self {
        Self { uow }
    }

    pub async fn increase(&mut self, user_id: i64, amount: i64) -> Result<BalanceChange> {
        ensure_positive(amount)?;

        let user = self
            .uow
            .add_bonuses(user_id, amount)
            .await?
            .ok_or(BotError::UserNotFound { user_id })?;

        let change = BalanceChange { previous: user.bonuses - amount, user };
        debug!(user_id, amount, balance = change.current(), "Bonuses added");
        Ok(change)
    }

    /// Withdraw `amount` if the balance covers it
    ///
    /// An insufficient balance is reported as [`Debit::Refused`], not as an error.
    pub async fn decrease(&mut self, user_id: i64, amount: i64) -> Result<Debit> {
        ensure_positive(amount)?;

        if let Some(user) = self.uow.withdraw_bonuses(user_id, amount).await? {
            let change = BalanceChange { previous: user.bonuses + amount, user };
            debug!(user_id, amount, balance = change.current(), "Bonuses withdrawn");
            return Ok(Debit::Applied(change));
        }

        let user = self
            .uow
            .find_user_by_id(user_id)
            .await?
            .ok_or(BotError::UserNotFound { user_id })?;

        Ok(Debit::Refused { balance: user.bonuses, user })
    }
}

fn ensure_positive(amount: i64) -> Result<()> {
    if amount <= 0 {
        return Err(BotError::InvalidAmount { amount });
    }
    Ok(())
}
