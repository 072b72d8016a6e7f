//! Authentication middleware
//!
//! Decides whether a sender belongs to the configured admin set.

use std::collections::HashSet;
use tracing::warn;
use crate::config::settings::BotConfig;

/// Admin membership check
#[derive(Debug, Clone, Default)]
pub struct AuthMiddleware {
    admin_ids: HashSet<i64>,
}

impl AuthMiddleware {
    pub fn new(admin_ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            admin_ids: admin_ids.into_iter().collect(),
        }
    }

    pub fn from_config(config: &BotConfig) -> Self {
        if config.admin_ids.is_empty() {
            warn!("No admin ids configured; admin flow is unreachable");
        }
        Self::new(config.admin_ids.iter().copied())
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admin_ids.contains(&user_id)
    }

    pub fn admin_count(&self) -> usize {
        self.admin_ids.len()
    }
}
