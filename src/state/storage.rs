//! Conversation state storage
//!
//! Contexts are kept per user, either in process memory or in Redis. Expired
//! contexts are dropped on load, so the user starts over from the initial state.

use std::collections::HashMap;
use async_trait::async_trait;
use redis::AsyncCommands;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use crate::config::StateConfig;
use crate::utils::errors::Result;
use super::context::ConversationContext;

/// Persistence for conversation contexts
#[async_trait]
pub trait StateStorage: Send + Sync {
    /// Live context of a user; `None` when absent or expired
    async fn load_context(&self, user_id: i64) -> Result<Option<ConversationContext>>;

    async fn save_context(&self, context: &ConversationContext) -> Result<()>;

    async fn delete_context(&self, user_id: i64) -> Result<()>;
}

/// Process-local state storage
#[derive(Debug, Default)]
pub struct MemoryStateStorage {
    contexts: RwLock<HashMap<i64, ConversationContext>>,
}

impl MemoryStateStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.contexts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.contexts.read().await.is_empty()
    }
}

#[async_trait]
impl StateStorage for MemoryStateStorage {
    async fn load_context(&self, user_id: i64) -> Result<Option<ConversationContext>> {
        let context = self.contexts.read().await.get(&user_id).cloned();

        match context {
            Some(context) if context.is_expired() => {
                debug!(user_id, expires_at = ?context.expires_at, "Context has expired, removing");
                self.delete_context(user_id).await?;
                Ok(None)
            }
            other => Ok(other),
        }
    }

    async fn save_context(&self, context: &ConversationContext) -> Result<()> {
        self.contexts.write().await.insert(context.user_id, context.clone());
        Ok(())
    }

    async fn delete_context(&self, user_id: i64) -> Result<()> {
        self.contexts.write().await.remove(&user_id);
        Ok(())
    }
}

/// Redis-backed state storage
///
/// Contexts are stored as JSON under `<prefix>context:<user_id>`. A context
/// with an expiry is written with a matching key TTL.
#[derive(Clone)]
pub struct RedisStateStorage {
    connection_manager: redis::aio::ConnectionManager,
    prefix: String,
}

impl RedisStateStorage {
    pub async fn new(config: &StateConfig) -> Result<Self> {
        let client = redis::Client::open(config.redis_url.as_str())?;
        let connection_manager = redis::aio::ConnectionManager::new(client).await?;
        info!(prefix = %config.prefix, "Connected to Redis state storage");

        Ok(Self {
            connection_manager,
            prefix: config.prefix.clone(),
        })
    }

    fn context_key(&self, user_id: i64) -> String {
        context_key(&self.prefix, user_id)
    }

    /// Check Redis connectivity
    pub async fn health_check(&self) -> Result<()> {
        let mut conn = self.connection_manager.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

fn context_key(prefix: &str, user_id: i64) -> String {
    format!("{}context:{}", prefix, user_id)
}

#[async_trait]
impl StateStorage for RedisStateStorage {
    async fn load_context(&self, user_id: i64) -> Result<Option<ConversationContext>> {
        let key = self.context_key(user_id);
        let mut conn = self.connection_manager.clone();

        let serialized: Option<String> = conn.get(&key).await.map_err(|e| {
            error!(user_id, error = %e, "Failed to get context from Redis");
            e
        })?;

        let Some(data) = serialized else {
            debug!(user_id, "No context found in Redis");
            return Ok(None);
        };

        let context: ConversationContext = serde_json::from_str(&data).map_err(|e| {
            error!(user_id, error = %e, "Failed to deserialize context");
            e
        })?;

        if context.is_expired() {
            warn!(user_id, expires_at = ?context.expires_at, "Context has expired, removing");
            self.delete_context(user_id).await?;
            return Ok(None);
        }

        debug!(user_id, state = %context.state, "Context loaded");
        Ok(Some(context))
    }

    async fn save_context(&self, context: &ConversationContext) -> Result<()> {
        let key = self.context_key(context.user_id);
        let serialized = serde_json::to_string(context)?;
        let mut conn = self.connection_manager.clone();

        match context.expires_at {
            Some(expires_at) => {
                let ttl_seconds = (expires_at - chrono::Utc::now()).num_seconds().max(1) as u64;
                conn.set_ex::<_, _, ()>(&key, serialized, ttl_seconds).await?;
            }
            None => {
                conn.set::<_, _, ()>(&key, serialized).await?;
            }
        }

        debug!(user_id = context.user_id, state = %context.state, "Context saved to Redis");
        Ok(())
    }

    async fn delete_context(&self, user_id: i64) -> Result<()> {
        let key = self.context_key(user_id);
        let mut conn = self.connection_manager.clone();
        let deleted: u32 = conn.del(&key).await?;
        debug!(user_id, deleted, "Context deleted from Redis");
        Ok(())
    }
}
