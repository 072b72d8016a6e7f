//! Conversation context management
//!
//! Tracks where each user is in the dialog and the scratch data the current
//! admin flow carries between turns.

use std::collections::HashMap;
use std::fmt;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Duration, Utc};
use crate::utils::errors::Result;

/// Scratch key holding the user an admin is operating on
pub const TARGET_USER_KEY: &str = "target_user_id";

/// Dialog position of one user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogState {
    /// Never started, or the dialog expired
    #[default]
    Idle,
    AwaitingMenuChoice,
    AwaitingTargetNickname,
    TargetFound,
    AwaitingIncreaseAmount,
    AwaitingDecreaseAmount,
}

impl DialogState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DialogState::Idle => "idle",
            DialogState::AwaitingMenuChoice => "awaiting_menu_choice",
            DialogState::AwaitingTargetNickname => "awaiting_target_nickname",
            DialogState::TargetFound => "target_found",
            DialogState::AwaitingIncreaseAmount => "awaiting_increase_amount",
            DialogState::AwaitingDecreaseAmount => "awaiting_decrease_amount",
        }
    }

    /// States only reachable through the admin branch
    pub fn is_admin_flow(&self) -> bool {
        matches!(
            self,
            DialogState::AwaitingTargetNickname
                | DialogState::TargetFound
                | DialogState::AwaitingIncreaseAmount
                | DialogState::AwaitingDecreaseAmount
        )
    }
}

impl fmt::Display for DialogState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User conversation context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationContext {
    pub user_id: i64,
    pub state: DialogState,
    /// Flow-specific data, cleared whenever the dialog returns to the menu
    pub data: HashMap<String, serde_json::Value>,
    pub expires_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl ConversationContext {
    /// Fresh context in the initial state
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            state: DialogState::Idle,
            data: HashMap::new(),
            expires_at: None,
            updated_at: Utc::now(),
        }
    }

    pub fn transition(&mut self, state: DialogState) {
        self.state = state;
        self.updated_at = Utc::now();
    }

    /// Leave any flow: scratch data is dropped and the menu is shown next
    pub fn return_to_menu(&mut self) {
        self.data.clear();
        self.transition(DialogState::AwaitingMenuChoice);
    }

    pub fn set_data<T: Serialize>(&mut self, key: &str, value: T) -> Result<()> {
        let json_value = serde_json::to_value(value)?;
        self.data.insert(key.to_string(), json_value);
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.data.get(key).and_then(serde_json::Value::as_i64)
    }

    pub fn target_user_id(&self) -> Option<i64> {
        self.get_i64(TARGET_USER_KEY)
    }

    pub fn set_target_user_id(&mut self, user_id: i64) -> Result<()> {
        self.set_data(TARGET_USER_KEY, user_id)
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|expires_at| Utc::now() > expires_at)
    }

    /// Expire `ttl` after now
    pub fn touch_expiry(&mut self, ttl: Duration) {
        self.expires_at = Utc::now().checked_add_signed(ttl);
    }

    pub fn clear_expiry(&mut self) {
        self.expires_at = None;
    }

    /// Get context summary for debugging
    pub fn summary(&self) -> String {
        format!(
            "User: {}, State: {}, Data keys: {:?}",
            self.user_id,
            self.state,
            self.data.keys().collect::<Vec<_>>()
        )
    }
}
