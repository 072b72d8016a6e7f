//! User model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A bonus program participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub chat_id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub bonuses: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Identity fields refreshed on every `/start`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertUserRequest {
    pub id: i64,
    pub chat_id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

impl User {
    /// Build a fresh record with a zero balance
    pub fn from_request(request: UpsertUserRequest, now: DateTime<Utc>) -> Self {
        Self {
            id: request.id,
            chat_id: request.chat_id,
            first_name: request.first_name,
            last_name: request.last_name,
            username: request.username,
            bonuses: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite identity fields, leaving the balance untouched
    pub fn apply_identity(&mut self, request: UpsertUserRequest, now: DateTime<Utc>) {
        self.chat_id = request.chat_id;
        self.first_name = request.first_name;
        self.last_name = request.last_name;
        self.username = request.username;
        self.updated_at = now;
    }

    pub fn full_name(&self) -> String {
        match self.last_name.as_deref() {
            Some(last) if !last.is_empty() => format!("{} {}", self.first_name, last),
            _ => self.first_name.clone(),
        }
    }

    /// Name plus handle, as shown to admins
    pub fn short_info(&self) -> String {
        match self.username.as_deref() {
            Some(username) => format!("{} @{}", self.full_name(), username),
            None => self.full_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> UpsertUserRequest {
        UpsertUserRequest {
            id: 1,
            chat_id: 10,
            first_name: "Olena".to_string(),
            last_name: None,
            username: Some("olena".to_string()),
        }
    }

    #[test]
    fn test_display_names() {
        let mut user = User::from_request(request(), Utc::now());
        assert_eq!(user.full_name(), "Olena");
        assert_eq!(user.short_info(), "Olena @olena");

        user.last_name = Some("Kovalenko".to_string());
        user.username = None;
        assert_eq!(user.full_name(), "Olena Kovalenko");
        assert_eq!(user.short_info(), "Olena Kovalenko");
    }

    #[test]
    fn test_apply_identity_keeps_balance() {
        let mut user = User::from_request(request(), Utc::now());
        user.bonuses = 70;

        let mut update = request();
        update.chat_id = 11;
        update.username = Some("olena_k".to_string());
        user.apply_identity(update, Utc::now());

        assert_eq!(user.bonuses, 70);
        assert_eq!(user.chat_id, 11);
        assert_eq!(user.username.as_deref(), Some("olena_k"));
    }
}
