//! Test data helpers for creating senders, events and users

use chrono::Utc;
use carry_bot::config::LinksConfig;
use carry_bot::models::message::{InboundEvent, Payload, Sender};
use carry_bot::models::user::User;

pub const ADMIN_ID: i64 = 1001;
pub const SECOND_ADMIN_ID: i64 = 1002;
pub const USER_ID: i64 = 447647899;
pub const USER_USERNAME: &str = "anna_k";
pub const BOT_USERNAME: &str = "carry_test_bot";

pub fn create_sender(id: i64, username: Option<&str>, first_name: &str) -> Sender {
    Sender {
        id,
        chat_id: id,
        first_name: first_name.to_string(),
        last_name: None,
        username: username.map(str::to_string),
    }
}

pub fn admin() -> Sender {
    create_sender(ADMIN_ID, Some("kerry_queen"), "Kerry")
}

pub fn second_admin() -> Sender {
    create_sender(SECOND_ADMIN_ID, Some("kerry_helper"), "Olha")
}

pub fn customer() -> Sender {
    create_sender(USER_ID, Some(USER_USERNAME), "Anna")
}

pub fn command(sender: &Sender, name: &str, argument: Option<&str>) -> InboundEvent {
    InboundEvent {
        sender: sender.clone(),
        payload: Payload::command(name, argument),
    }
}

pub fn text(sender: &Sender, value: &str) -> InboundEvent {
    InboundEvent {
        sender: sender.clone(),
        payload: Payload::text(value),
    }
}

pub fn create_test_user(id: i64, username: Option<&str>, first_name: &str, bonuses: i64) -> User {
    let now = Utc::now();
    User {
        id,
        chat_id: id,
        first_name: first_name.to_string(),
        last_name: None,
        username: username.map(str::to_string),
        bonuses,
        created_at: now,
        updated_at: now,
    }
}

pub fn test_links() -> LinksConfig {
    LinksConfig {
        instagram: "https://instagram.com/carry_test".to_string(),
        booking: "https://booking.example/carry_test".to_string(),
    }
}
