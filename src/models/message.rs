//! Inbound events and outbound replies
//!
//! These are the only shapes the conversation engine exchanges with the
//! messaging platform. The Telegram adapter converts to and from them.

use serde::{Deserialize, Serialize};
use crate::models::user::UpsertUserRequest;

/// Identity of whoever sent an inbound event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    pub id: i64,
    pub chat_id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

impl Sender {
    pub fn to_upsert_request(&self) -> UpsertUserRequest {
        UpsertUserRequest {
            id: self.id,
            chat_id: self.chat_id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            username: self.username.clone(),
        }
    }
}

/// What the sender asked for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Payload {
    Command { name: String, argument: Option<String> },
    Text(String),
}

impl Payload {
    /// Parse raw message text into a command or free text
    ///
    /// Commands addressed to a specific bot (`/start@carry_bot 42`) lose the
    /// bot suffix; the argument is whatever follows the first whitespace.
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        let Some(rest) = trimmed.strip_prefix('/') else {
            return Payload::Text(trimmed.to_string());
        };

        let (head, tail) = match rest.split_once(char::is_whitespace) {
            Some((head, tail)) => (head, tail.trim()),
            None => (rest, ""),
        };
        let name = head.split('@').next().unwrap_or(head).to_lowercase();

        if name.is_empty() {
            return Payload::Text(trimmed.to_string());
        }

        Payload::Command {
            name,
            argument: (!tail.is_empty()).then(|| tail.to_string()),
        }
    }

    pub fn command(name: &str, argument: Option<&str>) -> Self {
        Payload::Command {
            name: name.to_string(),
            argument: argument.map(str::to_string),
        }
    }

    pub fn text(text: &str) -> Self {
        Payload::Text(text.to_string())
    }

    /// Short description for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Command { .. } => "command",
            Payload::Text(_) => "text",
        }
    }
}

/// One message received from the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    pub sender: Sender,
    pub payload: Payload,
}

/// Text formatting hint for the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseMode {
    Html,
}

/// Keyboard attached to a reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Keyboard {
    /// Persistent reply keyboard of selectable labels
    Menu(Vec<Vec<String>>),
    /// Hide any reply keyboard
    Remove,
    /// Inline buttons opening external URLs: (label, url)
    Links(Vec<Vec<(String, String)>>),
}

/// Reply body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplyContent {
    Text(String),
    Photo { bytes: Vec<u8>, caption: String },
}

/// One message to send back through the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundReply {
    pub chat_id: i64,
    pub content: ReplyContent,
    pub keyboard: Option<Keyboard>,
    pub parse_mode: Option<ParseMode>,
}

impl OutboundReply {
    pub fn text(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            content: ReplyContent::Text(text.into()),
            keyboard: None,
            parse_mode: Some(ParseMode::Html),
        }
    }

    pub fn photo(chat_id: i64, bytes: Vec<u8>, caption: impl Into<String>) -> Self {
        Self {
            chat_id,
            content: ReplyContent::Photo { bytes, caption: caption.into() },
            keyboard: None,
            parse_mode: Some(ParseMode::Html),
        }
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }

    /// Text body, if this is a text reply
    pub fn text_body(&self) -> Option<&str> {
        match &self.content {
            ReplyContent::Text(text) => Some(text),
            ReplyContent::Photo { .. } => None,
        }
    }
}
