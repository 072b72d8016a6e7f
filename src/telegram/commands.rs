//! Telegram commands and conversion of messages into inbound events

use teloxide::types::{Message, User};
use teloxide::utils::command::BotCommands;
use crate::models::message::{InboundEvent, Payload, Sender};

/// Commands registered with Telegram
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Доступні команди:")]
pub enum Command {
    #[command(description = "відкрити меню")]
    Start(String),
    #[command(description = "допомога та корисні посилання")]
    Help,
    #[command(description = "повернутися до меню")]
    Cancel,
}

impl Command {
    pub fn into_payload(self) -> Payload {
        match self {
            Command::Start(argument) => {
                let argument = argument.trim();
                Payload::command("start", (!argument.is_empty()).then_some(argument))
            }
            Command::Help => Payload::command("help", None),
            Command::Cancel => Payload::command("cancel", None),
        }
    }
}

/// Payload of a message text; unknown commands are parsed generically
pub fn parse_payload(text: &str, bot_username: &str) -> Payload {
    match Command::parse(text, bot_username) {
        Ok(command) => command.into_payload(),
        Err(_) => Payload::parse(text),
    }
}

pub fn sender_from(user: &User, chat_id: i64) -> Sender {
    Sender {
        id: user.id.0 as i64,
        chat_id,
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        username: user.username.clone(),
    }
}

/// Inbound event of a private text message; `None` for anything else
pub fn inbound_event(msg: &Message, bot_username: &str) -> Option<InboundEvent> {
    if !msg.chat.is_private() {
        return None;
    }

    let user = msg.from.as_ref()?;
    let text = msg.text()?;

    Some(InboundEvent {
        sender: sender_from(user, msg.chat.id.0),
        payload: parse_payload(text, bot_username),
    })
}
