//! Bot handlers module
//!
//! Handlers run one dialog action inside the turn's unit of work. They read the
//! inbound event, mutate the conversation context and queue outbound replies:
//! - Command handlers for `start`, `help` and `cancel`
//! - Message handlers for menu labels and admin free-text input

pub mod commands;
pub mod keyboards;
pub mod messages;

use std::collections::HashMap;
use std::sync::Arc;
use crate::config::LinksConfig;
use crate::database::storage::UnitOfWork;
use crate::i18n::{TemplateParams, TemplateRenderer};
use crate::models::message::{InboundEvent, Keyboard, OutboundReply, Payload, Sender};
use crate::services::PayloadEncoder;
use crate::state::context::ConversationContext;
use crate::state::scenarios::Action;
use crate::utils::errors::{BotError, Result};

/// Dialog settings handlers depend on
#[derive(Debug, Clone)]
pub struct DialogSettings {
    /// Bot username for deep links, without `@`
    pub bot_username: String,
    pub list_page_size: i64,
    pub links: LinksConfig,
}

/// Collaborators shared by all turns
pub struct HandlerDeps {
    pub templates: Arc<dyn TemplateRenderer>,
    pub encoder: Arc<dyn PayloadEncoder>,
    pub settings: DialogSettings,
}

/// State of one turn while its action runs
pub struct TurnContext<'a> {
    pub deps: &'a HandlerDeps,
    pub event: &'a InboundEvent,
    pub is_admin: bool,
    pub conversation: ConversationContext,
    pub replies: Vec<OutboundReply>,
}

impl<'a> TurnContext<'a> {
    pub fn new(
        deps: &'a HandlerDeps,
        event: &'a InboundEvent,
        is_admin: bool,
        conversation: ConversationContext,
    ) -> Self {
        Self {
            deps,
            event,
            is_admin,
            conversation,
            replies: Vec::new(),
        }
    }

    pub fn sender(&self) -> &'a Sender {
        &self.event.sender
    }

    /// Free text of the event
    pub fn text(&self) -> Result<&'a str> {
        match &self.event.payload {
            Payload::Text(text) => Ok(text),
            Payload::Command { name, .. } => {
                Err(BotError::InvalidInput(format!("expected text, got command /{}", name)))
            }
        }
    }

    /// Argument of a command event
    pub fn command_argument(&self) -> Option<&'a str> {
        match &self.event.payload {
            Payload::Command { argument, .. } => argument.as_deref(),
            Payload::Text(_) => None,
        }
    }

    pub fn render(&self, name: &str, params: &[(&str, String)]) -> Result<String> {
        let params: TemplateParams = params
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect::<HashMap<_, _>>();
        self.deps.templates.render(name, &params)
    }

    /// Queue a text reply to the sender's chat
    pub fn reply(&mut self, text: String, keyboard: Keyboard) {
        let chat_id = self.sender().chat_id;
        self.replies.push(OutboundReply::text(chat_id, text).with_keyboard(keyboard));
    }

    pub fn push(&mut self, reply: OutboundReply) {
        self.replies.push(reply);
    }

    pub fn menu_keyboard(&self) -> Keyboard {
        keyboards::menu_for(self.is_admin)
    }
}

/// Run `action` for the turn
pub async fn execute(action: Action, cx: &mut TurnContext<'_>, uow: &mut dyn UnitOfWork) -> Result<()> {
    match action {
        Action::Start => commands::start::handle_start(cx, uow).await,
        Action::DeepLinkStart => commands::start::handle_deep_link_start(cx, uow).await,
        Action::Help => commands::help::handle_help(cx, uow).await,
        Action::Cancel => commands::help::handle_cancel(cx),
        Action::ShowBalance => messages::menu::handle_show_balance(cx, uow).await,
        Action::GenerateCode => messages::menu::handle_generate_code(cx),
        Action::AskNickname => messages::admin::handle_ask_nickname(cx),
        Action::ListUsers => messages::admin::handle_list_users(cx, uow).await,
        Action::FindUser => messages::admin::handle_find_user(cx, uow).await,
        Action::AskIncreaseAmount => messages::admin::handle_ask_amount(cx, Direction::Increase),
        Action::AskDecreaseAmount => messages::admin::handle_ask_amount(cx, Direction::Decrease),
        Action::IncreaseBalance => messages::admin::handle_change_balance(cx, uow, Direction::Increase).await,
        Action::DecreaseBalance => messages::admin::handle_change_balance(cx, uow, Direction::Decrease).await,
    }
}

/// Direction of a balance change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Increase,
    Decrease,
}
