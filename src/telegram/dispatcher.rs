//! Update dispatching
//!
//! Private text messages become inbound events for the conversation engine;
//! the replies of each turn are delivered afterwards.

use std::sync::Arc;
use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Me;
use crate::models::message::InboundEvent;
use crate::state::ConversationEngine;
use super::commands::inbound_event;
use super::delivery::TelegramDelivery;

pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;
type HandlerResult = Result<(), HandlerError>;

/// Handler tree for the dispatcher
pub fn schema() -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter_map(|msg: Message, me: Me| inbound_event(&msg, me.username()))
        .endpoint(handle_event)
}

async fn handle_event(
    event: InboundEvent,
    engine: Arc<ConversationEngine>,
    delivery: Arc<TelegramDelivery>,
) -> HandlerResult {
    let replies = engine.handle(&event).await;
    delivery.deliver(&replies).await;
    Ok(())
}
