//! Delivery of outbound replies through the Bot API

use teloxide::prelude::*;
use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, InputFile, KeyboardButton, KeyboardMarkup,
    KeyboardRemove, ParseMode as TelegramParseMode, ReplyMarkup,
};
use tracing::{debug, error};
use url::Url;
use crate::models::message::{Keyboard, OutboundReply, ParseMode, ReplyContent};
use crate::utils::errors::Result;

/// Sends replies; each reply is delivered independently
#[derive(Clone)]
pub struct TelegramDelivery {
    bot: Bot,
}

impl TelegramDelivery {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    /// Send replies in order, returning how many were delivered
    ///
    /// A failed send is logged and does not stop the remaining replies.
    pub async fn deliver(&self, replies: &[OutboundReply]) -> usize {
        let mut delivered = 0;
        for reply in replies {
            match self.send(reply).await {
                Ok(()) => delivered += 1,
                Err(e) => error!(chat_id = reply.chat_id, error = %e, "Failed to deliver reply"),
            }
        }
        debug!(delivered, total = replies.len(), "Replies delivered");
        delivered
    }

    pub async fn send(&self, reply: &OutboundReply) -> Result<()> {
        let chat_id = ChatId(reply.chat_id);
        let markup = reply.keyboard.as_ref().map(reply_markup).transpose()?;
        let parse_mode = reply.parse_mode.map(telegram_parse_mode);

        match &reply.content {
            ReplyContent::Text(text) => {
                let mut request = self.bot.send_message(chat_id, text.clone());
                if let Some(parse_mode) = parse_mode {
                    request = request.parse_mode(parse_mode);
                }
                if let Some(markup) = markup {
                    request = request.reply_markup(markup);
                }
                request.await?;
            }
            ReplyContent::Photo { bytes, caption } => {
                let photo = InputFile::memory(bytes.clone()).file_name("qr.png");
                let mut request = self.bot.send_photo(chat_id, photo).caption(caption.clone());
                if let Some(parse_mode) = parse_mode {
                    request = request.parse_mode(parse_mode);
                }
                if let Some(markup) = markup {
                    request = request.reply_markup(markup);
                }
                request.await?;
            }
        }

        Ok(())
    }
}

fn telegram_parse_mode(mode: ParseMode) -> TelegramParseMode {
    match mode {
        ParseMode::Html => TelegramParseMode::Html,
    }
}

/// Platform markup for a keyboard
pub fn reply_markup(keyboard: &Keyboard) -> Result<ReplyMarkup> {
    let markup = match keyboard {
        Keyboard::Menu(rows) => ReplyMarkup::Keyboard(
            KeyboardMarkup::new(
                rows.iter()
                    .map(|row| row.iter().map(KeyboardButton::new).collect::<Vec<_>>()),
            )
            .resize_keyboard(),
        ),
        Keyboard::Remove => ReplyMarkup::KeyboardRemove(KeyboardRemove::new()),
        Keyboard::Links(rows) => {
            let rows = rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|(label, url)| -> Result<InlineKeyboardButton> {
                            Ok(InlineKeyboardButton::url(label.clone(), Url::parse(url)?))
                        })
                        .collect::<Result<Vec<_>>>()
                })
                .collect::<Result<Vec<_>>>()?;
            ReplyMarkup::InlineKeyboard(InlineKeyboardMarkup::new(rows))
        }
    };

    Ok(markup)
}
