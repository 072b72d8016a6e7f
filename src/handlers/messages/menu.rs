//! Main menu handlers available to every user

use tracing::debug;
use crate::database::storage::UnitOfWork;
use crate::handlers::TurnContext;
use crate::models::message::OutboundReply;
use crate::services::UserDirectory;
use crate::utils::errors::Result;
use crate::utils::helpers::deep_link;
use crate::utils::logging::log_user_action;

/// Reply with the sender's current balance
pub async fn handle_show_balance(cx: &mut TurnContext<'_>, uow: &mut dyn UnitOfWork) -> Result<()> {
    let sender = cx.sender();
    let balance = UserDirectory::new(uow).get_balance(sender.id).await?;

    let text = cx.render("balance", &[("count", balance.to_string())])?;
    let menu = cx.menu_keyboard();
    cx.reply(text, menu);

    log_user_action(sender.id, "show_balance", None);
    Ok(())
}

/// Reply with a QR code of the sender's personal deep link
pub fn handle_generate_code(cx: &mut TurnContext<'_>) -> Result<()> {
    let sender = cx.sender();
    let link = deep_link(&cx.deps.settings.bot_username, &sender.id.to_string());
    debug!(user_id = sender.id, link = %link, "Generating personal code");

    let bytes = cx.deps.encoder.encode(&link)?;
    let caption = cx.render("qr_caption", &[])?;
    cx.push(OutboundReply::photo(sender.chat_id, bytes, caption));

    log_user_action(sender.id, "generate_code", None);
    Ok(())
}
