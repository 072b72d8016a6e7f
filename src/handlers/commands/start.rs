//! Start command handler
//!
//! Plain `start` registers the sender and opens the main menu. An admin
//! opening a user's personal code link lands on that user's card instead.

use tracing::{debug, info};
use crate::database::storage::UnitOfWork;
use crate::handlers::{keyboards, TurnContext};
use crate::handlers::messages::admin::user_card;
use crate::services::UserDirectory;
use crate::state::context::DialogState;
use crate::utils::errors::{BotError, Result};
use crate::utils::helpers::escape_html;
use crate::utils::logging::{log_admin_action, log_user_action};

/// Handle `start` - register the sender and show the menu
pub async fn handle_start(cx: &mut TurnContext<'_>, uow: &mut dyn UnitOfWork) -> Result<()> {
    let sender = cx.sender();
    debug!(user_id = sender.id, "Processing start command");

    UserDirectory::new(uow).upsert_user(&sender.to_upsert_request()).await?;

    let help = cx.render("help", &[("name", escape_html(&sender.first_name))])?;
    let menu = cx.menu_keyboard();
    cx.reply(help, menu);

    let links_title = cx.render("links_title", &[])?;
    cx.reply(links_title, keyboards::links(&cx.deps.settings.links));

    cx.conversation.return_to_menu();
    log_user_action(sender.id, "start", None);
    Ok(())
}

/// Handle `start <user_id>` from an admin - select that user
pub async fn handle_deep_link_start(cx: &mut TurnContext<'_>, uow: &mut dyn UnitOfWork) -> Result<()> {
    let argument = cx
        .command_argument()
        .ok_or_else(|| BotError::InvalidInput("deep link without argument".to_string()))?;
    let target_id: i64 = argument
        .parse()
        .map_err(|_| BotError::InvalidInput(format!("invalid user id in deep link: {}", argument)))?;

    let target = UserDirectory::new(uow).get_by_id(target_id).await?;

    cx.conversation.data.clear();
    cx.conversation.set_target_user_id(target.id)?;
    cx.conversation.transition(DialogState::TargetFound);

    let card = user_card(cx, &target)?;
    cx.reply(card, keyboards::target_actions());

    log_admin_action(cx.sender().id, "open_personal_code", Some(target.id), None);
    info!(admin_id = cx.sender().id, target_id = target.id, "Admin opened user by personal code");
    Ok(())
}
