//! Help and cancel command handlers

use crate::database::storage::UnitOfWork;
use crate::handlers::{keyboards, TurnContext};
use crate::services::UserDirectory;
use crate::state::context::DialogState;
use crate::utils::errors::Result;
use crate::utils::helpers::escape_html;
use crate::utils::logging::log_user_action;

/// Handle `help`
///
/// Outside the admin flow this also opens the menu; inside it the current
/// step is kept so the admin can continue.
pub async fn handle_help(cx: &mut TurnContext<'_>, uow: &mut dyn UnitOfWork) -> Result<()> {
    let sender = cx.sender();
    UserDirectory::new(uow).upsert_user(&sender.to_upsert_request()).await?;

    let help = cx.render("help", &[("name", escape_html(&sender.first_name))])?;

    if cx.conversation.state.is_admin_flow() {
        cx.reply(help, keyboards::links(&cx.deps.settings.links));
    } else {
        let menu = cx.menu_keyboard();
        cx.reply(help, menu);
        let links_title = cx.render("links_title", &[])?;
        cx.reply(links_title, keyboards::links(&cx.deps.settings.links));
        cx.conversation.transition(DialogState::AwaitingMenuChoice);
    }

    log_user_action(sender.id, "help", None);
    Ok(())
}

/// Handle `cancel` - abandon the current flow and go back to the menu
pub fn handle_cancel(cx: &mut TurnContext<'_>) -> Result<()> {
    let from = cx.conversation.state;
    let text = cx.render("cancel", &[])?;
    let menu = cx.menu_keyboard();
    cx.reply(text, menu);

    cx.conversation.return_to_menu();
    log_user_action(cx.sender().id, "cancel", Some(from.as_str()));
    Ok(())
}
