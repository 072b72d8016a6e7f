//! Admin flow handlers
//!
//! Selecting a user by nickname, listing users and changing balances. Every
//! handler here is only reachable by admins.

use tracing::{debug, info};
use crate::database::storage::UnitOfWork;
use crate::handlers::{keyboards, Direction, TurnContext};
use crate::models::message::{Keyboard, OutboundReply};
use crate::models::user::User;
use crate::services::{BalanceChange, BalanceLedger, Debit, UserDirectory};
use crate::state::context::DialogState;
use crate::utils::errors::{BotError, Result};
use crate::utils::helpers::{escape_html, parse_handle};
use crate::utils::logging::{log_admin_action, log_balance_change, log_balance_refusal};

/// Ask for the nickname of the user to operate on
pub fn handle_ask_nickname(cx: &mut TurnContext<'_>) -> Result<()> {
    let text = cx.render("admin.ask_nickname", &[])?;
    cx.reply(text, Keyboard::Remove);
    cx.conversation.transition(DialogState::AwaitingTargetNickname);
    Ok(())
}

/// Look up the user by the nickname the admin sent
pub async fn handle_find_user(cx: &mut TurnContext<'_>, uow: &mut dyn UnitOfWork) -> Result<()> {
    let text = cx.text()?;
    let username = parse_handle(text)
        .ok_or_else(|| BotError::InvalidInput(format!("not a username: {}", text)))?;

    match UserDirectory::new(uow).get_by_username(username).await? {
        Some(target) => {
            cx.conversation.set_target_user_id(target.id)?;
            cx.conversation.transition(DialogState::TargetFound);

            let card = user_card(cx, &target)?;
            cx.reply(card, keyboards::target_actions());
            log_admin_action(cx.sender().id, "find_user", Some(target.id), Some(username));
        }
        None => {
            let reply = cx.render("admin.user_not_found", &[("username", escape_html(username))])?;
            let menu = cx.menu_keyboard();
            cx.reply(reply, menu);
            cx.conversation.return_to_menu();
            info!(admin_id = cx.sender().id, username, "No user with this username");
        }
    }

    Ok(())
}

/// Reply with the first page of known users
pub async fn handle_list_users(cx: &mut TurnContext<'_>, uow: &mut dyn UnitOfWork) -> Result<()> {
    let page = UserDirectory::new(uow)
        .list_users(cx.deps.settings.list_page_size, 0)
        .await?;

    let text = if page.users.is_empty() {
        cx.render("admin.users_empty", &[])?
    } else {
        let mut lines = vec![cx.render("admin.users_title", &[("count", page.total.to_string())])?];
        for user in &page.users {
            lines.push(cx.render(
                "admin.users_line",
                &[
                    ("user", escape_html(&user.short_info())),
                    ("id", user.id.to_string()),
                    ("bonuses", user.bonuses.to_string()),
                ],
            )?);
        }
        let rest = page.total - page.users.len() as i64;
        if rest > 0 {
            lines.push(cx.render("admin.users_more", &[("rest", rest.to_string())])?);
        }
        lines.join("\n")
    };

    let menu = cx.menu_keyboard();
    cx.reply(text, menu);
    log_admin_action(cx.sender().id, "list_users", None, None);
    Ok(())
}

/// Ask how many bonuses to add or take
pub fn handle_ask_amount(cx: &mut TurnContext<'_>, direction: Direction) -> Result<()> {
    let (template, next) = match direction {
        Direction::Increase => ("admin.ask_increase", DialogState::AwaitingIncreaseAmount),
        Direction::Decrease => ("admin.ask_decrease", DialogState::AwaitingDecreaseAmount),
    };

    let text = cx.render(template, &[])?;
    cx.reply(text, Keyboard::Remove);
    cx.conversation.transition(next);
    Ok(())
}

/// Apply the amount the admin sent to the selected user
///
/// A successful change is confirmed to the admin and pushed to the user. A
/// refused withdrawal only informs the admin. Either way the dialog returns
/// to the menu. An amount that is zero or out of range is asked for again.
pub async fn handle_change_balance(
    cx: &mut TurnContext<'_>,
    uow: &mut dyn UnitOfWork,
    direction: Direction,
) -> Result<()> {
    let admin_id = cx.sender().id;
    let target_id = cx
        .conversation
        .target_user_id()
        .ok_or_else(|| BotError::InvalidInput("no user selected".to_string()))?;
    let text = cx.text()?;

    let Some(amount) = text.trim().parse::<i64>().ok().filter(|amount| *amount > 0) else {
        let reply = cx.render("admin.amount_positive", &[])?;
        cx.reply(reply, Keyboard::Remove);
        debug!(admin_id, target_id, text, "Amount rejected, asking again");
        return Ok(());
    };

    let mut ledger = BalanceLedger::new(uow);
    let outcome = match direction {
        Direction::Increase => Debit::Applied(ledger.increase(target_id, amount).await?),
        Direction::Decrease => ledger.decrease(target_id, amount).await?,
    };

    match outcome {
        Debit::Applied(change) => {
            log_balance_change(admin_id, target_id, change.previous, change.current());
            confirm_change(cx, &change, amount, direction)?;
        }
        Debit::Refused { balance, user } => {
            log_balance_refusal(admin_id, target_id, balance, amount);

            let reply = cx.render(
                "admin.insufficient",
                &[
                    ("user", escape_html(&user.short_info())),
                    ("id", user.id.to_string()),
                    ("amount", amount.to_string()),
                    ("balance", balance.to_string()),
                ],
            )?;
            let menu = cx.menu_keyboard();
            cx.reply(reply, menu);
        }
    }

    cx.conversation.return_to_menu();
    Ok(())
}

fn confirm_change(cx: &mut TurnContext<'_>, change: &BalanceChange, amount: i64, direction: Direction) -> Result<()> {
    let (admin_template, user_template) = match direction {
        Direction::Increase => ("admin.increased", "notify.increased"),
        Direction::Decrease => ("admin.decreased", "notify.decreased"),
    };
    let target = &change.user;

    let confirmation = cx.render(
        admin_template,
        &[
            ("user", escape_html(&target.short_info())),
            ("id", target.id.to_string()),
            ("amount", amount.to_string()),
            ("previous", change.previous.to_string()),
            ("current", change.current().to_string()),
        ],
    )?;
    let menu = cx.menu_keyboard();
    cx.reply(confirmation, menu);

    let notification = cx.render(
        user_template,
        &[
            ("amount", amount.to_string()),
            ("current", change.current().to_string()),
        ],
    )?;
    cx.push(OutboundReply::text(target.chat_id, notification));
    Ok(())
}

/// Card describing a user and their balance
pub(crate) fn user_card(cx: &TurnContext<'_>, target: &User) -> Result<String> {
    cx.render(
        "admin.user_card",
        &[
            ("user", escape_html(&target.short_info())),
            ("id", target.id.to_string()),
            ("count", target.bonuses.to_string()),
        ],
    )
}
