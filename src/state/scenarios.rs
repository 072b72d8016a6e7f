//! Dialog route tables
//!
//! Each dialog state owns an ordered list of routes. An event is matched
//! against the current state's routes in order and the first route whose
//! filter accepts it (and whose role requirement the sender meets) decides the
//! action. Events no route accepts are ignored.

use crate::handlers::keyboards::labels;
use crate::models::message::Payload;
use crate::utils::helpers::{is_amount, is_numeric, parse_handle};
use super::context::DialogState;

/// What a matched event does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Start,
    DeepLinkStart,
    Help,
    Cancel,
    ShowBalance,
    GenerateCode,
    AskNickname,
    ListUsers,
    FindUser,
    AskIncreaseAmount,
    AskDecreaseAmount,
    IncreaseBalance,
    DecreaseBalance,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Start => "start",
            Action::DeepLinkStart => "deep_link_start",
            Action::Help => "help",
            Action::Cancel => "cancel",
            Action::ShowBalance => "show_balance",
            Action::GenerateCode => "generate_code",
            Action::AskNickname => "ask_nickname",
            Action::ListUsers => "list_users",
            Action::FindUser => "find_user",
            Action::AskIncreaseAmount => "ask_increase_amount",
            Action::AskDecreaseAmount => "ask_decrease_amount",
            Action::IncreaseBalance => "increase_balance",
            Action::DecreaseBalance => "decrease_balance",
        }
    }
}

/// Predicate over an inbound payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    /// Command with this name, any argument
    Command(&'static str),
    /// `start` with a numeric argument
    DeepLink,
    /// Text equal to a keyboard label
    Label(&'static str),
    /// Text shaped like a username
    Handle,
    /// Text of digits only
    Amount,
}

impl Filter {
    pub fn matches(&self, payload: &Payload) -> bool {
        match (self, payload) {
            (Filter::Command(expected), Payload::Command { name, .. }) => name == expected,
            (Filter::DeepLink, Payload::Command { name, argument: Some(arg) }) => {
                name == "start" && is_numeric(arg)
            }
            (Filter::Label(label), Payload::Text(text)) => text == label,
            (Filter::Handle, Payload::Text(text)) => parse_handle(text).is_some(),
            (Filter::Amount, Payload::Text(text)) => is_amount(text),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub filter: Filter,
    pub admin_only: bool,
    pub action: Action,
}

impl Route {
    const fn any(filter: Filter, action: Action) -> Self {
        Self { filter, admin_only: false, action }
    }

    const fn admin(filter: Filter, action: Action) -> Self {
        Self { filter, admin_only: true, action }
    }

    pub fn accepts(&self, payload: &Payload, is_admin: bool) -> bool {
        (is_admin || !self.admin_only) && self.filter.matches(payload)
    }
}

const DEEP_LINK: Route = Route::admin(Filter::DeepLink, Action::DeepLinkStart);
const START: Route = Route::any(Filter::Command("start"), Action::Start);
const HELP: Route = Route::any(Filter::Command("help"), Action::Help);
const CANCEL: Route = Route::any(Filter::Command("cancel"), Action::Cancel);

static IDLE: [Route; 3] = [DEEP_LINK, START, HELP];

static MENU: [Route; 8] = [
    DEEP_LINK,
    START,
    HELP,
    CANCEL,
    Route::any(Filter::Label(labels::SHOW_BALANCE), Action::ShowBalance),
    Route::any(Filter::Label(labels::CREATE_QR), Action::GenerateCode),
    Route::admin(Filter::Label(labels::FIND_USER), Action::AskNickname),
    Route::admin(Filter::Label(labels::LIST_USERS), Action::ListUsers),
];

static TARGET_NICKNAME: [Route; 5] = [
    DEEP_LINK,
    START,
    HELP,
    CANCEL,
    Route::admin(Filter::Handle, Action::FindUser),
];

static TARGET_FOUND: [Route; 6] = [
    DEEP_LINK,
    START,
    HELP,
    CANCEL,
    Route::admin(Filter::Label(labels::INCREASE), Action::AskIncreaseAmount),
    Route::admin(Filter::Label(labels::DECREASE), Action::AskDecreaseAmount),
];

static INCREASE_AMOUNT: [Route; 5] = [
    DEEP_LINK,
    START,
    HELP,
    CANCEL,
    Route::admin(Filter::Amount, Action::IncreaseBalance),
];

static DECREASE_AMOUNT: [Route; 5] = [
    DEEP_LINK,
    START,
    HELP,
    CANCEL,
    Route::admin(Filter::Amount, Action::DecreaseBalance),
];

/// Ordered routes of a state
pub fn routes(state: DialogState) -> &'static [Route] {
    match state {
        DialogState::Idle => &IDLE,
        DialogState::AwaitingMenuChoice => &MENU,
        DialogState::AwaitingTargetNickname => &TARGET_NICKNAME,
        DialogState::TargetFound => &TARGET_FOUND,
        DialogState::AwaitingIncreaseAmount => &INCREASE_AMOUNT,
        DialogState::AwaitingDecreaseAmount => &DECREASE_AMOUNT,
    }
}

/// First action accepting the event in `state`, if any
pub fn route(state: DialogState, payload: &Payload, is_admin: bool) -> Option<Action> {
    routes(state)
        .iter()
        .find(|route| route.accepts(payload, is_admin))
        .map(|route| route.action)
}
