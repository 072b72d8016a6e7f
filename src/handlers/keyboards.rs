//! Reply keyboards and their button labels

use crate::config::LinksConfig;
use crate::models::message::Keyboard;

/// Button labels; incoming texts are matched against these exactly
pub mod labels {
    pub const SHOW_BALANCE: &str = "Баланс 💰";
    pub const CREATE_QR: &str = "QR-код 👩‍💻";
    pub const FIND_USER: &str = "Знайти користувача";
    pub const LIST_USERS: &str = "Список користувачів";
    pub const INCREASE: &str = "Додати бонуси ⬆️";
    pub const DECREASE: &str = "Зняти бонуси ⬇️";
    pub const INSTAGRAM: &str = "Instagram 📷";
    pub const BOOKING: &str = "Записатися 💅";
}

fn row(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

pub fn user_menu() -> Keyboard {
    Keyboard::Menu(vec![row(&[labels::SHOW_BALANCE, labels::CREATE_QR])])
}

pub fn admin_menu() -> Keyboard {
    Keyboard::Menu(vec![row(&[labels::FIND_USER, labels::LIST_USERS])])
}

pub fn menu_for(is_admin: bool) -> Keyboard {
    if is_admin { admin_menu() } else { user_menu() }
}

/// Actions on a selected user
pub fn target_actions() -> Keyboard {
    Keyboard::Menu(vec![row(&[labels::INCREASE, labels::DECREASE])])
}

pub fn links(config: &LinksConfig) -> Keyboard {
    Keyboard::Links(vec![vec![
        (labels::INSTAGRAM.to_string(), config.instagram.clone()),
        (labels::BOOKING.to_string(), config.booking.clone()),
    ]])
}
