use reqwest::Url;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::callback::{Action, sell_callback};
use crate::services::translation_service::Translator;

/// Durations offered on the buy screen, in display order.
pub const OFFERED_MONTHS: [i32; 3] = [1, 3, 6];

fn back_button(t: &Translator, lang: &str, target: Action) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(t.get_text(lang, "back_button"), target.token())
}

pub fn start_keyboard(t: &Translator, lang: &str) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            t.get_text(lang, "buy_button"),
            Action::Buy.token(),
        )],
        vec![InlineKeyboardButton::callback(
            t.get_text(lang, "connect_button"),
            Action::Connect.token(),
        )],
    ])
}

pub fn buy_keyboard(t: &Translator, lang: &str) -> InlineKeyboardMarkup {
    let durations = OFFERED_MONTHS
        .iter()
        .map(|month| {
            let key = format!("month_{}", month);
            InlineKeyboardButton::callback(t.get_text(lang, &key), sell_callback(*month))
        })
        .collect::<Vec<_>>();

    InlineKeyboardMarkup::new(vec![durations, vec![back_button(t, lang, Action::Start)]])
}

pub fn sell_keyboard(t: &Translator, lang: &str, month: i32) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            InlineKeyboardButton::callback(
                t.get_text(lang, "crypto_button"),
                Action::Crypto { month }.token(),
            ),
            InlineKeyboardButton::callback(
                t.get_text(lang, "card_button"),
                Action::Card { month }.token(),
            ),
        ],
        vec![back_button(t, lang, Action::Buy)],
    ])
}

pub fn checkout_keyboard(t: &Translator, lang: &str, month: i32, pay_url: Url) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::url(t.get_text(lang, "pay_button"), pay_url),
        back_button(t, lang, Action::Sell { month }),
    ]])
}

pub fn back_keyboard(t: &Translator, lang: &str, target: Action) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![back_button(t, lang, target)]])
}
