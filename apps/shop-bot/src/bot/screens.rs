//! Screen rendering. Every function here is pure: text and buttons depend
//! only on the language and the data passed in.

use chrono::{DateTime, Utc};
use reqwest::Url;
use shop_db::models::Customer;
use teloxide::types::InlineKeyboardMarkup;
use teloxide::utils::html;

use crate::bot::keyboards::{
    OFFERED_MONTHS, back_keyboard, buy_keyboard, checkout_keyboard, sell_keyboard, start_keyboard,
};
use crate::callback::Action;
use crate::pricing::Pricing;
use crate::services::translation_service::Translator;

const EXPIRY_FORMAT: &str = "%d.%m.%Y %H:%M";

#[derive(Debug, Clone)]
pub enum Screen {
    /// Replace both text (HTML) and buttons of the message.
    Message {
        text: String,
        keyboard: InlineKeyboardMarkup,
    },
    /// Replace only the buttons, keeping the current text.
    Keyboard(InlineKeyboardMarkup),
}

impl Screen {
    pub fn keyboard(&self) -> &InlineKeyboardMarkup {
        match self {
            Screen::Message { keyboard, .. } | Screen::Keyboard(keyboard) => keyboard,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Screen::Message { text, .. } => Some(text.as_str()),
            Screen::Keyboard(_) => None,
        }
    }
}

pub fn start_screen(t: &Translator, lang: &str) -> Screen {
    Screen::Message {
        text: t.get_text(lang, "greeting").to_string(),
        keyboard: start_keyboard(t, lang),
    }
}

pub fn buy_screen(t: &Translator, lang: &str, pricing: Pricing, currency: &str) -> Screen {
    let prices = OFFERED_MONTHS
        .iter()
        .map(|month| format!("{} {}", pricing.price(*month), html::escape(currency)))
        .collect::<Vec<_>>();
    let prices = prices.iter().map(String::as_str).collect::<Vec<_>>();

    Screen::Message {
        text: t.format(lang, "pricing_info", &prices),
        keyboard: buy_keyboard(t, lang),
    }
}

pub fn sell_screen(t: &Translator, lang: &str, month: i32) -> Screen {
    Screen::Keyboard(sell_keyboard(t, lang, month))
}

pub fn checkout_screen(t: &Translator, lang: &str, month: i32, payable_url: &Url) -> Screen {
    Screen::Keyboard(checkout_keyboard(t, lang, month, payable_url.clone()))
}

pub fn connect_screen(t: &Translator, lang: &str, customer: &Customer, now: DateTime<Utc>) -> Screen {
    Screen::Message {
        text: connect_text(t, lang, customer, now),
        keyboard: back_keyboard(t, lang, Action::Start),
    }
}

pub fn connect_text(t: &Translator, lang: &str, customer: &Customer, now: DateTime<Utc>) -> String {
    let Some(expire_at) = customer.active_until(now) else {
        return t.get_text(lang, "no_subscription").to_string();
    };

    let expiry = expire_at.format(EXPIRY_FORMAT).to_string();
    let mut text = t.format(lang, "subscription_active", &[&expiry]);
    if let Some(link) = customer.subscription_link() {
        text.push_str(&t.format(lang, "subscription_link", &[&html::escape(link)]));
    }
    text
}
