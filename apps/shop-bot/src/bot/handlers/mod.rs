pub mod callback;
pub mod command;

use teloxide::types::User;

/// Telegram language of the sender, or the configured default.
pub(crate) fn user_language(user: Option<&User>, default: &str) -> String {
    user.and_then(|u| u.language_code.clone())
        .filter(|code| !code.is_empty())
        .unwrap_or_else(|| default.to_string())
}
