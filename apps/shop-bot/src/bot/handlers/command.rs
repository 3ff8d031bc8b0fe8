use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tracing::{debug, error, info};

use crate::bot::handlers::user_language;
use crate::bot::screens::{self, Screen};
use crate::state::AppState;

pub async fn message_handler(
    bot: Bot,
    msg: Message,
    state: AppState,
) -> Result<(), teloxide::RequestError> {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    if !is_start_command(text) {
        debug!("Ignoring message in chat {}: {:?}", msg.chat.id, text);
        return Ok(());
    }

    let chat_id = msg.chat.id.0;
    let language = user_language(msg.from.as_ref(), &state.default_language);
    info!("/start from chat {} ({})", chat_id, language);

    if let Err(e) = state
        .customer_service
        .register_contact(chat_id, &language)
        .await
    {
        error!("Failed to register customer for chat {}: {}", chat_id, e);
        return Ok(());
    }

    let translator = state.navigator.translator();
    if let Screen::Message { text, keyboard } = screens::start_screen(translator, &language) {
        let _ = bot
            .send_message(msg.chat.id, text)
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboard)
            .await
            .map_err(|e| error!("Failed to send start screen to chat {}: {}", chat_id, e));
    }

    Ok(())
}

/// `/start`, `/start payload` and `/start@bot_name`.
fn is_start_command(text: &str) -> bool {
    let command = text.split_whitespace().next().unwrap_or("");
    command == "/start" || command.starts_with("/start@")
}
