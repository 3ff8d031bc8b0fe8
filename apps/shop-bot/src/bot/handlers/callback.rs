use teloxide::prelude::*;
use teloxide::types::{CallbackQuery, ParseMode};
use tracing::{debug, error, info, warn};

use crate::bot::handlers::user_language;
use crate::bot::navigation::InboundEvent;
use crate::bot::screens::Screen;
use crate::callback::{Action, TokenError};
use crate::error::BotError;
use crate::state::AppState;

pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    state: AppState,
) -> Result<(), teloxide::RequestError> {
    let callback_id = q.id.clone();
    let Some(data) = q.data.as_deref() else {
        let _ = bot.answer_callback_query(callback_id).await;
        return Ok(());
    };
    let Some(msg) = q.message.as_ref() else {
        debug!("Callback {:?} without message", data);
        let _ = bot.answer_callback_query(callback_id).await;
        return Ok(());
    };

    let chat_id = msg.chat().id;
    let language = user_language(Some(&q.from), &state.default_language);
    let failure = state
        .navigator
        .translator()
        .get_text(&language, "error_generic")
        .to_string();

    let action = match Action::parse(data) {
        Ok(action) => action,
        Err(TokenError::UnknownAction(name)) => {
            debug!("No route for callback action {:?} in chat {}", name, chat_id);
            let _ = bot.answer_callback_query(callback_id).await;
            return Ok(());
        }
        Err(e) => {
            warn!("Callback {:?} in chat {}: {}", data, chat_id, BotError::from(e));
            let _ = bot
                .answer_callback_query(callback_id)
                .text(failure)
                .show_alert(true)
                .await;
            return Ok(());
        }
    };

    info!("Callback {} from chat {}", action, chat_id);
    let event = InboundEvent {
        chat_id: chat_id.0,
        language,
    };

    let screen = match state.navigator.navigate(&event, action).await {
        Ok(screen) => screen,
        Err(e) => {
            error!("Callback {} failed for chat {}: {}", action, chat_id, e);
            let _ = bot
                .answer_callback_query(callback_id)
                .text(failure)
                .show_alert(true)
                .await;
            return Ok(());
        }
    };

    let sent = match screen {
        Screen::Message { text, keyboard } => bot
            .edit_message_text(chat_id, msg.id(), text)
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboard)
            .await
            .map(|_| ()),
        Screen::Keyboard(keyboard) => bot
            .edit_message_reply_markup(chat_id, msg.id())
            .reply_markup(keyboard)
            .await
            .map(|_| ()),
    };
    if let Err(e) = sent {
        error!("Failed to render {} for chat {}: {}", action, chat_id, e);
    }

    let _ = bot.answer_callback_query(callback_id).await;
    Ok(())
}
