//! Action tokens carried in inline button `callback_data`.
//!
//! A token is `action` or `action?k1=v1&k2=v2`. Keys and values are not
//! escaped, so they must not contain `?`, `&` or `=`. The whole position of a
//! user inside the purchase flow lives in these tokens; nothing is kept per
//! chat on the server.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

pub const CALLBACK_START: &str = "start";
pub const CALLBACK_BUY: &str = "buy";
pub const CALLBACK_SELL: &str = "sell";
pub const CALLBACK_CRYPTO: &str = "crypto";
pub const CALLBACK_CARD: &str = "card";
pub const CALLBACK_CONNECT: &str = "connect";

const PARAM_MONTH: &str = "month";

/// Builds a token from an action and its parameters, keeping parameter order.
pub fn encode(action: &str, params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        return action.to_string();
    }

    let query = params
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{}", action, query)
}

/// Extracts the parameters of a token. Pieces without `=` are skipped and a
/// repeated key keeps its last value. Never fails.
pub fn decode(token: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();

    let Some((_, query)) = token.split_once('?') else {
        return params;
    };

    for piece in query.split('&') {
        if let Some((key, value)) = piece.split_once('=') {
            params.insert(key.to_string(), value.to_string());
        }
    }

    params
}

/// The action part of a token, everything before the first `?`.
pub fn action_name(token: &str) -> &str {
    token.split_once('?').map_or(token, |(action, _)| action)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("unknown action `{0}`")]
    UnknownAction(String),
    #[error("action `{action}` is missing parameter `{param}`")]
    MissingParam {
        action: &'static str,
        param: &'static str,
    },
    #[error("action `{action}` has invalid `{param}` value `{value}`")]
    InvalidParam {
        action: &'static str,
        param: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    Buy,
    Sell { month: i32 },
    Crypto { month: i32 },
    Card { month: i32 },
    Connect,
}

impl Action {
    pub fn parse(token: &str) -> Result<Self, TokenError> {
        match action_name(token) {
            CALLBACK_START => Ok(Action::Start),
            CALLBACK_BUY => Ok(Action::Buy),
            CALLBACK_CONNECT => Ok(Action::Connect),
            CALLBACK_SELL => Ok(Action::Sell {
                month: month_param(CALLBACK_SELL, token)?,
            }),
            CALLBACK_CRYPTO => Ok(Action::Crypto {
                month: month_param(CALLBACK_CRYPTO, token)?,
            }),
            CALLBACK_CARD => Ok(Action::Card {
                month: month_param(CALLBACK_CARD, token)?,
            }),
            other => Err(TokenError::UnknownAction(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::Start => CALLBACK_START,
            Action::Buy => CALLBACK_BUY,
            Action::Sell { .. } => CALLBACK_SELL,
            Action::Crypto { .. } => CALLBACK_CRYPTO,
            Action::Card { .. } => CALLBACK_CARD,
            Action::Connect => CALLBACK_CONNECT,
        }
    }

    pub fn token(&self) -> String {
        match self {
            Action::Sell { month } | Action::Crypto { month } | Action::Card { month } => {
                let month = month.to_string();
                encode(self.name(), &[(PARAM_MONTH, month.as_str())])
            }
            _ => encode(self.name(), &[]),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token())
    }
}

fn month_param(action: &'static str, token: &str) -> Result<i32, TokenError> {
    let params = decode(token);
    let raw = params.get(PARAM_MONTH).ok_or(TokenError::MissingParam {
        action,
        param: PARAM_MONTH,
    })?;

    match raw.parse::<i32>() {
        Ok(month) if month > 0 => Ok(month),
        _ => Err(TokenError::InvalidParam {
            action,
            param: PARAM_MONTH,
            value: raw.clone(),
        }),
    }
}

pub fn sell_callback(month: i32) -> String {
    Action::Sell { month }.token()
}
