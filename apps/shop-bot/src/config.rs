use anyhow::{Context, Result};
use std::time::Duration;

/// Bound on the profile read/update done by `/start`.
pub const PROFILE_TIMEOUT: Duration = Duration::from_secs(2);
/// Bound on a whole checkout: customer lookup, purchase writes and the provider call.
pub const PAYMENT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct CryptoPayConfig {
    pub token: String,
    pub base_url: String,
    pub asset: String,
}

#[derive(Debug, Clone)]
pub struct YooKassaConfig {
    pub shop_id: String,
    pub secret_key: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    pub database_url: String,
    pub price: i64,
    pub currency: String,
    pub bot_url: String,
    pub default_language: String,
    pub crypto_pay: CryptoPayConfig,
    pub yookassa: YooKassaConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("{} is not set", key))
        };
        let optional = |key: &str, default: &str| -> String {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let price = required("PRICE")?
            .trim()
            .parse::<i64>()
            .context("PRICE must be an integer")?;
        if price <= 0 {
            return Err(anyhow::anyhow!("PRICE must be positive, got {}", price));
        }

        Ok(Self {
            bot_token: required("BOT_TOKEN")?,
            database_url: required("DATABASE_URL")?,
            price,
            currency: optional("CURRENCY", "RUB"),
            bot_url: required("BOT_URL")?,
            default_language: optional("DEFAULT_LANGUAGE", "en"),
            crypto_pay: CryptoPayConfig {
                token: required("CRYPTO_PAY_TOKEN")?,
                base_url: optional("CRYPTO_PAY_URL", "https://pay.crypt.bot/api"),
                asset: optional("CRYPTO_PAY_ASSET", "USDT"),
            },
            yookassa: YooKassaConfig {
                shop_id: required("YOOKASSA_SHOP_ID")?,
                secret_key: required("YOOKASSA_SECRET_KEY")?,
                base_url: optional("YOOKASSA_URL", "https://api.yookassa.ru/v3"),
            },
        })
    }
}
