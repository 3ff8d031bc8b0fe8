use std::sync::Arc;

use dotenvy::dotenv;
use shop_db::repositories::{CustomerRepository, PurchaseRepository};
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod bot;
mod callback;
mod config;
mod error;
mod pricing;
mod services;
mod state;

use crate::bot::navigation::Navigator;
use crate::config::{Config, PAYMENT_TIMEOUT};
use crate::pricing::Pricing;
use crate::services::customer_service::CustomerService;
use crate::services::payment::{CryptoPayProvider, PaymentProviders, YooKassaProvider};
use crate::services::purchase_service::PurchaseService;
use crate::services::store::{CustomerStore, PurchaseStore};
use crate::services::translation_service::Translator;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting shop bot...");

    let config = Config::from_env()?;
    let pool = shop_db::db::init_db(&config.database_url).await?;

    let customers: Arc<dyn CustomerStore> = Arc::new(CustomerRepository::new(pool.clone()));
    let purchases: Arc<dyn PurchaseStore> = Arc::new(PurchaseRepository::new(pool));

    let http = reqwest::Client::builder().timeout(PAYMENT_TIMEOUT).build()?;
    let providers = PaymentProviders::new(
        Arc::new(CryptoPayProvider::new(http.clone(), &config.crypto_pay, &config.bot_url)),
        Arc::new(YooKassaProvider::new(http, &config.yookassa, &config.bot_url)),
    );

    let translator = Arc::new(Translator::embedded(&config.default_language)?);
    let purchase_service = PurchaseService::new(
        purchases,
        providers,
        Pricing::new(config.price),
        config.currency.clone(),
    );
    let navigator = Navigator::new(translator, customers.clone(), purchase_service);

    let state = AppState {
        navigator: Arc::new(navigator),
        customer_service: CustomerService::new(customers),
        default_language: config.default_language.clone(),
    };

    let bot = Bot::new(&config.bot_token);

    let (tx, rx) = tokio::sync::broadcast::channel(1);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = tx.send(());
        }
    });

    bot::run_bot(bot, rx, state).await;
    Ok(())
}
