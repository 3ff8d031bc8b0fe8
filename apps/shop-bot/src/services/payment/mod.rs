use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use shop_db::models::InvoiceType;

use crate::error::ProviderError;

pub mod cryptopay;
pub mod yookassa;

pub use cryptopay::CryptoPayProvider;
pub use yookassa::YooKassaProvider;

/// Everything a provider needs to bill one purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceRequest {
    pub amount: i64,
    pub currency: String,
    pub month: i32,
    /// Telegram chat id of the buyer.
    pub customer_id: i64,
    pub purchase_id: i64,
}

impl InvoiceRequest {
    /// Correlates asynchronous provider notifications with the purchase.
    pub fn payload(&self) -> String {
        format!(
            "customerId={}&purchaseId={}",
            self.customer_id, self.purchase_id
        )
    }

    pub fn description(&self) -> String {
        format!("Subscription on {} month", self.month)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    pub invoice_id: String,
    pub payable_url: Url,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn create_invoice(&self, request: &InvoiceRequest) -> Result<Invoice, ProviderError>;
}

/// One provider per invoice type.
#[derive(Clone)]
pub struct PaymentProviders {
    crypto: Arc<dyn PaymentProvider>,
    card: Arc<dyn PaymentProvider>,
}

impl PaymentProviders {
    pub fn new(crypto: Arc<dyn PaymentProvider>, card: Arc<dyn PaymentProvider>) -> Self {
        Self { crypto, card }
    }

    pub fn get(&self, invoice_type: InvoiceType) -> &dyn PaymentProvider {
        match invoice_type {
            InvoiceType::Crypto => self.crypto.as_ref(),
            InvoiceType::Card => self.card.as_ref(),
        }
    }
}

/// Only absolute http(s) links can back a URL button.
fn payable_url(provider: &'static str, raw: &str) -> Result<Url, ProviderError> {
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(url),
        _ => Err(ProviderError::Rejected {
            provider,
            message: format!("unusable payment url `{}`", raw),
        }),
    }
}

async fn read_json<T: DeserializeOwned>(
    provider: &'static str,
    resp: reqwest::Response,
) -> Result<T, ProviderError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ProviderError::Status {
            provider,
            status: status.as_u16(),
            body,
        });
    }

    resp.json()
        .await
        .map_err(|source| ProviderError::Transport { provider, source })
}
