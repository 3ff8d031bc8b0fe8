use shop_db::models::InvoiceType;
use thiserror::Error;

use crate::callback::TokenError;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider} request failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{provider} responded with HTTP {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },
    #[error("{provider} rejected the invoice: {message}")]
    Rejected {
        provider: &'static str,
        message: String,
    },
}

#[derive(Debug, Error)]
pub enum PurchaseError {
    #[error("failed to create purchase: {0:#}")]
    Persistence(anyhow::Error),
    #[error("{invoice_type} invoice for purchase {purchase_id} failed")]
    Provider {
        purchase_id: i64,
        invoice_type: InvoiceType,
        #[source]
        source: ProviderError,
    },
    /// The provider invoice exists but the purchase could not be switched to `Pending`.
    #[error(
        "purchase {purchase_id} has {invoice_type} invoice {invoice_id} that was not recorded: {cause:#}"
    )]
    InvoiceNotRecorded {
        purchase_id: i64,
        invoice_type: InvoiceType,
        invoice_id: String,
        cause: anyhow::Error,
    },
    #[error("{0} timed out")]
    TimedOut(&'static str),
}

#[derive(Debug, Error)]
pub enum BotError {
    #[error("customer store failed: {0:#}")]
    Persistence(anyhow::Error),
    #[error("customer with chat id {0} not found")]
    NotFound(i64),
    #[error(transparent)]
    MalformedToken(#[from] TokenError),
    #[error(transparent)]
    Purchase(#[from] PurchaseError),
    #[error("{0} timed out")]
    Timeout(&'static str),
}
