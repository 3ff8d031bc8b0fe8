use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{Invoice, InvoiceRequest, PaymentProvider, payable_url, read_json};
use crate::config::CryptoPayConfig;
use crate::error::ProviderError;

const PROVIDER: &str = "cryptopay";

#[derive(Debug, Serialize)]
struct CreateInvoiceBody<'a> {
    currency_type: &'static str,
    fiat: &'a str,
    amount: String,
    accepted_assets: &'a str,
    payload: String,
    description: String,
    paid_btn_name: &'static str,
    paid_btn_url: &'a str,
}

#[derive(Debug, Deserialize)]
struct CryptoPayResponse<T> {
    ok: bool,
    result: Option<T>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct CreatedInvoice {
    invoice_id: i64,
    bot_invoice_url: String,
}

/// Crypto Pay invoices priced in fiat and settled in a single asset.
pub struct CryptoPayProvider {
    client: reqwest::Client,
    base_url: String,
    token: String,
    asset: String,
    return_url: String,
}

impl CryptoPayProvider {
    pub fn new(client: reqwest::Client, config: &CryptoPayConfig, return_url: &str) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            asset: config.asset.clone(),
            return_url: return_url.to_string(),
        }
    }

    fn body<'a>(&'a self, request: &'a InvoiceRequest) -> CreateInvoiceBody<'a> {
        CreateInvoiceBody {
            currency_type: "fiat",
            fiat: &request.currency,
            amount: request.amount.to_string(),
            accepted_assets: &self.asset,
            payload: request.payload(),
            description: request.description(),
            paid_btn_name: "callback",
            paid_btn_url: &self.return_url,
        }
    }
}

fn into_invoice(resp: CryptoPayResponse<CreatedInvoice>) -> Result<Invoice, ProviderError> {
    match resp.result {
        Some(created) if resp.ok => Ok(Invoice {
            invoice_id: created.invoice_id.to_string(),
            payable_url: payable_url(PROVIDER, &created.bot_invoice_url)?,
        }),
        _ => Err(ProviderError::Rejected {
            provider: PROVIDER,
            message: resp
                .error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no invoice in response".to_string()),
        }),
    }
}

#[async_trait]
impl PaymentProvider for CryptoPayProvider {
    async fn create_invoice(&self, request: &InvoiceRequest) -> Result<Invoice, ProviderError> {
        info!(
            "Creating Crypto Pay invoice for purchase {}: {} {}",
            request.purchase_id, request.amount, request.currency
        );

        let resp = self
            .client
            .post(format!("{}/createInvoice", self.base_url))
            .header("Crypto-Pay-API-Token", &self.token)
            .json(&self.body(request))
            .send()
            .await
            .map_err(|source| ProviderError::Transport {
                provider: PROVIDER,
                source,
            })?;

        into_invoice(read_json(PROVIDER, resp).await?)
    }
}
