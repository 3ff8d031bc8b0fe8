use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::{Invoice, InvoiceRequest, PaymentProvider, payable_url, read_json};
use crate::config::YooKassaConfig;
use crate::error::ProviderError;

const PROVIDER: &str = "yookassa";

#[derive(Debug, Serialize)]
struct Amount<'a> {
    value: String,
    currency: &'a str,
}

#[derive(Debug, Serialize)]
struct RedirectConfirmation<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    return_url: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PaymentMetadata {
    customer_id: String,
    purchase_id: String,
    month: String,
}

#[derive(Debug, Serialize)]
struct CreatePaymentBody<'a> {
    amount: Amount<'a>,
    capture: bool,
    confirmation: RedirectConfirmation<'a>,
    description: String,
    metadata: PaymentMetadata,
}

#[derive(Debug, Deserialize)]
struct Payment {
    id: String,
    confirmation: Option<PaymentConfirmation>,
}

#[derive(Debug, Deserialize)]
struct PaymentConfirmation {
    confirmation_url: Option<String>,
}

/// Card payments through YooKassa redirect confirmation.
pub struct YooKassaProvider {
    client: reqwest::Client,
    base_url: String,
    shop_id: String,
    secret_key: String,
    return_url: String,
}

impl YooKassaProvider {
    pub fn new(client: reqwest::Client, config: &YooKassaConfig, return_url: &str) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            shop_id: config.shop_id.clone(),
            secret_key: config.secret_key.clone(),
            return_url: return_url.to_string(),
        }
    }

    fn body<'a>(&'a self, request: &'a InvoiceRequest) -> CreatePaymentBody<'a> {
        CreatePaymentBody {
            amount: Amount {
                value: format!("{}.00", request.amount),
                currency: &request.currency,
            },
            capture: true,
            confirmation: RedirectConfirmation {
                kind: "redirect",
                return_url: &self.return_url,
            },
            description: request.description(),
            metadata: PaymentMetadata {
                customer_id: request.customer_id.to_string(),
                purchase_id: request.purchase_id.to_string(),
                month: request.month.to_string(),
            },
        }
    }
}

fn into_invoice(payment: Payment) -> Result<Invoice, ProviderError> {
    let url = payment
        .confirmation
        .and_then(|c| c.confirmation_url)
        .filter(|url| !url.is_empty());

    match url {
        Some(url) => Ok(Invoice {
            payable_url: payable_url(PROVIDER, &url)?,
            invoice_id: payment.id,
        }),
        None => Err(ProviderError::Rejected {
            provider: PROVIDER,
            message: format!("payment {} has no confirmation url", payment.id),
        }),
    }
}

#[async_trait]
impl PaymentProvider for YooKassaProvider {
    async fn create_invoice(&self, request: &InvoiceRequest) -> Result<Invoice, ProviderError> {
        info!(
            "Creating YooKassa payment for purchase {}: {} {}",
            request.purchase_id, request.amount, request.currency
        );

        let resp = self
            .client
            .post(format!("{}/payments", self.base_url))
            .basic_auth(&self.shop_id, Some(&self.secret_key))
            .header("Idempotence-Key", Uuid::new_v4().to_string())
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
