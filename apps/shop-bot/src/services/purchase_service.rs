use std::sync::Arc;

use reqwest::Url;
use shop_db::models::{Customer, InvoiceType, NewPurchase, PurchaseInvoice};
use tokio::time::{timeout_at, Instant};
use tracing::{error, info, warn};

use crate::error::PurchaseError;
use crate::pricing::Pricing;
use crate::services::payment::{InvoiceRequest, PaymentProviders};
use crate::services::store::PurchaseStore;

/// A purchase that reached `Pending` and can be paid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkout {
    pub purchase_id: i64,
    pub payable_url: Url,
}

#[derive(Clone)]
pub struct PurchaseService {
    purchases: Arc<dyn PurchaseStore>,
    providers: PaymentProviders,
    pricing: Pricing,
    currency: String,
}

impl PurchaseService {
    pub fn new(
        purchases: Arc<dyn PurchaseStore>,
        providers: PaymentProviders,
        pricing: Pricing,
        currency: String,
    ) -> Self {
        Self {
            purchases,
            providers,
            pricing,
            currency,
        }
    }

    pub fn pricing(&self) -> Pricing {
        self.pricing
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Creates a `New` purchase, bills it with the provider for `invoice_type`
    /// and moves it to `Pending`. Single attempt, no retries. Every step must
    /// finish before `deadline`.
    ///
    /// A provider failure leaves the purchase in `New` without invoice fields.
    /// A failure or timeout while recording the invoice is returned as
    /// [`PurchaseError::InvoiceNotRecorded`] so the invoice can be reconciled.
    pub async fn initiate_purchase(
        &self,
        customer: &Customer,
        month: i32,
        invoice_type: InvoiceType,
        deadline: Instant,
    ) -> Result<Checkout, PurchaseError> {
        let amount = self.pricing.price(month);

        let purchase_id = timeout_at(
            deadline,
            self.purchases.create(&NewPurchase {
                customer_id: customer.id,
                month,
                amount,
                currency: self.currency.clone(),
                invoice_type,
            }),
        )
        .await
        .map_err(|_| PurchaseError::TimedOut("purchase creation"))?
        .map_err(PurchaseError::Persistence)?;

        let request = InvoiceRequest {
            amount,
            currency: self.currency.clone(),
            month,
            customer_id: customer.telegram_id,
            purchase_id,
        };

        let billed = timeout_at(
            deadline,
            self.providers.get(invoice_type).create_invoice(&request),
        )
        .await;
        let invoice = match billed {
            Ok(Ok(invoice)) => invoice,
            Ok(Err(source)) => {
                warn!(
                    "Purchase {} left in new state: {} invoice failed: {}",
                    purchase_id, invoice_type, source
                );
                return Err(PurchaseError::Provider {
                    purchase_id,
                    invoice_type,
                    source,
                });
            }
            Err(_) => {
                warn!(
                    "Purchase {} left in new state: {} invoice timed out",
                    purchase_id, invoice_type
                );
                return Err(PurchaseError::TimedOut("invoice creation"));
            }
        };

        let recorded = PurchaseInvoice {
            invoice_id: invoice.invoice_id,
            invoice_url: invoice.payable_url.to_string(),
        };

        let attached = timeout_at(deadline, self.purchases.attach_invoice(purchase_id, &recorded))
            .await
            .unwrap_or_else(|_| Err(anyhow::anyhow!("timed out recording the invoice")));
        if let Err(cause) = attached {
            error!(
                purchase_id,
                invoice_type = %invoice_type,
                invoice_id = %recorded.invoice_id,
                "Provider invoice exists but purchase was not marked pending, needs reconciliation: {:#}",
                cause
            );
            return Err(PurchaseError::InvoiceNotRecorded {
                purchase_id,
                invoice_type,
                invoice_id: recorded.invoice_id,
                cause,
            });
        }

        info!(
            "Purchase {} pending: {} months, {} {}, {} invoice {}",
            purchase_id, month, amount, self.currency, invoice_type, recorded.invoice_id
        );

        Ok(Checkout {
            purchase_id,
            payable_url: invoice.payable_url,
        })
    }
}
