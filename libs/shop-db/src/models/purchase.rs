use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::UnknownVariant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceType {
    Crypto,
    Card,
}

impl InvoiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceType::Crypto => "crypto",
            InvoiceType::Card => "card",
        }
    }
}

impl fmt::Display for InvoiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "crypto" => Ok(InvoiceType::Crypto),
            "card" => Ok(InvoiceType::Card),
            other => Err(UnknownVariant {
                kind: "invoice type",
                value: other.to_string(),
            }),
        }
    }
}

/// `New` and `Pending` are written by the bot; the rest belong to the payment webhook side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStatus {
    New,
    Pending,
    Paid,
    Cancelled,
    Expired,
}

impl PurchaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseStatus::New => "new",
            PurchaseStatus::Pending => "pending",
            PurchaseStatus::Paid => "paid",
            PurchaseStatus::Cancelled => "cancelled",
            PurchaseStatus::Expired => "expired",
        }
    }
}

impl fmt::Display for PurchaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PurchaseStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(PurchaseStatus::New),
            "pending" => Ok(PurchaseStatus::Pending),
            "paid" => Ok(PurchaseStatus::Paid),
            "cancelled" => Ok(PurchaseStatus::Cancelled),
            "expired" => Ok(PurchaseStatus::Expired),
            other => Err(UnknownVariant {
                kind: "purchase status",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    pub id: i64,
    pub customer_id: i64,
    pub month: i32,
    pub amount: i64,
    pub currency: String,
    pub invoice_type: InvoiceType,
    pub status: PurchaseStatus,
    pub invoice: Option<PurchaseInvoice>,
    pub created_at: DateTime<Utc>,
}

/// Fields of a purchase before the store assigns it an id. Always inserted as `New`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPurchase {
    pub customer_id: i64,
    pub month: i32,
    pub amount: i64,
    pub currency: String,
    pub invoice_type: InvoiceType,
}

/// Provider invoice attached to a purchase together with the switch to `Pending`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseInvoice {
    pub invoice_id: String,
    pub invoice_url: String,
}
