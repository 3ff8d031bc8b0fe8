pub mod customer;
pub mod purchase;

pub use customer::Customer;
pub use purchase::{InvoiceType, NewPurchase, Purchase, PurchaseInvoice, PurchaseStatus};

#[derive(Debug, thiserror::Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}
