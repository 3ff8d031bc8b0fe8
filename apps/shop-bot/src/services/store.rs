use anyhow::Result;
use async_trait::async_trait;
use shop_db::models::{Customer, NewPurchase, PurchaseInvoice};
use shop_db::repositories::{CustomerRepository, PurchaseRepository};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn find_by_telegram_id(&self, telegram_id: i64) -> Result<Option<Customer>>;
    async fn create(&self, telegram_id: i64, language: &str) -> Result<Customer>;
    async fn update_language(&self, id: i64, language: &str) -> Result<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PurchaseStore: Send + Sync {
    /// Inserts a `New` purchase and returns its id.
    async fn create(&self, purchase: &NewPurchase) -> Result<i64>;
    /// Records the provider invoice and switches the purchase to `Pending` atomically.
    async fn attach_invoice(&self, id: i64, invoice: &PurchaseInvoice) -> Result<()>;
}

#[async_trait]
impl CustomerStore for CustomerRepository {
    async fn find_by_telegram_id(&self, telegram_id: i64) -> Result<Option<Customer>> {
        CustomerRepository::find_by_telegram_id(self, telegram_id).await
    }

    async fn create(&self, telegram_id: i64, language: &str) -> Result<Customer> {
        CustomerRepository::create(self, telegram_id, language).await
    }

    async fn update_language(&self, id: i64, language: &str) -> Result<()> {
        CustomerRepository::update_language(self, id, language).await
    }
}

#[async_trait]
impl PurchaseStore for PurchaseRepository {
    async fn create(&self, purchase: &NewPurchase) -> Result<i64> {
        PurchaseRepository::create(self, purchase).await
    }

    async fn attach_invoice(&self, id: i64, invoice: &PurchaseInvoice) -> Result<()> {
        PurchaseRepository::attach_invoice(self, id, invoice).await
    }
}
