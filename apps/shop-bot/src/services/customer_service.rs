use std::sync::Arc;

use shop_db::models::Customer;
use tokio::time::timeout;
use tracing::info;

use crate::config::PROFILE_TIMEOUT;
use crate::error::BotError;
use crate::services::store::CustomerStore;

#[derive(Clone)]
pub struct CustomerService {
    customers: Arc<dyn CustomerStore>,
}

impl CustomerService {
    pub fn new(customers: Arc<dyn CustomerStore>) -> Self {
        Self { customers }
    }

    /// Creates the customer on first contact, otherwise refreshes its language.
    pub async fn register_contact(
        &self,
        telegram_id: i64,
        language: &str,
    ) -> Result<Customer, BotError> {
        timeout(PROFILE_TIMEOUT, self.upsert(telegram_id, language))
            .await
            .map_err(|_| BotError::Timeout("customer registration"))?
    }

    async fn upsert(&self, telegram_id: i64, language: &str) -> Result<Customer, BotError> {
        let existing = self
            .customers
            .find_by_telegram_id(telegram_id)
            .await
            .map_err(BotError::Persistence)?;

        match existing {
            Some(mut customer) => {
                self.customers
                    .update_language(customer.id, language)
                    .await
                    .map_err(BotError::Persistence)?;
                customer.language = language.to_string();
                Ok(customer)
            }
            None => {
                let customer = self
                    .customers
                    .create(telegram_id, language)
                    .await
                    .map_err(BotError::Persistence)?;
                info!("Registered customer {} for chat {}", customer.id, telegram_id);
                Ok(customer)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::store::MockCustomerStore;
    use async_trait::async_trait;
    use chrono::Utc;
    use mockall::predicate::eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn customer(id: i64, telegram_id: i64, language: &str) -> Customer {
        Customer {
            id,
            telegram_id,
            language: language.to_string(),
            expire_at: None,
            subscription_link: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn first_contact_creates_customer() {
        let mut store = MockCustomerStore::new();
        store
            .expect_find_by_telegram_id()
            .with(eq(42))
            .times(1)
            .returning(|_| Ok(None));
        store
            .expect_create()
            .withf(|telegram_id, language| *telegram_id == 42 && language == "ru")
            .times(1)
            .returning(|telegram_id, language| Ok(customer(1, telegram_id, language)));
        store.expect_update_language().never();

        let service = CustomerService::new(Arc::new(store));
        let created = service.register_contact(42, "ru").await.unwrap();
        assert_eq!(created.telegram_id, 42);
        assert_eq!(created.language, "ru");
    }

    #[tokio::test]
    async fn returning_customer_gets_language_updated() {
        let mut store = MockCustomerStore::new();
        store
            .expect_find_by_telegram_id()
            .returning(|telegram_id| Ok(Some(customer(5, telegram_id, "en"))));
        store
            .expect_update_language()
            .withf(|id, language| *id == 5 && language == "ru")
            .times(1)
            .returning(|_, _| Ok(()));
        store.expect_create().never();

        let service = CustomerService::new(Arc::new(store));
        let updated = service.register_contact(42, "ru").await.unwrap();
        assert_eq!(updated.id, 5);
        assert_eq!(updated.language, "ru");
    }

    #[tokio::test]
    async fn lookup_failure_aborts_registration() {
        let mut store = MockCustomerStore::new();
        store
            .expect_find_by_telegram_id()
            .returning(|_| Err(anyhow::anyhow!("connection refused")));
        store.expect_create().never();
        store.expect_update_language().never();

        let service = CustomerService::new(Arc::new(store));
        let err = service.register_contact(42, "en").await.unwrap_err();
        assert!(matches!(err, BotError::Persistence(_)));
    }

    /// A store whose lookup stalls past the profile bound.
    #[derive(Default)]
    struct StalledStore {
        lookups: AtomicUsize,
        writes: AtomicUsize,
    }

    #[async_trait]
    impl CustomerStore for StalledStore {
        async fn find_by_telegram_id(&self, _telegram_id: i64) -> anyhow::Result<Option<Customer>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(3)).await;
            Ok(None)
        }

        async fn create(&self, telegram_id: i64, language: &str) -> anyhow::Result<Customer> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(customer(1, telegram_id, language))
        }

        async fn update_language(&self, _id: i64, _language: &str) -> anyhow::Result<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_lookup_is_abandoned_without_retry() {
        let store = Arc::new(StalledStore::default());
        let service = CustomerService::new(store.clone());

        let err = service.register_contact(42, "en").await.unwrap_err();
        assert!(matches!(err, BotError::Timeout(_)));
        assert_eq!(store.lookups.load(Ordering::SeqCst), 1);
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }
}
