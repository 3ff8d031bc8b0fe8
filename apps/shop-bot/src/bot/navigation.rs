use std::sync::Arc;

use chrono::Utc;
use shop_db::models::{Customer, InvoiceType};
use tokio::time::{timeout, timeout_at, Instant};

use crate::bot::screens::{self, Screen};
use crate::callback::Action;
use crate::config::{PAYMENT_TIMEOUT, PROFILE_TIMEOUT};
use crate::error::{BotError, PurchaseError};
use crate::services::purchase_service::PurchaseService;
use crate::services::store::CustomerStore;
use crate::services::translation_service::Translator;

/// Who pressed a button and in which language to answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub chat_id: i64,
    pub language: String,
}

/// Maps a decoded action to the screen that replaces the current one.
#[derive(Clone)]
pub struct Navigator {
    translator: Arc<Translator>,
    customers: Arc<dyn CustomerStore>,
    purchases: PurchaseService,
}

impl Navigator {
    pub fn new(
        translator: Arc<Translator>,
        customers: Arc<dyn CustomerStore>,
        purchases: PurchaseService,
    ) -> Self {
        Self {
            translator,
            customers,
            purchases,
        }
    }

    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    pub async fn navigate(&self, event: &InboundEvent, action: Action) -> Result<Screen, BotError> {
        let t = self.translator.as_ref();
        let lang = event.language.as_str();

        match action {
            Action::Start => Ok(screens::start_screen(t, lang)),
            Action::Buy => Ok(screens::buy_screen(
                t,
                lang,
                self.purchases.pricing(),
                self.purchases.currency(),
            )),
            Action::Sell { month } => Ok(screens::sell_screen(t, lang, month)),
            Action::Crypto { month } => self.checkout(event, month, InvoiceType::Crypto).await,
            Action::Card { month } => self.checkout(event, month, InvoiceType::Card).await,
            Action::Connect => self.connect(event).await,
        }
    }

    async fn checkout(
        &self,
        event: &InboundEvent,
        month: i32,
        invoice_type: InvoiceType,
    ) -> Result<Screen, BotError> {
        let deadline = Instant::now() + PAYMENT_TIMEOUT;

        let customer = timeout_at(deadline, self.find_customer(event.chat_id))
            .await
            .map_err(|_| BotError::Timeout("checkout customer lookup"))??;
        let checkout = self
            .purchases
            .initiate_purchase(&customer, month, invoice_type, deadline)
            .await
            .map_err(|e| match e {
                PurchaseError::TimedOut(stage) => BotError::Timeout(stage),
                other => BotError::Purchase(other),
            })?;

        Ok(screens::checkout_screen(
            &self.translator,
            &event.language,
            month,
            &checkout.payable_url,
        ))
    }

    async fn connect(&self, event: &InboundEvent) -> Result<Screen, BotError> {
        let customer = timeout(PROFILE_TIMEOUT, self.find_customer(event.chat_id))
            .await
            .map_err(|_| BotError::Timeout("customer lookup"))??;

        Ok(screens::connect_screen(
            &self.translator,
            &event.language,
            &customer,
            Utc::now(),
        ))
    }

    async fn find_customer(&self, chat_id: i64) -> Result<Customer, BotError> {
        self.customers
            .find_by_telegram_id(chat_id)
            .await
            .map_err(BotError::Persistence)?
            .ok_or(BotError::NotFound(chat_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::Pricing;
    use crate::services::payment::{Invoice, MockPaymentProvider, PaymentProviders};
    use crate::services::store::{MockCustomerStore, MockPurchaseStore, PurchaseStore};
    use async_trait::async_trait;
    use chrono::Duration;
    use mockall::predicate::eq;
    use reqwest::Url;
    use shop_db::models::{NewPurchase, PurchaseInvoice};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use teloxide::types::InlineKeyboardButtonKind;

    fn customer(expire_in: Option<Duration>) -> Customer {
        Customer {
            id: 3,
            telegram_id: 1001,
            language: "en".to_string(),
            expire_at: expire_in.map(|d| Utc::now() + d),
            subscription_link: Some("https://sub.example/abc".to_string()),
            created_at: Utc::now(),
        }
    }

    fn customers_with(found: Option<Customer>) -> MockCustomerStore {
        let mut store = MockCustomerStore::new();
        store
            .expect_find_by_telegram_id()
            .with(eq(1001))
            .returning(move |_| Ok(found.clone()));
        store
    }

    fn idle_provider() -> MockPaymentProvider {
        let mut provider = MockPaymentProvider::new();
        provider.expect_create_invoice().never();
        provider
    }

    fn navigator(
        customers: MockCustomerStore,
        purchases: MockPurchaseStore,
        crypto: MockPaymentProvider,
    ) -> Navigator {
        navigator_with(Arc::new(customers), Arc::new(purchases), crypto)
    }

    fn navigator_with(
        customers: Arc<dyn CustomerStore>,
        purchases: Arc<dyn PurchaseStore>,
        crypto: MockPaymentProvider,
    ) -> Navigator {
        let service = PurchaseService::new(
            purchases,
            PaymentProviders::new(Arc::new(crypto), Arc::new(idle_provider())),
            Pricing::new(200),
            "RUB".to_string(),
        );
        Navigator::new(
            Arc::new(Translator::embedded("en").unwrap()),
            customers,
            service,
        )
    }

    /// Customer lookup that answers only after `delay`.
    struct SlowCustomers {
        delay: std::time::Duration,
        lookups: AtomicUsize,
    }

    #[async_trait]
    impl CustomerStore for SlowCustomers {
        async fn find_by_telegram_id(&self, telegram_id: i64) -> anyhow::Result<Option<Customer>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            let mut found = customer(None);
            found.telegram_id = telegram_id;
            Ok(Some(found))
        }

        async fn create(&self, _telegram_id: i64, _language: &str) -> anyhow::Result<Customer> {
            Err(anyhow::anyhow!("not expected"))
        }

        async fn update_language(&self, _id: i64, _language: &str) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("not expected"))
        }
    }

    /// Purchase writes where recording the invoice outlasts the payment bound.
    struct StalledAttach {
        attached: AtomicUsize,
    }

    #[async_trait]
    impl PurchaseStore for StalledAttach {
        async fn create(&self, _purchase: &NewPurchase) -> anyhow::Result<i64> {
            Ok(42)
        }

        async fn attach_invoice(&self, _id: i64, _invoice: &PurchaseInvoice) -> anyhow::Result<()> {
            tokio::time::sleep(std::time::Duration::from_secs(11)).await;
            self.attached.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn event() -> InboundEvent {
        InboundEvent {
            chat_id: 1001,
            language: "en".to_string(),
        }
    }

    #[tokio::test]
    async fn menu_screens_touch_no_store() {
        let mut customers = MockCustomerStore::new();
        customers.expect_find_by_telegram_id().never();
        let mut purchases = MockPurchaseStore::new();
        purchases.expect_create().never();
        let nav = navigator(customers, purchases, idle_provider());

        let start = nav.navigate(&event(), Action::Start).await.unwrap();
        assert!(start.text().is_some());

        let buy = nav.navigate(&event(), Action::Buy).await.unwrap();
        assert!(buy.text().unwrap().contains("1200 RUB"));

        let sell = nav
            .navigate(&event(), Action::parse("sell?month=3").unwrap())
            .await
            .unwrap();
        assert!(sell.text().is_none());
    }

    #[tokio::test]
    async fn crypto_checkout_renders_pay_button() {
        let mut purchases = MockPurchaseStore::new();
        purchases
            .expect_create()
            .withf(|p| p.amount == 200 && p.month == 1 && p.invoice_type == InvoiceType::Crypto)
            .times(1)
            .returning(|_| Ok(17));
        purchases
            .expect_attach_invoice()
            .withf(|id, invoice| {
                *id == 17 && invoice.invoice_url == "https://t.me/CryptoBot?start=IV17"
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let mut crypto = MockPaymentProvider::new();
        crypto
            .expect_create_invoice()
            .withf(|r| r.purchase_id == 17 && r.customer_id == 1001)
            .returning(|_| {
                Ok(Invoice {
                    invoice_id: "17".to_string(),
                    payable_url: Url::parse("https://t.me/CryptoBot?start=IV17").unwrap(),
                })
            });

        let nav = navigator(customers_with(Some(customer(None))), purchases, crypto);
        let screen = nav
            .navigate(&event(), Action::parse("crypto?month=1").unwrap())
            .await
            .unwrap();

        let row = &screen.keyboard().inline_keyboard[0];
        match &row[0].kind {
            InlineKeyboardButtonKind::Url(url) => {
                assert_eq!(url.as_str(), "https://t.me/CryptoBot?start=IV17")
            }
            other => panic!("expected url button, got {:?}", other),
        }
        match &row[1].kind {
            InlineKeyboardButtonKind::CallbackData(data) => assert_eq!(data, "sell?month=1"),
            other => panic!("expected callback button, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn checkout_for_unknown_customer_creates_nothing() {
        let mut purchases = MockPurchaseStore::new();
        purchases.expect_create().never();

        let nav = navigator(customers_with(None), purchases, idle_provider());
        let err = nav
            .navigate(&event(), Action::Card { month: 3 })
            .await
            .unwrap_err();
        assert!(matches!(err, BotError::NotFound(1001)));
    }

    #[tokio::test]
    async fn connect_reads_customer_subscription() {
        let nav = navigator(
            customers_with(Some(customer(Some(Duration::days(10))))),
            MockPurchaseStore::new(),
            idle_provider(),
        );
        let screen = nav.navigate(&event(), Action::Connect).await.unwrap();
        assert!(screen.text().unwrap().contains("https://sub.example/abc"));
    }

    #[tokio::test]
    async fn connect_with_expired_subscription() {
        let nav = navigator(
            customers_with(Some(customer(Some(-Duration::days(1))))),
            MockPurchaseStore::new(),
            idle_provider(),
        );
        let screen = nav.navigate(&event(), Action::Connect).await.unwrap();
        assert_eq!(
            screen.text(),
            Some(nav.translator().get_text("en", "no_subscription"))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn checkout_gives_up_on_slow_customer_lookup() {
        let customers = Arc::new(SlowCustomers {
            delay: std::time::Duration::from_secs(11),
            lookups: AtomicUsize::new(0),
        });
        let mut purchases = MockPurchaseStore::new();
        purchases.expect_create().never();

        let nav = navigator_with(customers.clone(), Arc::new(purchases), idle_provider());
        let err = nav
            .navigate(&event(), Action::Crypto { month: 1 })
            .await
            .unwrap_err();

        assert!(matches!(err, BotError::Timeout(_)));
        assert_eq!(customers.lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn checkout_reports_invoice_that_could_not_be_recorded_in_time() {
        let purchases = Arc::new(StalledAttach {
            attached: AtomicUsize::new(0),
        });
        let mut crypto = MockPaymentProvider::new();
        crypto.expect_create_invoice().times(1).returning(|_| {
            Ok(Invoice {
                invoice_id: "INV-42".to_string(),
                payable_url: Url::parse("https://t.me/CryptoBot?start=INV42").unwrap(),
            })
        });

        let nav = navigator_with(
            Arc::new(customers_with(Some(customer(None)))),
            purchases.clone(),
            crypto,
        );
        let err = nav
            .navigate(&event(), Action::Crypto { month: 1 })
            .await
            .unwrap_err();

        match err {
            BotError::Purchase(PurchaseError::InvoiceNotRecorded {
                purchase_id,
                invoice_id,
                ..
            }) => {
                assert_eq!(purchase_id, 42);
                assert_eq!(invoice_id, "INV-42");
            }
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(purchases.attached.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn connect_gives_up_after_profile_bound() {
        let customers = Arc::new(SlowCustomers {
            delay: std::time::Duration::from_secs(3),
            lookups: AtomicUsize::new(0),
        });

        let nav = navigator_with(
            customers.clone(),
            Arc::new(MockPurchaseStore::new()),
            idle_provider(),
        );
        let err = nav.navigate(&event(), Action::Connect).await.unwrap_err();

        assert!(matches!(err, BotError::Timeout(_)));
        assert_eq!(customers.lookups.load(Ordering::SeqCst), 1);
    }
}
