use anyhow::{Context, Result};
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::models::Customer;

#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_customer(row: &PgRow) -> Result<Customer> {
        Ok(Customer {
            id: row.try_get("id")?,
            telegram_id: row.try_get("telegram_id")?,
            language: row.try_get("language")?,
            expire_at: row.try_get("expire_at")?,
            subscription_link: row.try_get("subscription_link")?,
            created_at: row.try_get("created_at")?,
        })
    }

    pub async fn find_by_telegram_id(&self, telegram_id: i64) -> Result<Option<Customer>> {
        let row = sqlx::query("SELECT * FROM customers WHERE telegram_id = $1")
            .bind(telegram_id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch customer by Telegram ID")?;
        row.as_ref().map(Self::row_to_customer).transpose()
    }

    /// Inserts the customer, or returns the existing row when another request created it first.
    pub async fn create(&self, telegram_id: i64, language: &str) -> Result<Customer> {
        let row = sqlx::query(
            r#"
            INSERT INTO customers (telegram_id, language, created_at)
            VALUES ($1, $2, CURRENT_TIMESTAMP)
            ON CONFLICT (telegram_id) DO UPDATE SET language = EXCLUDED.language
            RETURNING *
            "#,
        )
        .bind(telegram_id)
        .bind(language)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create customer")?;
        Self::row_to_customer(&row)
    }

    pub async fn update_language(&self, id: i64, language: &str) -> Result<()> {
        sqlx::query("UPDATE customers SET language = $1 WHERE id = $2")
            .bind(language)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update customer language")?;
        Ok(())
    }
}
