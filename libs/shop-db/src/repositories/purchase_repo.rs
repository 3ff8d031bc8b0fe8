use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::models::{NewPurchase, PurchaseInvoice, PurchaseStatus};

#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: PgPool,
}

impl PurchaseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, purchase: &NewPurchase) -> Result<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO purchases (customer_id, month, amount, currency, invoice_type, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, CURRENT_TIMESTAMP)
            RETURNING id
            "#,
        )
        .bind(purchase.customer_id)
        .bind(purchase.month)
        .bind(purchase.amount)
        .bind(&purchase.currency)
        .bind(purchase.invoice_type.as_str())
        .bind(PurchaseStatus::New.as_str())
        .fetch_one(&self.pool)
        .await
        .context("Failed to create purchase")?;

        Ok(id)
    }

    /// Stores the provider invoice and moves the purchase to `Pending` in one statement.
    /// Only a purchase still in `New` is touched.
    pub async fn attach_invoice(&self, id: i64, invoice: &PurchaseInvoice) -> Result<()> {
        let result = sqlx::query(
            "UPDATE purchases SET invoice_id = $1, invoice_url = $2, status = $3 WHERE id = $4 AND status = $5",
        )
        .bind(&invoice.invoice_id)
        .bind(&invoice.invoice_url)
        .bind(PurchaseStatus::Pending.as_str())
        .bind(id)
        .bind(PurchaseStatus::New.as_str())
        .execute(&self.pool)
        .await
        .context("Failed to attach invoice to purchase")?;

        if result.rows_affected() == 0 {
            return Err(anyhow::anyhow!("Purchase {} is missing or no longer new", id));
        }
        Ok(())
    }
}
