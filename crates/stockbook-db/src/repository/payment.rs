//! # Payment Repository
//!
//! Database operations for customer payments. Every payment dual-writes a
//! ledger row in the same transaction so the account statement and the
//! payment list can never disagree.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use stockbook_core::{LedgerKind, Payment};

/// Input for recording a payment.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub customer_name: String,
    pub customer_phone: String,
    pub amount_cents: i64,
    pub description: Option<String>,
}

/// Repository for payment database operations.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: SqlitePool,
}

impl PaymentRepository {
    /// Creates a new PaymentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PaymentRepository { pool }
    }

    /// Lists all payments, most recent first.
    pub async fn list(&self) -> DbResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(
            r#"
            SELECT payment_id, customer_name, customer_phone, amount_cents, description, date
            FROM payment
            ORDER BY date DESC, payment_id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    /// Lists a customer's payments, most recent first.
    pub async fn list_for_customer(&self, name: &str, phone: &str) -> DbResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(
            r#"
            SELECT payment_id, customer_name, customer_phone, amount_cents, description, date
            FROM payment
            WHERE customer_name = ?1 AND customer_phone = ?2
            ORDER BY date DESC, payment_id DESC
            "#,
        )
        .bind(name)
        .bind(phone)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    /// Gets a payment by ID.
    pub async fn get(&self, payment_id: i64) -> DbResult<Option<Payment>> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            SELECT payment_id, customer_name, customer_phone, amount_cents, description, date
            FROM payment
            WHERE payment_id = ?1
            "#,
        )
        .bind(payment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(payment)
    }

    /// Records a payment and its ledger row in one transaction.
    pub async fn record(&self, input: &NewPayment) -> DbResult<Payment> {
        debug!(
            customer = %input.customer_name,
            amount_cents = input.amount_cents,
            "Recording payment"
        );

        let mut tx = self.pool.begin().await?;

        let exists: Option<i64> = sqlx::query_scalar(
            "SELECT 1 FROM customer WHERE name = ?1 AND phone = ?2",
        )
        .bind(&input.customer_name)
        .bind(&input.customer_phone)
        .fetch_optional(&mut *tx)
        .await?;
        if exists.is_none() {
            return Err(DbError::not_found(
                "Customer",
                format!("{} ({})", input.customer_name, input.customer_phone),
            ));
        }

        let date = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO payment (customer_name, customer_phone, amount_cents, description, date)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&input.customer_name)
        .bind(&input.customer_phone)
        .bind(input.amount_cents)
        .bind(&input.description)
        .bind(date)
        .execute(&mut *tx)
        .await?;

        let payment_id = result.last_insert_rowid();
        let note = input
            .description
            .clone()
            .unwrap_or_else(|| "Payment received".to_string());

        sqlx::query(
            r#"
            INSERT INTO ledger (
                customer_name, customer_phone, amount_cents, kind,
                related_sale_id, related_payment_id, date, note
            ) VALUES (?1, ?2, ?3, ?4, NULL, ?5, ?6, ?7)
            "#,
        )
        .bind(&input.customer_name)
        .bind(&input.customer_phone)
        .bind(input.amount_cents)
        .bind(LedgerKind::Payment)
        .bind(payment_id)
        .bind(date)
        .bind(&note)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Payment {
            payment_id,
            customer_name: input.customer_name.clone(),
            customer_phone: input.customer_phone.clone(),
            amount_cents: input.amount_cents,
            description: input.description.clone(),
            date,
        })
    }

    /// Deletes a payment and its ledger rows in one transaction.
    pub async fn delete(&self, payment_id: i64) -> DbResult<()> {
        debug!(payment_id, "Deleting payment");

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM ledger WHERE related_payment_id = ?1")
            .bind(payment_id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM payment WHERE payment_id = ?1")
            .bind(payment_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Payment", payment_id.to_string()));
        }

        tx.commit().await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use stockbook_core::Customer;

    async fn seeded_db() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.customers()
            .insert(&Customer {
                name: "Asha".to_string(),
                phone: "0301".to_string(),
                company: None,
            })
            .await
            .unwrap();
        db
    }

    fn new_payment(amount_cents: i64, description: Option<&str>) -> NewPayment {
        NewPayment {
            customer_name: "Asha".to_string(),
            customer_phone: "0301".to_string(),
            amount_cents,
            description: description.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_record_payment_dual_writes_ledger() {
        let db = seeded_db().await;

        let payment = db
            .payments()
            .record(&new_payment(3000, Some("March instalment")))
            .await
            .unwrap();
        assert_eq!(payment.amount_cents, 3000);

        let ledger = db.ledger().list_for_customer("Asha", "0301").await.unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].kind, LedgerKind::Payment);
        assert_eq!(ledger[0].related_payment_id, Some(payment.payment_id));
        assert_eq!(ledger[0].note.as_deref(), Some("March instalment"));
    }

    #[tokio::test]
    async fn test_record_payment_unknown_customer_rejected() {
        let db = seeded_db().await;

        let mut input = new_payment(3000, None);
        input.customer_name = "Ghost".to_string();
        assert!(matches!(
            db.payments().record(&input).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_payment_removes_ledger_row() {
        let db = seeded_db().await;

        let payment = db.payments().record(&new_payment(3000, None)).await.unwrap();
        db.payments().delete(payment.payment_id).await.unwrap();

        assert!(db.payments().list().await.unwrap().is_empty());
        assert!(db
            .ledger()
            .list_for_customer("Asha", "0301")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_payment_is_not_found() {
        let db = seeded_db().await;
        assert!(db.payments().delete(42).await.is_err());
    }
}
