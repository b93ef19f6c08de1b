//! # Ledger Repository
//!
//! Reads for the customer account statement, plus advances. Sales, refunds
//! and payments write their own ledger rows inside their transactions; an
//! advance is the one entry kind that exists only in the ledger.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use stockbook_core::{LedgerEntry, LedgerKind};

/// Input for recording an advance.
#[derive(Debug, Clone)]
pub struct NewAdvance {
    pub customer_name: String,
    pub customer_phone: String,
    pub amount_cents: i64,
    pub note: Option<String>,
}

/// Repository for ledger reads and advances.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    /// A customer's full statement, oldest first.
    pub async fn list_for_customer(&self, name: &str, phone: &str) -> DbResult<Vec<LedgerEntry>> {
        let entries = sqlx::query_as::<_, LedgerEntry>(
            r#"
            SELECT
                id, customer_name, customer_phone, amount_cents, kind,
                related_sale_id, related_payment_id, date, note
            FROM ledger
            WHERE customer_name = ?1 AND customer_phone = ?2
            ORDER BY date, id
            "#,
        )
        .bind(name)
        .bind(phone)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// All ledger rows, oldest first. Used by the account report across
    /// every customer.
    pub async fn list(&self) -> DbResult<Vec<LedgerEntry>> {
        let entries = sqlx::query_as::<_, LedgerEntry>(
            r#"
            SELECT
                id, customer_name, customer_phone, amount_cents, kind,
                related_sale_id, related_payment_id, date, note
            FROM ledger
            ORDER BY date, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Records an advance: credit handed to a customer before any sale.
    /// Advances live only in the ledger; they raise the balance without
    /// touching the payment table.
    pub async fn record_advance(&self, input: &NewAdvance) -> DbResult<LedgerEntry> {
        debug!(
            customer = %input.customer_name,
            amount_cents = input.amount_cents,
            "Recording advance"
        );

        let exists: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM customer WHERE name = ?1 AND phone = ?2")
                .bind(&input.customer_name)
                .bind(&input.customer_phone)
                .fetch_optional(&self.pool)
                .await?;
        if exists.is_none() {
            return Err(DbError::not_found(
                "Customer",
                format!("{} ({})", input.customer_name, input.customer_phone),
            ));
        }

        let date = Utc::now();
        let note = input
            .note
            .clone()
            .unwrap_or_else(|| "Advance given".to_string());

        let result = sqlx::query(
            r#"
            INSERT INTO ledger (
                customer_name, customer_phone, amount_cents, kind,
                related_sale_id, related_payment_id, date, note
            ) VALUES (?1, ?2, ?3, ?4, NULL, NULL, ?5, ?6)
            "#,
        )
        .bind(&input.customer_name)
        .bind(&input.customer_phone)
        .bind(input.amount_cents)
        .bind(LedgerKind::Advance)
        .bind(date)
        .bind(&note)
        .execute(&self.pool)
        .await?;

        Ok(LedgerEntry {
            id: result.last_insert_rowid(),
            customer_name: input.customer_name.clone(),
            customer_phone: input.customer_phone.clone(),
            amount_cents: input.amount_cents,
            kind: LedgerKind::Advance,
            related_sale_id: None,
            related_payment_id: None,
            date,
            note: Some(note),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
