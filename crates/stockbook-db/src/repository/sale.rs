//! # Sale Repository
//!
//! Database operations for sales, refunds and deletions.
//!
//! ## Compound Writes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Sale Write Paths                                    │
//! │                                                                         │
//! │  record_sale(input)                                                    │
//! │     BEGIN                                                               │
//! │     ├── SELECT customer, stock line                                    │
//! │     ├── apply_sale() ← totals, profit, stock decrement                 │
//! │     ├── UPDATE stock                                                   │
//! │     ├── INSERT sale                                                    │
//! │     └── INSERT ledger (kind='sale')                                    │
//! │     COMMIT                                                              │
//! │                                                                         │
//! │  record_refund(sale_id)                                                │
//! │     BEGIN                                                               │
//! │     ├── SELECT original sale (reject refund-of-refund)                 │
//! │     ├── apply_refund() ← mirrored row, negated profit                  │
//! │     ├── UPSERT stock (restored quantity/cost)                          │
//! │     ├── INSERT sale (is_refund=1)                                      │
//! │     └── INSERT ledger (kind='refund')                                  │
//! │     COMMIT                                                              │
//! │                                                                         │
//! │  delete(sale_id)                                                       │
//! │     BEGIN                                                               │
//! │     ├── apply_delete() ← restore stock for non-refund rows             │
//! │     ├── DELETE ledger rows for the sale                                │
//! │     └── DELETE sale                                                    │
//! │     COMMIT                                                              │
//! │                                                                         │
//! │  Either every row lands or none do.                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;

use crate::error::{DbError, DbResult};
use stockbook_core::ledger::{apply_delete, apply_refund, apply_sale};
use stockbook_core::{LedgerKind, Money, Sale, SaleDraft, StockItem};

// =============================================================================
// Input / Output Types
// =============================================================================

/// Input for recording a sale.
#[derive(Debug, Clone)]
pub struct NewSale {
    pub customer_name: String,
    pub customer_phone: String,
    pub stock_size: String,
    pub stock_color: String,
    pub quantity: i64,
    pub rate_cents: i64,
}

/// A persisted sale plus the oversell warning flag.
#[derive(Debug, Clone)]
pub struct RecordedSale {
    pub sale: Sale,
    /// True when the sale drove the stock line below zero.
    pub negative_stock: bool,
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Lists all sale rows, most recent first.
    pub async fn list(&self) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT
                sale_id, customer_name, customer_phone,
                stock_size, stock_color, quantity,
                rate_cents, total_cents, cost_per_unit_cents, total_cost_cents,
                profit_cents, is_refund, refund_of, date
            FROM sale
            ORDER BY date DESC, sale_id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Lists a customer's sale rows, most recent first.
    pub async fn list_for_customer(&self, name: &str, phone: &str) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT
                sale_id, customer_name, customer_phone,
                stock_size, stock_color, quantity,
                rate_cents, total_cents, cost_per_unit_cents, total_cost_cents,
                profit_cents, is_refund, refund_of, date
            FROM sale
            WHERE customer_name = ?1 AND customer_phone = ?2
            ORDER BY date DESC, sale_id DESC
            "#,
        )
        .bind(name)
        .bind(phone)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Gets a sale by ID.
    pub async fn get(&self, sale_id: i64) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT
                sale_id, customer_name, customer_phone,
                stock_size, stock_color, quantity,
                rate_cents, total_cents, cost_per_unit_cents, total_cost_cents,
                profit_cents, is_refund, refund_of, date
            FROM sale
            WHERE sale_id = ?1
            "#,
        )
        .bind(sale_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Records a sale: computes totals and profit from the stock line's
    /// snapshot cost, decrements the stock, and appends the ledger row.
    /// All three writes commit together.
    pub async fn record_sale(&self, input: &NewSale) -> DbResult<RecordedSale> {
        debug!(
            customer = %input.customer_name,
            size = %input.stock_size,
            color = %input.stock_color,
            quantity = input.quantity,
            "Recording sale"
        );

        let mut tx = self.pool.begin().await?;

        let customer = sqlx::query_as::<_, stockbook_core::Customer>(
            "SELECT name, phone, company FROM customer WHERE name = ?1 AND phone = ?2",
        )
        .bind(&input.customer_name)
        .bind(&input.customer_phone)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            DbError::not_found(
                "Customer",
                format!("{} ({})", input.customer_name, input.customer_phone),
            )
        })?;

        let stock = fetch_stock(&mut tx, &input.stock_size, &input.stock_color)
            .await?
            .ok_or_else(|| {
                DbError::not_found(
                    "Stock line",
                    format!("{} {}", input.stock_size, input.stock_color),
                )
            })?;

        let outcome = apply_sale(
            &stock,
            &customer,
            input.quantity,
            Money::from_cents(input.rate_cents),
        )?;

        upsert_stock(&mut tx, &outcome.stock).await?;
        let sale = insert_sale_row(&mut tx, &outcome.sale).await?;

        let note = format!(
            "Sale of {} units at {} each",
            sale.quantity,
            sale.rate()
        );
        insert_ledger_row(&mut tx, &sale, LedgerKind::Sale, &note).await?;

        tx.commit().await?;

        Ok(RecordedSale {
            sale,
            negative_stock: outcome.negative_stock,
        })
    }

    /// Records a refund for an existing sale: a mirrored sale row with
    /// negated profit, restored stock, and a ledger row.
    ///
    /// If the stock line was deleted after the original sale, it is
    /// recreated from the refunded quantities.
    pub async fn record_refund(&self, sale_id: i64) -> DbResult<Sale> {
        debug!(sale_id, "Recording refund");

        let mut tx = self.pool.begin().await?;

        let original = fetch_sale(&mut tx, sale_id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", sale_id.to_string()))?;

        let stock = fetch_stock(&mut tx, &original.stock_size, &original.stock_color)
            .await?
            .unwrap_or_else(|| StockItem {
                size: original.stock_size.clone(),
                color: original.stock_color.clone(),
                quantity: 0,
                cost_per_unit_cents: 0,
                total_cost_cents: 0,
            });

        let outcome = apply_refund(&stock, &original)?;

        upsert_stock(&mut tx, &outcome.stock).await?;
        let refund = insert_sale_row(&mut tx, &outcome.refund).await?;

        let note = format!("Refund for sale #{sale_id}");
        insert_ledger_row(&mut tx, &refund, LedgerKind::Refund, &note).await?;

        tx.commit().await?;

        Ok(refund)
    }

    /// Deletes a sale row and its ledger entries.
    ///
    /// Deleting a non-refund sale restores the stock it consumed. Deleting
    /// a refund row leaves stock untouched and keeps the original sale.
    pub async fn delete(&self, sale_id: i64) -> DbResult<()> {
        debug!(sale_id, "Deleting sale");

        let mut tx = self.pool.begin().await?;

        let sale = fetch_sale(&mut tx, sale_id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", sale_id.to_string()))?;

        let stock = fetch_stock(&mut tx, &sale.stock_size, &sale.stock_color).await?;
        if let Some(restored) = apply_delete(stock.as_ref(), &sale) {
            upsert_stock(&mut tx, &restored).await?;
        }

        sqlx::query("DELETE FROM ledger WHERE related_sale_id = ?1")
            .bind(sale_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM sale WHERE sale_id = ?1")
            .bind(sale_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

async fn fetch_sale(tx: &mut Transaction<'_, Sqlite>, sale_id: i64) -> DbResult<Option<Sale>> {
    let sale = sqlx::query_as::<_, Sale>(
        r#"
        SELECT
            sale_id, customer_name, customer_phone,
            stock_size, stock_color, quantity,
            rate_cents, total_cents, cost_per_unit_cents, total_cost_cents,
            profit_cents, is_refund, refund_of, date
        FROM sale
        WHERE sale_id = ?1
        "#,
    )
    .bind(sale_id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(sale)
}

async fn fetch_stock(
    tx: &mut Transaction<'_, Sqlite>,
    size: &str,
    color: &str,
) -> DbResult<Option<StockItem>> {
    let item = sqlx::query_as::<_, StockItem>(
        r#"
        SELECT size, color, quantity, cost_per_unit_cents, total_cost_cents
        FROM stock
        WHERE size = ?1 AND color = ?2
        "#,
    )
    .bind(size)
    .bind(color)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(item)
}

async fn upsert_stock(tx: &mut Transaction<'_, Sqlite>, item: &StockItem) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO stock (size, color, quantity, cost_per_unit_cents, total_cost_cents)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT (size, color) DO UPDATE SET
            quantity = excluded.quantity,
            cost_per_unit_cents = excluded.cost_per_unit_cents,
            total_cost_cents = excluded.total_cost_cents
        "#,
    )
    .bind(&item.size)
    .bind(&item.color)
    .bind(item.quantity)
    .bind(item.cost_per_unit_cents)
    .bind(item.total_cost_cents)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Inserts a sale row from a draft, stamping the date and returning the
/// persisted row with its assigned ID.
async fn insert_sale_row(tx: &mut Transaction<'_, Sqlite>, draft: &SaleDraft) -> DbResult<Sale> {
    let date = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO sale (
            customer_name, customer_phone,
            stock_size, stock_color, quantity,
            rate_cents, total_cents, cost_per_unit_cents, total_cost_cents,
            profit_cents, is_refund, refund_of, date
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
        "#,
    )
    .bind(&draft.customer_name)
    .bind(&draft.customer_phone)
    .bind(&draft.stock_size)
    .bind(&draft.stock_color)
    .bind(draft.quantity)
    .bind(draft.rate_cents)
    .bind(draft.total_cents)
    .bind(draft.cost_per_unit_cents)
    .bind(draft.total_cost_cents)
    .bind(draft.profit_cents)
    .bind(draft.is_refund)
    .bind(draft.refund_of)
    .bind(date)
    .execute(&mut **tx)
    .await?;

    Ok(Sale {
        sale_id: result.last_insert_rowid(),
        customer_name: draft.customer_name.clone(),
        customer_phone: draft.customer_phone.clone(),
        stock_size: draft.stock_size.clone(),
        stock_color: draft.stock_color.clone(),
        quantity: draft.quantity,
        rate_cents: draft.rate_cents,
        total_cents: draft.total_cents,
        cost_per_unit_cents: draft.cost_per_unit_cents,
        total_cost_cents: draft.total_cost_cents,
        profit_cents: draft.profit_cents,
        is_refund: draft.is_refund,
        refund_of: draft.refund_of,
        date,
    })
}

async fn insert_ledger_row(
    tx: &mut Transaction<'_, Sqlite>,
    sale: &Sale,
    kind: LedgerKind,
    note: &str,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO ledger (
            customer_name, customer_phone, amount_cents, kind,
            related_sale_id, related_payment_id, date, note
        ) VALUES (?1, ?2, ?3, ?4, ?5, NULL, ?6, ?7)
        "#,
    )
    .bind(&sale.customer_name)
    .bind(&sale.customer_phone)
    .bind(sale.total_cents)
    .bind(kind)
    .bind(sale.sale_id)
    .bind(sale.date)
    .bind(note)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use stockbook_core::{CoreError, Customer};

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

        db.stock()
            .receive("M", "Red", 10, Money::from_cents(5000))
            .await
            .unwrap();

        db
    }

    fn new_sale(quantity: i64, rate_cents: i64) -> NewSale {
        NewSale {
            customer_name: "Asha".to_string(),
            customer_phone: "0301".to_string(),
            stock_size: "M".to_string(),
            stock_color: "Red".to_string(),
            quantity,
            rate_cents,
        }
    }

    #[tokio::test]
    async fn test_record_sale_updates_stock_and_ledger() {
        let db = seeded_db().await;

        let recorded = db.sales().record_sale(&new_sale(3, 800)).await.unwrap();
        assert_eq!(recorded.sale.total_cents, 2400);
        assert_eq!(recorded.sale.profit_cents, 900);
        assert!(!recorded.negative_stock);

        let stock = db.stock().get("M", "Red").await.unwrap().unwrap();
        assert_eq!(stock.quantity, 7);
        assert_eq!(stock.total_cost_cents, 3500);

        let ledger = db.ledger().list_for_customer("Asha", "0301").await.unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].kind, LedgerKind::Sale);
        assert_eq!(ledger[0].amount_cents, 2400);
        assert_eq!(ledger[0].related_sale_id, Some(recorded.sale.sale_id));
        assert_eq!(
            ledger[0].note.as_deref(),
            Some("Sale of 3 units at 8.00 each")
        );
    }

    #[tokio::test]
    async fn test_record_sale_oversell_warns_but_commits() {
        let db = seeded_db().await;

        let recorded = db.sales().record_sale(&new_sale(15, 800)).await.unwrap();
        assert!(recorded.negative_stock);

        let stock = db.stock().get("M", "Red").await.unwrap().unwrap();
        assert_eq!(stock.quantity, -5);
    }

    #[tokio::test]
    async fn test_record_sale_unknown_customer_rolls_back() {
        let db = seeded_db().await;

        let mut input = new_sale(3, 800);
        input.customer_name = "Ghost".to_string();
        assert!(db.sales().record_sale(&input).await.is_err());

        // Nothing written
        let stock = db.stock().get("M", "Red").await.unwrap().unwrap();
        assert_eq!(stock.quantity, 10);
        assert!(db.sales().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_refund_restores_stock_and_negates_profit() {
        let db = seeded_db().await;

        let recorded = db.sales().record_sale(&new_sale(3, 800)).await.unwrap();
        let refund = db
            .sales()
            .record_refund(recorded.sale.sale_id)
            .await
            .unwrap();

        assert!(refund.is_refund);
        assert_eq!(refund.profit_cents, -900);
        assert_eq!(refund.refund_of, Some(recorded.sale.sale_id));

        let stock = db.stock().get("M", "Red").await.unwrap().unwrap();
        assert_eq!(stock.quantity, 10);
        assert_eq!(stock.total_cost_cents, 5000);

        let ledger = db.ledger().list_for_customer("Asha", "0301").await.unwrap();
        assert_eq!(ledger.len(), 2);
    }

    #[tokio::test]
    async fn test_refund_of_refund_rejected() {
        let db = seeded_db().await;

        let recorded = db.sales().record_sale(&new_sale(3, 800)).await.unwrap();
        let refund = db
            .sales()
            .record_refund(recorded.sale.sale_id)
            .await
            .unwrap();

        let err = db.sales().record_refund(refund.sale_id).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::AlreadyRefund(_))));
    }

    #[tokio::test]
    async fn test_refund_recreates_deleted_stock_line() {
        let db = seeded_db().await;

        let recorded = db.sales().record_sale(&new_sale(3, 800)).await.unwrap();
        db.stock().delete("M", "Red").await.unwrap();

        db.sales()
            .record_refund(recorded.sale.sale_id)
            .await
            .unwrap();

        let stock = db.stock().get("M", "Red").await.unwrap().unwrap();
        assert_eq!(stock.quantity, 3);
        assert_eq!(stock.total_cost_cents, 1500);
    }

    #[tokio::test]
    async fn test_delete_sale_restores_stock_and_clears_ledger() {
        let db = seeded_db().await;

        let recorded = db.sales().record_sale(&new_sale(3, 800)).await.unwrap();
        db.sales().delete(recorded.sale.sale_id).await.unwrap();

        let stock = db.stock().get("M", "Red").await.unwrap().unwrap();
        assert_eq!(stock.quantity, 10);
        assert!(db.sales().list().await.unwrap().is_empty());
        assert!(db
            .ledger()
            .list_for_customer("Asha", "0301")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_delete_refund_row_keeps_stock() {
        let db = seeded_db().await;

        let recorded = db.sales().record_sale(&new_sale(3, 800)).await.unwrap();
        let refund = db
            .sales()
            .record_refund(recorded.sale.sale_id)
            .await
            .unwrap();

        db.sales().delete(refund.sale_id).await.unwrap();

        // Stock stays where the refund put it
        let stock = db.stock().get("M", "Red").await.unwrap().unwrap();
        assert_eq!(stock.quantity, 10);

        // The original sale survives
        assert_eq!(db.sales().list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_refunded_original_orphans_refund_row() {
        let db = seeded_db().await;

        let recorded = db.sales().record_sale(&new_sale(3, 800)).await.unwrap();
        let refund = db
            .sales()
            .record_refund(recorded.sale.sale_id)
            .await
            .unwrap();

        // Deleting the original must not trip over the refund's back-link
        db.sales().delete(recorded.sale.sale_id).await.unwrap();

        // The refund row survives with its link cleared
        let remaining = db.sales().list().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].sale_id, refund.sale_id);
        assert!(remaining[0].is_refund);
        assert_eq!(remaining[0].refund_of, None);

        // Refund restored the line to 10/5000, deleting the sale restores again
        let stock = db.stock().get("M", "Red").await.unwrap().unwrap();
        assert_eq!(stock.quantity, 13);
        assert_eq!(stock.total_cost_cents, 6500);
    }

    #[tokio::test]
    async fn test_delete_missing_sale_is_not_found() {
        let db = seeded_db().await;
        assert!(matches!(
            db.sales().delete(999).await,
            Err(DbError::NotFound { .. })
        ));
    }
}
