//! # Stock Repository
//!
//! Database operations for stock lines.
//!
//! ## Receipt Merging
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Stock Receipt Flow                                │
//! │                                                                         │
//! │  receive("M", "Red", qty=10, cost=50.00)                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN TRANSACTION                                                      │
//! │       ├── SELECT existing line (if any)                                │
//! │       ├── merge_stock_receipt() ← weighted-average unit cost           │
//! │       └── INSERT … ON CONFLICT(size, color) DO UPDATE                  │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Two receipts for the same line always land as one merged line.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use stockbook_core::ledger::merge_stock_receipt;
use stockbook_core::{Money, StockItem};

/// Repository for stock line database operations.
#[derive(Debug, Clone)]
pub struct StockRepository {
    pool: SqlitePool,
}

impl StockRepository {
    /// Creates a new StockRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StockRepository { pool }
    }

    /// Lists all stock lines, ordered by size then color.
    pub async fn list(&self) -> DbResult<Vec<StockItem>> {
        let items = sqlx::query_as::<_, StockItem>(
            r#"
            SELECT size, color, quantity, cost_per_unit_cents, total_cost_cents
            FROM stock
            ORDER BY size, color
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Gets a single stock line by its (size, color) key.
    pub async fn get(&self, size: &str, color: &str) -> DbResult<Option<StockItem>> {
        let item = sqlx::query_as::<_, StockItem>(
            r#"
            SELECT size, color, quantity, cost_per_unit_cents, total_cost_cents
            FROM stock
            WHERE size = ?1 AND color = ?2
            "#,
        )
        .bind(size)
        .bind(color)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Lines at or below the given quantity threshold, for the dashboard.
    pub async fn low_stock(&self, threshold: i64) -> DbResult<Vec<StockItem>> {
        let items = sqlx::query_as::<_, StockItem>(
            r#"
            SELECT size, color, quantity, cost_per_unit_cents, total_cost_cents
            FROM stock
            WHERE quantity <= ?1
            ORDER BY quantity, size, color
            "#,
        )
        .bind(threshold)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Receives stock: merges the incoming quantity and cost into the line,
    /// creating it when it doesn't exist yet.
    ///
    /// The read-merge-write runs in a transaction so concurrent receipts for
    /// the same line can't lose an update.
    pub async fn receive(
        &self,
        size: &str,
        color: &str,
        quantity: i64,
        total_cost: Money,
    ) -> DbResult<StockItem> {
        debug!(size, color, quantity, "Receiving stock");

        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, StockItem>(
            r#"
            SELECT size, color, quantity, cost_per_unit_cents, total_cost_cents
            FROM stock
            WHERE size = ?1 AND color = ?2
            "#,
        )
        .bind(size)
        .bind(color)
        .fetch_optional(&mut *tx)
        .await?;

        let merged = merge_stock_receipt(existing.as_ref(), size, color, quantity, total_cost);

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
        .bind(&merged.size)
        .bind(&merged.color)
        .bind(merged.quantity)
        .bind(merged.cost_per_unit_cents)
        .bind(merged.total_cost_cents)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(merged)
    }

    /// Overwrites a stock line's figures (the edit page). Errors with
    /// NotFound when the line doesn't exist.
    pub async fn update_line(&self, item: &StockItem) -> DbResult<()> {
        debug!(size = %item.size, color = %item.color, "Updating stock line");

        let result = sqlx::query(
            r#"
            UPDATE stock
            SET quantity = ?3, cost_per_unit_cents = ?4, total_cost_cents = ?5
            WHERE size = ?1 AND color = ?2
            "#,
        )
        .bind(&item.size)
        .bind(&item.color)
        .bind(item.quantity)
        .bind(item.cost_per_unit_cents)
        .bind(item.total_cost_cents)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(
                "Stock line",
                format!("{} {}", item.size, item.color),
            ));
        }

        Ok(())
    }

    /// Deletes a stock line. Sale history referencing the line is kept; the
    /// sale rows carry their own size/color snapshot.
    pub async fn delete(&self, size: &str, color: &str) -> DbResult<()> {
        debug!(size, color, "Deleting stock line");

        let result = sqlx::query("DELETE FROM stock WHERE size = ?1 AND color = ?2")
            .bind(size)
            .bind(color)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Stock line", format!("{size} {color}")));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use stockbook_core::Money;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_receive_creates_then_merges() {
        let db = test_db().await;
        let repo = db.stock();

        let first = repo
            .receive("M", "Red", 10, Money::from_cents(5000))
            .await
            .unwrap();
        assert_eq!(first.quantity, 10);
        assert_eq!(first.cost_per_unit_cents, 500);

        let second = repo
            .receive("M", "Red", 10, Money::from_cents(7000))
            .await
            .unwrap();
        assert_eq!(second.quantity, 20);
        assert_eq!(second.cost_per_unit_cents, 600);

        // Still a single line
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_and_delete() {
        let db = test_db().await;
        let repo = db.stock();

        repo.receive("S", "Blue", 3, Money::from_cents(900))
            .await
            .unwrap();

        let line = repo.get("S", "Blue").await.unwrap().unwrap();
        assert_eq!(line.quantity, 3);

        repo.delete("S", "Blue").await.unwrap();
        assert!(repo.get("S", "Blue").await.unwrap().is_none());
        assert!(repo.delete("S", "Blue").await.is_err());
    }

    #[tokio::test]
    async fn test_update_line_missing_is_not_found() {
        let db = test_db().await;
        let repo = db.stock();

        let ghost = stockbook_core::StockItem {
            size: "XL".to_string(),
            color: "Green".to_string(),
            quantity: 1,
            cost_per_unit_cents: 100,
            total_cost_cents: 100,
        };
        assert!(repo.update_line(&ghost).await.is_err());
    }

    #[tokio::test]
    async fn test_low_stock_filter() {
        let db = test_db().await;
        let repo = db.stock();

        repo.receive("M", "Red", 2, Money::from_cents(200))
            .await
            .unwrap();
        repo.receive("L", "Blue", 50, Money::from_cents(5000))
            .await
            .unwrap();

        let low = repo.low_stock(5).await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].size, "M");
    }
}
