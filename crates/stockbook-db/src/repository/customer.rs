//! # Customer Repository
//!
//! Database operations for customers. Customers are keyed by (name, phone);
//! there is no surrogate ID, matching how the shop actually identifies
//! people.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use stockbook_core::Customer;

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Lists all customers ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT name, phone, company
            FROM customer
            ORDER BY name, phone
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Gets a customer by their (name, phone) key.
    pub async fn get(&self, name: &str, phone: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT name, phone, company
            FROM customer
            WHERE name = ?1 AND phone = ?2
            "#,
        )
        .bind(name)
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Case-insensitive substring search over name, phone and company.
    pub async fn search(&self, query: &str) -> DbResult<Vec<Customer>> {
        let pattern = format!("%{query}%");
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT name, phone, company
            FROM customer
            WHERE name LIKE ?1 OR phone LIKE ?1 OR company LIKE ?1
            ORDER BY name, phone
            "#,
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Inserts a new customer. Duplicate (name, phone) pairs are rejected.
    pub async fn insert(&self, customer: &Customer) -> DbResult<()> {
        debug!(name = %customer.name, phone = %customer.phone, "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customer (name, phone, company)
            VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.company)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates a customer's company field. Name and phone are the identity
    /// and cannot be edited; the shop deletes and re-adds instead.
    pub async fn update_company(
        &self,
        name: &str,
        phone: &str,
        company: Option<&str>,
    ) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE customer SET company = ?3
            WHERE name = ?1 AND phone = ?2
            "#,
        )
        .bind(name)
        .bind(phone)
        .bind(company)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", format!("{name} ({phone})")));
        }

        Ok(())
    }

    /// Deletes a customer. Fails with a foreign key violation while sale,
    /// payment or ledger rows still reference them.
    pub async fn delete(&self, name: &str, phone: &str) -> DbResult<()> {
        debug!(name, phone, "Deleting customer");

        let result = sqlx::query("DELETE FROM customer WHERE name = ?1 AND phone = ?2")
            .bind(name)
            .bind(phone)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", format!("{name} ({phone})")));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use stockbook_core::Customer;

    fn customer(name: &str, phone: &str, company: Option<&str>) -> Customer {
        Customer {
            name: name.to_string(),
            phone: phone.to_string(),
            company: company.map(String::from),
        }
    }

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_get_delete() {
        let db = test_db().await;
        let repo = db.customers();

        repo.insert(&customer("Asha", "0301", Some("Khan Traders")))
            .await
            .unwrap();

        let found = repo.get("Asha", "0301").await.unwrap().unwrap();
        assert_eq!(found.company.as_deref(), Some("Khan Traders"));

        repo.delete("Asha", "0301").await.unwrap();
        assert!(repo.get("Asha", "0301").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_key_rejected() {
        let db = test_db().await;
        let repo = db.customers();

        repo.insert(&customer("Asha", "0301", None)).await.unwrap();
        let err = repo.insert(&customer("Asha", "0301", None)).await;
        assert!(matches!(err, Err(DbError::UniqueViolation { .. })));

        // Same name, different phone is a different customer
        repo.insert(&customer("Asha", "0399", None)).await.unwrap();
        assert_eq!(repo.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_search_matches_all_fields() {
        let db = test_db().await;
        let repo = db.customers();

        repo.insert(&customer("Asha", "0301", Some("Khan Traders")))
            .await
            .unwrap();
        repo.insert(&customer("Bilal", "0302", None)).await.unwrap();

        assert_eq!(repo.search("khan").await.unwrap().len(), 1);
        assert_eq!(repo.search("030").await.unwrap().len(), 2);
        assert_eq!(repo.search("zzz").await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_update_company() {
        let db = test_db().await;
        let repo = db.customers();

        repo.insert(&customer("Asha", "0301", None)).await.unwrap();
        repo.update_company("Asha", "0301", Some("New Co"))
            .await
            .unwrap();

        let found = repo.get("Asha", "0301").await.unwrap().unwrap();
        assert_eq!(found.company.as_deref(), Some("New Co"));

        assert!(repo.update_company("Ghost", "0000", None).await.is_err());
    }
}
