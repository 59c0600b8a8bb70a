//! # Restock Purchase Repository
//!
//! Money spent buying stock from suppliers. These are expense records only;
//! receiving the goods into stock goes through
//! [`ProductRepository::restock`](crate::ProductRepository::restock).

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use kasir_core::validation::{validate_note, validate_restock_amount};
use kasir_core::{Money, RestockPurchase};

#[derive(Debug, sqlx::FromRow)]
struct RestockRow {
    id: String,
    date: DateTime<Utc>,
    amount: i64,
    note: String,
}

impl From<RestockRow> for RestockPurchase {
    fn from(row: RestockRow) -> Self {
        RestockPurchase {
            id: row.id,
            date: row.date,
            amount: Money::from_rupiah(row.amount),
            note: row.note,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RestockRepository {
    pool: SqlitePool,
}

impl RestockRepository {
    pub fn new(pool: SqlitePool) -> Self {
        RestockRepository { pool }
    }

    pub async fn insert(
        &self,
        date: DateTime<Utc>,
        amount: Money,
        note: &str,
    ) -> DbResult<RestockPurchase> {
        validate_restock_amount(amount)?;
        validate_note(note)?;

        let purchase = RestockPurchase {
            id: Uuid::new_v4().to_string(),
            date,
            amount,
            note: note.trim().to_string(),
        };

        debug!(id = %purchase.id, amount = %purchase.amount, "Recording restock purchase");

        sqlx::query(
            r#"
            INSERT INTO restock_purchases (id, date, amount, note, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&purchase.id)
        .bind(purchase.date)
        .bind(purchase.amount.rupiah())
        .bind(&purchase.note)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(purchase)
    }

    /// Newest first.
    pub async fn list(&self) -> DbResult<Vec<RestockPurchase>> {
        let rows: Vec<RestockRow> = sqlx::query_as(
            "SELECT id, date, amount, note FROM restock_purchases ORDER BY date DESC, id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(RestockPurchase::from).collect())
    }

    /// Purchases dated within `[start, end]`, oldest first.
    pub async fn list_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<RestockPurchase>> {
        let rows: Vec<RestockRow> = sqlx::query_as(
            r#"
            SELECT id, date, amount, note
            FROM restock_purchases
            WHERE date >= ?1 AND date <= ?2
            ORDER BY date, id
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        // TEXT comparison above narrows the scan; the typed check is exact
        Ok(rows
            .into_iter()
            .map(RestockPurchase::from)
            .filter(|purchase| start <= purchase.date && purchase.date <= end)
            .collect())
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting restock purchase");

        let result = sqlx::query("DELETE FROM restock_purchases WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Restock purchase", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::TimeZone;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, d, 9, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_restock_purchases() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.restocks();

        let first = repo
            .insert(day(1), Money::from_rupiah(250_000), "Agen Indomie")
            .await
            .unwrap();
        repo.insert(day(5), Money::from_rupiah(120_000), "")
            .await
            .unwrap();
        repo.insert(day(20), Money::from_rupiah(75_000), "Aqua 2 dus")
            .await
            .unwrap();

        let all = repo.list().await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].date, day(20));

        let early = repo.list_between(day(1), day(10)).await.unwrap();
        assert_eq!(early.len(), 2);
        assert_eq!(early[0].id, first.id);

        repo.delete(&first.id).await.unwrap();
        assert_eq!(repo.list().await.unwrap().len(), 2);
        assert!(matches!(
            repo.delete(&first.id).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_non_positive_amount_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db
            .restocks()
            .insert(day(1), Money::zero(), "")
            .await
            .is_err());
    }
}
