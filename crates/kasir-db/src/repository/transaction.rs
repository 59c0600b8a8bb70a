//! # Transaction Repository
//!
//! Persists settled sales and serves sold line items to reporting.
//!
//! ## Atomic Commit
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │    INSERT transactions (total, tendered, change)                        │
//! │    for each cart line:                                                  │
//! │      UPDATE products SET stock = stock - qty                            │
//! │        WHERE id = ? AND stock >= qty     ── 0 rows? ──► ROLLBACK        │
//! │        RETURNING purchase_price                       InsufficientStock │
//! │      INSERT transaction_items (name, qty, price, cost snapshot)         │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Either the whole sale is visible or none of it is.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cart's stock snapshot may be stale by the time the cashier pays; the
//! conditional decrement is the authoritative check.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use kasir_core::{CommitRequest, CoreError, Money, SoldLineItem, TransactionRecord};

#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: String,
    total: i64,
    amount_tendered: i64,
    change_amount: i64,
    created_at: DateTime<Utc>,
}

impl From<TransactionRow> for TransactionRecord {
    fn from(row: TransactionRow) -> Self {
        TransactionRecord {
            id: row.id,
            total: Money::from_rupiah(row.total),
            amount_tendered: Money::from_rupiah(row.amount_tendered),
            change: Money::from_rupiah(row.change_amount),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SoldLineRow {
    transaction_id: String,
    product_id: Option<String>,
    product_name: String,
    quantity: i64,
    unit_price_at_sale: i64,
    created_at: DateTime<Utc>,
}

impl From<SoldLineRow> for SoldLineItem {
    fn from(row: SoldLineRow) -> Self {
        SoldLineItem {
            transaction_id: row.transaction_id,
            product_id: row.product_id,
            product_name: row.product_name,
            quantity_sold: row.quantity,
            unit_price_at_sale: Money::from_rupiah(row.unit_price_at_sale),
            timestamp: row.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Records a sale and decrements stock for every line, atomically.
    ///
    /// ## Returns
    /// * `Ok(TransactionRecord)` - Sale committed
    /// * `Err(DbError::Core(InsufficientStock))` - Stock ran out since the
    ///   cart was built; nothing was written
    /// * `Err(DbError::Core(ProductNotFound))` - A product was deleted since
    ///   the cart was built; nothing was written
    pub async fn commit(&self, request: &CommitRequest) -> DbResult<TransactionRecord> {
        if request.lines.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        let record = TransactionRecord {
            id: generate_transaction_id(),
            total: request.total,
            amount_tendered: request.amount_tendered,
            change: request.change,
            created_at: Utc::now(),
        };

        debug!(
            id = %record.id,
            lines = request.lines.len(),
            total = %record.total,
            "Committing transaction"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO transactions (id, total, amount_tendered, change_amount, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&record.id)
        .bind(record.total.rupiah())
        .bind(record.amount_tendered.rupiah())
        .bind(record.change.rupiah())
        .bind(record.created_at)
        .execute(&mut *tx)
        .await?;

        for line in &request.lines {
            let purchase_price: Option<i64> = sqlx::query_scalar(
                r#"
                UPDATE products
                SET
                    stock_quantity = stock_quantity - ?2,
                    updated_at = ?3
                WHERE id = ?1 AND stock_quantity >= ?2
                RETURNING purchase_price
                "#,
            )
            .bind(&line.product_id)
            .bind(line.quantity)
            .bind(record.created_at)
            .fetch_optional(&mut *tx)
            .await?;

            let Some(purchase_price) = purchase_price else {
                let available: Option<i64> =
                    sqlx::query_scalar("SELECT stock_quantity FROM products WHERE id = ?1")
                        .bind(&line.product_id)
                        .fetch_optional(&mut *tx)
                        .await?;
                tx.rollback().await?;

                let err = match available {
                    Some(available) => CoreError::InsufficientStock {
                        product: line.name.clone(),
                        available,
                        requested: line.quantity,
                    },
                    None => CoreError::ProductNotFound(line.product_id.clone()),
                };
                warn!(id = %record.id, error = %err, "Transaction rejected");
                return Err(err.into());
            };

            sqlx::query(
                r#"
                INSERT INTO transaction_items (
                    id, transaction_id, product_id, product_name,
                    quantity, unit_price_at_sale, purchase_price_at_sale,
                    created_at
                ) VALUES (
                    ?1, ?2, ?3, ?4,
                    ?5, ?6, ?7,
                    ?8
                )
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&record.id)
            .bind(&line.product_id)
            .bind(&line.name)
            .bind(line.quantity)
            .bind(line.applied_unit_price.rupiah())
            .bind(purchase_price)
            .bind(record.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(id = %record.id, total = %record.total, "Transaction committed");
        Ok(record)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<TransactionRecord>> {
        let row: Option<TransactionRow> = sqlx::query_as(
            r#"
            SELECT id, total, amount_tendered, change_amount, created_at
            FROM transactions
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(TransactionRecord::from))
    }

    /// Most recent sales first.
    pub async fn recent(&self, limit: u32) -> DbResult<Vec<TransactionRecord>> {
        let rows: Vec<TransactionRow> = sqlx::query_as(
            r#"
            SELECT id, total, amount_tendered, change_amount, created_at
            FROM transactions
            ORDER BY created_at DESC, id
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(TransactionRecord::from).collect())
    }

    /// Lines of one sale, for a receipt reprint.
    pub async fn items(&self, transaction_id: &str) -> DbResult<Vec<SoldLineItem>> {
        let rows: Vec<SoldLineRow> = sqlx::query_as(
            r#"
            SELECT transaction_id, product_id, product_name,
                   quantity, unit_price_at_sale, created_at
            FROM transaction_items
            WHERE transaction_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(transaction_id)
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() && self.get_by_id(transaction_id).await?.is_none() {
            return Err(DbError::not_found("Transaction", transaction_id));
        }

        Ok(rows.into_iter().map(SoldLineItem::from).collect())
    }

    /// Every line sold within `[start, end]`.
    pub async fn sold_line_items(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<SoldLineItem>> {
        let rows: Vec<SoldLineRow> = sqlx::query_as(
            r#"
            SELECT transaction_id, product_id, product_name,
                   quantity, unit_price_at_sale, created_at
            FROM transaction_items
            WHERE created_at >= ?1 AND created_at <= ?2
            ORDER BY created_at, rowid
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Loaded sold line items");
        Ok(rows.into_iter().map(SoldLineItem::from).collect())
    }
}

pub fn generate_transaction_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::product::tests::draft;
    use crate::{Database, DbConfig};
    use kasir_core::{Checkout, Product, WholesaleTier};

    async fn setup() -> (Database, Product, Product) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let mut indomie = draft("Indomie Goreng", "8998866200301", 3500, 20);
        indomie.purchase_price = Money::from_rupiah(2800);
        indomie.wholesale_price = Some(Money::from_rupiah(3000));
        indomie.wholesale_threshold = Some(10);
        let indomie = db.products().insert(&indomie).await.unwrap();

        let aqua = db
            .products()
            .insert(&draft("Aqua 600ml", "8886008101053", 3000, 5))
            .await
            .unwrap();

        (db, indomie, aqua)
    }

    fn request_for(lines: &[(&Product, i64)], tendered: i64) -> CommitRequest {
        let mut checkout = Checkout::new();
        for (product, qty) in lines {
            for _ in 0..*qty {
                checkout.add_or_increment(product).unwrap();
            }
        }
        checkout
            .prepare_commit(Some(Money::from_rupiah(tendered)))
            .unwrap()
    }

    async fn stock_of(db: &Database, id: &str) -> i64 {
        db.products()
            .get_by_id(id)
            .await
            .unwrap()
            .unwrap()
            .stock_quantity
    }

    #[tokio::test]
    async fn test_commit_writes_sale_and_decrements_stock() {
        let (db, indomie, aqua) = setup().await;
        assert!(matches!(indomie.wholesale, WholesaleTier::Tier { .. }));

        let request = request_for(&[(&indomie, 10), (&aqua, 2)], 50_000);
        assert_eq!(request.total.rupiah(), 36_000);

        let record = db.transactions().commit(&request).await.unwrap();
        assert_eq!(record.change.rupiah(), 14_000);

        assert_eq!(stock_of(&db, &indomie.id).await, 10);
        assert_eq!(stock_of(&db, &aqua.id).await, 3);

        let stored = db.transactions().get_by_id(&record.id).await.unwrap().unwrap();
        assert_eq!(stored, record);

        let items = db.transactions().items(&record.id).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].product_name, "Indomie Goreng");
        assert_eq!(items[0].quantity_sold, 10);
        assert_eq!(items[0].unit_price_at_sale.rupiah(), 3000);
        assert_eq!(items[1].revenue().rupiah(), 6000);
    }

    #[tokio::test]
    async fn test_stale_stock_rolls_back_everything() {
        let (db, indomie, aqua) = setup().await;
        let request = request_for(&[(&indomie, 3), (&aqua, 5)], 50_000);

        // Another till sold some Aqua after this cart was built
        db.products().adjust_stock(&aqua.id, -2).await.unwrap();

        let err = db.transactions().commit(&request).await.unwrap_err();
        assert_eq!(
            err.as_core(),
            Some(&CoreError::InsufficientStock {
                product: "Aqua 600ml".to_string(),
                available: 3,
                requested: 5,
            })
        );

        // Indomie was decremented first inside the transaction; rolled back
        assert_eq!(stock_of(&db, &indomie.id).await, 20);
        assert_eq!(stock_of(&db, &aqua.id).await, 3);
        assert!(db.transactions().recent(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deleted_product_rejects_commit() {
        let (db, indomie, aqua) = setup().await;
        let request = request_for(&[(&indomie, 1), (&aqua, 1)], 10_000);

        db.products().delete(&aqua.id).await.unwrap();

        let err = db.transactions().commit(&request).await.unwrap_err();
        assert_eq!(err.as_core(), Some(&CoreError::ProductNotFound(aqua.id.clone())));
        assert_eq!(stock_of(&db, &indomie.id).await, 20);
    }

    #[tokio::test]
    async fn test_empty_request_rejected() {
        let (db, _, _) = setup().await;
        let request = CommitRequest {
            lines: vec![],
            total: Money::zero(),
            amount_tendered: Money::zero(),
            change: Money::zero(),
        };
        assert_eq!(
            db.transactions().commit(&request).await.unwrap_err().as_core(),
            Some(&CoreError::EmptyCart)
        );
    }

    #[tokio::test]
    async fn test_sold_lines_survive_product_deletion() {
        let (db, indomie, _) = setup().await;
        let record = db
            .transactions()
            .commit(&request_for(&[(&indomie, 2)], 10_000))
            .await
            .unwrap();

        db.products().delete(&indomie.id).await.unwrap();

        let items = db.transactions().items(&record.id).await.unwrap();
        assert_eq!(items[0].product_id, None);
        assert_eq!(items[0].product_name, "Indomie Goreng");
    }

    #[tokio::test]
    async fn test_sold_line_items_window() {
        let (db, indomie, aqua) = setup().await;
        let before = Utc::now();
        db.transactions()
            .commit(&request_for(&[(&indomie, 2)], 10_000))
            .await
            .unwrap();
        db.transactions()
            .commit(&request_for(&[(&aqua, 1)], 5_000))
            .await
            .unwrap();
        let after = Utc::now();

        let items = db.transactions().sold_line_items(before, after).await.unwrap();
        assert_eq!(items.len(), 2);

        let none = db
            .transactions()
            .sold_line_items(after + chrono::Duration::seconds(1), after + chrono::Duration::hours(1))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_items_of_unknown_transaction() {
        let (db, _, _) = setup().await;
        assert!(matches!(
            db.transactions().items("no-such-tx").await,
            Err(DbError::NotFound { .. })
        ));
    }
}
