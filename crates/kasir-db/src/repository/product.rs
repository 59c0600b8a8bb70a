//! # Product Repository
//!
//! Database operations for products and their bundle sizes.
//!
//! ## Key Operations
//! - Barcode lookup for the scanner
//! - Name/barcode search for the cashier and admin lists
//! - CRUD with validation of the admin form
//! - Stock adjustment (restock in pieces or bundles)
//! - Current cost table for profit reports
//!
//! ## Row Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  products p  LEFT JOIN  product_units u ON u.product_id = p.id         │
//! │                                                                         │
//! │  wholesale_price, wholesale_threshold ──► WholesaleTier::from_parts    │
//! │  u.bundle_size (NULL when not configured) ──► Product::bundle_size     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use kasir_core::stock::pieces_from_bundles;
use kasir_core::validation::{
    validate_barcode, validate_bundle_size, validate_price, validate_product_name,
    validate_quantity, validate_search_query, validate_stock_quantity, validate_wholesale_pair,
};
use kasir_core::{CoreError, Money, Product, SoldLineItem, ValidationError, WholesaleTier};

/// Expands to a product SELECT with the given trailing clause.
macro_rules! select_products {
    ($tail:literal) => {
        concat!(
            r#"
            SELECT
                p.id,
                p.name,
                p.barcode,
                p.category_id,
                p.unit_price,
                p.purchase_price,
                p.wholesale_price,
                p.wholesale_threshold,
                p.stock_quantity,
                u.bundle_size,
                p.created_at,
                p.updated_at
            FROM products p
            LEFT JOIN product_units u ON u.product_id = p.id
            "#,
            $tail
        )
    };
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: String,
    name: String,
    barcode: String,
    category_id: Option<String>,
    unit_price: i64,
    purchase_price: i64,
    wholesale_price: Option<i64>,
    wholesale_threshold: Option<i64>,
    stock_quantity: i64,
    bundle_size: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            barcode: row.barcode,
            category_id: row.category_id,
            unit_price: Money::from_rupiah(row.unit_price),
            purchase_price: Money::from_rupiah(row.purchase_price),
            wholesale: WholesaleTier::from_parts(
                row.wholesale_price.map(Money::from_rupiah),
                row.wholesale_threshold,
            ),
            stock_quantity: row.stock_quantity,
            bundle_size: row.bundle_size,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// =============================================================================
// Product Form Input
// =============================================================================

/// Admin form input for creating or editing a product.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub barcode: String,
    pub category_id: Option<String>,
    pub unit_price: Money,
    pub purchase_price: Money,
    pub wholesale_price: Option<Money>,
    pub wholesale_threshold: Option<i64>,
    pub stock_quantity: i64,
    /// `None` removes any configured bundle size.
    pub bundle_size: Option<i64>,
}

impl ProductDraft {
    /// Checks the form and returns the wholesale tier it describes.
    ///
    /// A purchase price above the unit price is accepted
    /// (see [`Product::has_loss_warning`]).
    pub fn validate(&self) -> Result<WholesaleTier, ValidationError> {
        validate_product_name(&self.name)?;
        validate_barcode(&self.barcode)?;
        validate_price("unit price", self.unit_price)?;
        validate_price("purchase price", self.purchase_price)?;
        validate_stock_quantity(self.stock_quantity)?;
        if let Some(size) = self.bundle_size {
            validate_bundle_size(size)?;
        }
        validate_wholesale_pair(self.wholesale_price, self.wholesale_threshold)
    }
}

// =============================================================================
// Current Costs
// =============================================================================

/// Per-piece purchase prices as they are *now*, for profit reports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurrentCosts {
    by_id: HashMap<String, Money>,
    by_name: HashMap<String, Money>,
}

impl CurrentCosts {
    /// Cost of the item's product: by id first, then by name for lines
    /// whose product reference was cleared.
    pub fn lookup(&self, item: &SoldLineItem) -> Option<Money> {
        item.product_id
            .as_deref()
            .and_then(|id| self.by_id.get(id))
            .or_else(|| self.by_name.get(&item.product_name))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let scanned = repo.get_by_barcode("8998866200301").await?;
/// let results = repo.search("indomie", 20).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// All products, sorted by name.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(select_products!("ORDER BY p.name, p.id"))
            .fetch_all(&self.pool)
            .await?;

        debug!(count = rows.len(), "Listed products");
        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Searches name and barcode by substring.
    ///
    /// An empty query returns the first `limit` products by name.
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<Product>> {
        let query = validate_search_query(query)?;

        debug!(query = %query, limit = %limit, "Searching products");

        let pattern = format!("%{}%", escape_like(&query));
        let rows: Vec<ProductRow> = sqlx::query_as(select_products!(
            r#"
            WHERE p.name LIKE ?1 ESCAPE '\' OR p.barcode LIKE ?1 ESCAPE '\'
            ORDER BY p.name, p.id
            LIMIT ?2
            "#
        ))
        .bind(pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Search returned products");
        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Products filed under `category_id`.
    pub async fn list_by_category(&self, category_id: &str) -> DbResult<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(select_products!(
            "WHERE p.category_id = ?1 ORDER BY p.name, p.id"
        ))
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let row: Option<ProductRow> = sqlx::query_as(select_products!("WHERE p.id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Product::from))
    }

    /// Scanner lookup. A miss is a [`CoreError::ProductNotFound`].
    pub async fn get_by_barcode(&self, barcode: &str) -> DbResult<Product> {
        let barcode = barcode.trim();
        debug!(barcode = %barcode, "Looking up barcode");

        let row: Option<ProductRow> = sqlx::query_as(select_products!("WHERE p.barcode = ?1"))
            .bind(barcode)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Product::from)
            .ok_or_else(|| CoreError::ProductNotFound(barcode.to_string()).into())
    }

    /// Inserts a product from a validated form.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The stored product
    /// * `Err(DbError::UniqueViolation)` - Barcode already exists
    /// * `Err(DbError::Core(Validation(..)))` - Form rejected
    pub async fn insert(&self, draft: &ProductDraft) -> DbResult<Product> {
        let wholesale = draft.validate()?;
        let (wholesale_price, wholesale_threshold) = wholesale.into_parts();
        let id = generate_product_id();
        let now = Utc::now();

        debug!(id = %id, barcode = %draft.barcode, "Inserting product");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, barcode, category_id,
                unit_price, purchase_price,
                wholesale_price, wholesale_threshold,
                stock_quantity, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4,
                ?5, ?6,
                ?7, ?8,
                ?9, ?10, ?10
            )
            "#,
        )
        .bind(&id)
        .bind(draft.name.trim())
        .bind(draft.barcode.trim())
        .bind(&draft.category_id)
        .bind(draft.unit_price.rupiah())
        .bind(draft.purchase_price.rupiah())
        .bind(wholesale_price.map(|price| price.rupiah()))
        .bind(wholesale_threshold)
        .bind(draft.stock_quantity)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| with_barcode(e.into(), &draft.barcode))?;

        write_bundle_size(&mut tx, &id, draft.bundle_size, now).await?;

        tx.commit().await?;

        Ok(Product {
            id,
            name: draft.name.trim().to_string(),
            barcode: draft.barcode.trim().to_string(),
            category_id: draft.category_id.clone(),
            unit_price: draft.unit_price,
            purchase_price: draft.purchase_price,
            wholesale,
            stock_quantity: draft.stock_quantity,
            bundle_size: draft.bundle_size,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replaces every editable field of product `id`.
    pub async fn update(&self, id: &str, draft: &ProductDraft) -> DbResult<Product> {
        let wholesale = draft.validate()?;
        let (wholesale_price, wholesale_threshold) = wholesale.into_parts();
        let now = Utc::now();

        debug!(id = %id, "Updating product");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                barcode = ?3,
                category_id = ?4,
                unit_price = ?5,
                purchase_price = ?6,
                wholesale_price = ?7,
                wholesale_threshold = ?8,
                stock_quantity = ?9,
                updated_at = ?10
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(draft.name.trim())
        .bind(draft.barcode.trim())
        .bind(&draft.category_id)
        .bind(draft.unit_price.rupiah())
        .bind(draft.purchase_price.rupiah())
        .bind(wholesale_price.map(|price| price.rupiah()))
        .bind(wholesale_threshold)
        .bind(draft.stock_quantity)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| with_barcode(e.into(), &draft.barcode))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        write_bundle_size(&mut tx, id, draft.bundle_size, now).await?;

        tx.commit().await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Deletes a product. Sold lines keep their name snapshot.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Adds `delta` pieces to stock (negative to remove) and returns the new
    /// stock. Stock never goes below zero or past `i64::MAX`.
    pub async fn adjust_stock(&self, id: &str, delta: i64) -> DbResult<i64> {
        debug!(id = %id, delta = %delta, "Adjusting stock");

        // SQLite turns an overflowing integer sum into REAL
        let updated: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE products
            SET
                stock_quantity = stock_quantity + ?2,
                updated_at = ?3
            WHERE id = ?1
              AND stock_quantity + ?2 >= 0
              AND (?2 <= 0 OR stock_quantity <= ?4 - ?2)
            RETURNING stock_quantity
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(Utc::now())
        .bind(i64::MAX)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(stock) = updated {
            return Ok(stock);
        }

        match self.get_by_id(id).await? {
            Some(_) if delta > 0 => Err(ValidationError::OutOfRange {
                field: "stock".to_string(),
                min: 0,
                max: i64::MAX,
            }
            .into()),
            Some(product) => Err(CoreError::InsufficientStock {
                product: product.name,
                available: product.stock_quantity,
                requested: delta.saturating_neg(),
            }
            .into()),
            None => Err(DbError::not_found("Product", id)),
        }
    }

    /// Receives stock entered as whole bundles plus loose pieces.
    ///
    /// Without a configured bundle size only `loose_pieces` count.
    pub async fn restock(&self, id: &str, bundles: i64, loose_pieces: i64) -> DbResult<i64> {
        let bundle_size = self.get_bundle_size(id).await?;
        let pieces = pieces_from_bundles(bundles, loose_pieces, bundle_size)?;
        validate_quantity(pieces)?;

        debug!(id = %id, bundles, loose_pieces, pieces, "Restocking product");
        self.adjust_stock(id, pieces).await
    }

    pub async fn get_bundle_size(&self, id: &str) -> DbResult<Option<i64>> {
        let size: Option<i64> =
            sqlx::query_scalar("SELECT bundle_size FROM product_units WHERE product_id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(size)
    }

    /// Sets (upserts) or clears the pieces-per-bundle of product `id`.
    pub async fn set_bundle_size(&self, id: &str, bundle_size: Option<i64>) -> DbResult<()> {
        if let Some(size) = bundle_size {
            validate_bundle_size(size)?;
        }

        debug!(id = %id, bundle_size = ?bundle_size, "Setting bundle size");

        let mut conn = self.pool.acquire().await?;
        write_bundle_size(&mut conn, id, bundle_size, Utc::now()).await
    }

    /// Purchase prices of every product, keyed by id and by name.
    ///
    /// For duplicate names the oldest product wins.
    pub async fn current_costs(&self) -> DbResult<CurrentCosts> {
        let rows: Vec<(String, String, i64)> = sqlx::query_as(
            "SELECT id, name, purchase_price FROM products ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut costs = CurrentCosts::default();
        for (id, name, purchase_price) in rows {
            let cost = Money::from_rupiah(purchase_price);
            costs.by_id.insert(id, cost);
            costs.by_name.entry(name).or_insert(cost);
        }

        debug!(count = costs.len(), "Loaded current costs");
        Ok(costs)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

async fn write_bundle_size(
    conn: &mut SqliteConnection,
    product_id: &str,
    bundle_size: Option<i64>,
    now: DateTime<Utc>,
) -> DbResult<()> {
    let result = match bundle_size {
        Some(size) => {
            sqlx::query(
                r#"
                INSERT INTO product_units (product_id, bundle_size, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(product_id) DO UPDATE SET
                    bundle_size = excluded.bundle_size,
                    updated_at = excluded.updated_at
                "#,
            )
            .bind(product_id)
            .bind(size)
            .bind(now)
            .execute(&mut *conn)
            .await
        }
        None => {
            sqlx::query("DELETE FROM product_units WHERE product_id = ?1")
                .bind(product_id)
                .execute(&mut *conn)
                .await
        }
    };

    result.map(|_| ()).map_err(|e| match DbError::from(e) {
        DbError::ForeignKeyViolation { .. } => DbError::not_found("Product", product_id),
        other => other,
    })
}

fn with_barcode(err: DbError, barcode: &str) -> DbError {
    match err {
        DbError::UniqueViolation { field, .. } => DbError::duplicate(field, barcode.trim()),
        other => other,
    }
}

fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
