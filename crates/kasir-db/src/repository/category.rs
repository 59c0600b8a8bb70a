//! # Category Repository
//!
//! Product categories for the admin back office. Deleting a category keeps
//! its products; they just become uncategorised.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use kasir_core::validation::validate_category_name;
use kasir_core::Category;

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: String,
    name: String,
    created_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Categories sorted by name.
    pub async fn list(&self) -> DbResult<Vec<Category>> {
        let rows: Vec<CategoryRow> =
            sqlx::query_as("SELECT id, name, created_at FROM categories ORDER BY name")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Category>> {
        let row: Option<CategoryRow> =
            sqlx::query_as("SELECT id, name, created_at FROM categories WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(Category::from))
    }

    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - A category with that name exists
    pub async fn insert(&self, name: &str) -> DbResult<Category> {
        validate_category_name(name)?;
        let category = Category {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            created_at: Utc::now(),
        };

        debug!(id = %category.id, name = %category.name, "Inserting category");

        sqlx::query("INSERT INTO categories (id, name, created_at) VALUES (?1, ?2, ?3)")
            .bind(&category.id)
            .bind(&category.name)
            .bind(category.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| with_name(e.into(), &category.name))?;

        Ok(category)
    }

    pub async fn rename(&self, id: &str, name: &str) -> DbResult<()> {
        validate_category_name(name)?;
        let name = name.trim();

        debug!(id = %id, name = %name, "Renaming category");

        let result = sqlx::query("UPDATE categories SET name = ?2 WHERE id = ?1")
            .bind(id)
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| with_name(e.into(), name))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        Ok(())
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting category");

        let result = sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        Ok(())
    }
}

fn with_name(err: DbError, name: &str) -> DbError {
    match err {
        DbError::UniqueViolation { field, .. } => DbError::duplicate(field, name),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::product::tests::draft;
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_category_crud() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.categories();

        let snacks = repo.insert("Makanan Ringan").await.unwrap();
        repo.insert("Minuman").await.unwrap();

        let names: Vec<String> = repo.list().await.unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Makanan Ringan", "Minuman"]);

        repo.rename(&snacks.id, "Snack").await.unwrap();
        assert_eq!(
            repo.get_by_id(&snacks.id).await.unwrap().unwrap().name,
            "Snack"
        );

        repo.delete(&snacks.id).await.unwrap();
        assert!(repo.get_by_id(&snacks.id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete(&snacks.id).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_duplicate_and_empty_names() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.categories();
        repo.insert("Minuman").await.unwrap();

        assert!(matches!(
            repo.insert(" Minuman ").await,
            Err(DbError::UniqueViolation { ref value, .. }) if value == "Minuman"
        ));
        assert!(matches!(repo.insert("  ").await, Err(DbError::Core(_))));
    }

    #[tokio::test]
    async fn test_delete_uncategorises_products() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let drinks = db.categories().insert("Minuman").await.unwrap();

        let mut input = draft("Aqua 600ml", "8886008101053", 3000, 24);
        input.category_id = Some(drinks.id.clone());
        let aqua = db.products().insert(&input).await.unwrap();
        assert_eq!(db.products().list_by_category(&drinks.id).await.unwrap().len(), 1);

        db.categories().delete(&drinks.id).await.unwrap();

        let aqua = db.products().get_by_id(&aqua.id).await.unwrap().unwrap();
        assert_eq!(aqua.category_id, None);
    }

    #[tokio::test]
    async fn test_unknown_category_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut input = draft("Aqua 600ml", "8886008101053", 3000, 24);
        input.category_id = Some("no-such-category".to_string());

        assert!(matches!(
            db.products().insert(&input).await,
            Err(DbError::ForeignKeyViolation { .. })
        ));
    }
}
