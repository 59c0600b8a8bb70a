//! # Database Migrations
//!
//! Embedded SQL migrations for Kasir POS.
//!
//! ## How Migrations Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Migration Process                                  │
//! │                                                                         │
//! │  App Startup                                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Check _sqlx_migrations table                                          │
//! │       │                                                                 │
//! │       ├── Table doesn't exist? Create it                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Compare embedded migrations vs applied                                │
//! │       │                                                                 │
//! │       ├── 001_initial_schema.sql ✓ (already applied)                  │
//! │       └── 002_next_change.sql    ⬜ (NEW - needs to run)               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Run pending migrations in order                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Record in _sqlx_migrations                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  App continues startup                                                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Adding New Migrations
//!
//! 1. Create a new file in `migrations/sqlite/` with the next sequence number
//! 2. Name format: `NNN_description.sql` (e.g., `002_add_supplier_table.sql`)
//! 3. Write idempotent SQL (use `IF NOT EXISTS` where possible)
//! 4. **NEVER** modify existing migrations - always add new ones

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

/// Embedded migrations from the `migrations/sqlite` directory.
///
/// `sqlx::migrate!()` embeds every SQL file of the directory at compile
/// time.
///
/// ```text
/// migrations/sqlite/
/// └── 001_initial_schema.sql  # products, categories, units, sales, restocks
/// ```
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Runs all pending database migrations.
///
/// Idempotent; each migration runs in its own transaction, in filename
/// order.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    info!("Checking for pending migrations");

    MIGRATOR.run(pool).await?;

    info!("All migrations applied successfully");
    Ok(())
}

/// `(embedded, applied)` migration counts, for diagnostics.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();

    // The bookkeeping table is missing until the first run
    let applied: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(pool)
            .await
            .unwrap_or(0);

    Ok((total, usize::try_from(applied).unwrap_or(0)))
}
