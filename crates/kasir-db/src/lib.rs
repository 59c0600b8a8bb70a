//! # kasir-db: Store Layer for Kasir POS
//!
//! SQLite persistence for the pure rules in `kasir-core`, via sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kasir POS Data Flow                              │
//! │                                                                         │
//! │  Cashier scans a barcode / pays                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     kasir-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ ProductRepo   │    │ 001_initial_ │  │   │
//! │  │   │ SqlitePool    │◄───│ Transaction   │    │   schema.sql │  │   │
//! │  │   │ AppConfig     │    │ ReportRepo …  │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   checkout::commit_checkout ── one SQLite transaction per sale  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (./kasir.db)                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Environment configuration
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//! - [`checkout`] - Cart-to-sale commit
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kasir_db::{AppConfig, Database};
//! use kasir_db::checkout::commit_checkout;
//!
//! let config = AppConfig::from_env()?;
//! let db = Database::new(config.db_config()).await?;
//!
//! let product = db.products().get_by_barcode("8998866200301").await?;
//! checkout.add_or_increment(&product)?;
//! let sale = commit_checkout(&db, &mut checkout, Some(Money::from_rupiah(50_000))).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{AppConfig, ConfigError};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::category::CategoryRepository;
pub use repository::product::{CurrentCosts, ProductDraft, ProductRepository};
pub use repository::report::ReportRepository;
pub use repository::restock::RestockRepository;
pub use repository::transaction::TransactionRepository;
