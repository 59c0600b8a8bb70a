//! # Repository Module
//!
//! Database repository implementations for Kasir POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Caller                                                                 │
//! │       │  db.products().get_by_barcode("8998866200301")                 │
//! │       ▼                                                                 │
//! │  ProductRepository ─┐                                                   │
//! │  CategoryRepository │   one struct per table group, each holding a     │
//! │  TransactionRepo    ├── clone of the SqlitePool; rows are mapped to    │
//! │  RestockRepository  │   kasir-core types before they leave the module  │
//! │  ReportRepository ──┘                                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Products, stock, bundle sizes, costs
//! - [`CategoryRepository`](category::CategoryRepository) - Product categories
//! - [`TransactionRepository`](transaction::TransactionRepository) - Atomic sale commit, sold lines
//! - [`RestockRepository`](restock::RestockRepository) - Supplier spending
//! - [`ReportRepository`](report::ReportRepository) - Period reports

pub mod category;
pub mod product;
pub mod report;
pub mod restock;
pub mod transaction;
