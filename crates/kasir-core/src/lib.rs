//! # kasir-core: Pure Business Logic for Kasir POS
//!
//! Pricing, cart and checkout rules, stock-unit conversion and report
//! aggregation for a small Indonesian retail shop. Nothing in this crate
//! touches the database, the network or the clock.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kasir POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Cashier / Admin UI                           │   │
//! │  │    Scan ──► Cart ──► Tender ──► Receipt      Reports, Restock   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kasir-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌────────┐ ┌─────────┐  │   │
//! │  │   │ pricing │ │  cart   │ │ checkout │ │ stock  │ │ report  │  │   │
//! │  │   │wholesale│ │CartLine │ │Open/     │ │bundles │ │aggregate│  │   │
//! │  │   │  tier   │ │  Cart   │ │ Settled  │ │ + pcs  │ │ windows │  │   │
//! │  │   └─────────┘ └─────────┘ └──────────┘ └────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    kasir-db (Store Layer)                       │   │
//! │  │        SQLite repositories, migrations, atomic checkout         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Integer Rupiah amounts
//! - [`types`] - Product, category, sold line items, restock purchases
//! - [`pricing`] - Unit vs. wholesale price resolution
//! - [`cart`] - Cart lines and the cart aggregate
//! - [`checkout`] - Totals, payment checks, Open → Settled
//! - [`stock`] - Pieces ↔ bundles
//! - [`report`] - Period aggregation
//! - [`validation`] - Admin input rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use kasir_core::{Checkout, Money};
//! # use kasir_core::{Product, WholesaleTier};
//! # use chrono::Utc;
//! # let indomie = Product {
//! #     id: "p1".into(), name: "Indomie Goreng".into(), barcode: "8998866200301".into(),
//! #     category_id: None, unit_price: Money::from_rupiah(3500),
//! #     purchase_price: Money::from_rupiah(2800),
//! #     wholesale: WholesaleTier::Tier { price: Money::from_rupiah(3000), threshold: 10 },
//! #     stock_quantity: 40, bundle_size: Some(5), created_at: Utc::now(), updated_at: Utc::now(),
//! # };
//!
//! let mut checkout = Checkout::new();
//! for _ in 0..10 {
//!     checkout.add_or_increment(&indomie).unwrap();
//! }
//!
//! // Ten pieces reach the wholesale tier: every piece is Rp 3.000
//! let request = checkout.prepare_commit(Some(Money::from_rupiah(50_000))).unwrap();
//! assert_eq!(request.total.to_string(), "Rp 30.000");
//! assert_eq!(request.change.rupiah(), 20_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod error;
pub mod money;
pub mod pricing;
pub mod report;
pub mod stock;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine};
pub use checkout::{Checkout, CheckoutState, CheckoutTotals, CommitRequest};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use report::{PeriodReport, ReportPeriod, ReportWindow};
pub use stock::StockDisplay;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct products in a single cart.
pub const MAX_CART_LINES: usize = 100;
