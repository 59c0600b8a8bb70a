//! # Pricing Resolver
//!
//! Picks the per-piece price for a cart line.
//!
//! ## All-Units Wholesale
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Indomie Goreng: unit Rp 3.500, wholesale Rp 3.000 from 10 pcs          │
//! │                                                                         │
//! │  qty 9  ──► 9 × 3.500 = Rp 31.500                                      │
//! │  qty 10 ──► 10 × 3.000 = Rp 30.000   (every piece re-priced,           │
//! │                                       not just the tenth)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::money::Money;
use crate::types::{Product, WholesaleTier};

/// Resolves the unit price for `quantity` pieces of `product`.
///
/// `quantity` is the quantity the line will hold after the pending change.
///
/// ## Example
/// ```rust
/// use kasir_core::pricing::resolve_unit_price;
/// # use kasir_core::{Money, Product, WholesaleTier};
/// # use chrono::Utc;
/// # let product = Product {
/// #     id: "p1".into(), name: "Indomie Goreng".into(), barcode: "8888001234567".into(),
/// #     category_id: None, unit_price: Money::from_rupiah(3500),
/// #     purchase_price: Money::from_rupiah(2800),
/// #     wholesale: WholesaleTier::Tier { price: Money::from_rupiah(3000), threshold: 10 },
/// #     stock_quantity: 100, bundle_size: None, created_at: Utc::now(), updated_at: Utc::now(),
/// # };
///
/// assert_eq!(resolve_unit_price(&product, 9).rupiah(), 3500);
/// assert_eq!(resolve_unit_price(&product, 10).rupiah(), 3000);
/// ```
pub fn resolve_unit_price(product: &Product, quantity: i64) -> Money {
    resolve_for_tier(product.unit_price, product.wholesale, quantity)
}

/// Same rule as [`resolve_unit_price`], over a frozen price snapshot.
pub fn resolve_for_tier(unit_price: Money, tier: WholesaleTier, quantity: i64) -> Money {
    match tier {
        WholesaleTier::Tier { price, threshold } if quantity >= threshold => price,
        _ => unit_price,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
