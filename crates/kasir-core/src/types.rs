//! # Domain Types
//!
//! Core domain types used throughout Kasir POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │  SoldLineItem   │   │ RestockPurchase │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │ transaction_id  │   │  id (UUID)      │       │
//! │  │  barcode        │   │ product_name    │   │  date           │       │
//! │  │  unit_price     │   │ quantity_sold   │   │  amount         │       │
//! │  │  purchase_price │   │ unit_price_at…  │   │  note           │       │
//! │  │  wholesale ─────┼─┐ │ timestamp       │   └─────────────────┘       │
//! │  │  stock_quantity │ │ └─────────────────┘                              │
//! │  │  bundle_size    │ │ ┌─────────────────┐   ┌─────────────────┐       │
//! │  └─────────────────┘ └►│  WholesaleTier  │   │    Category     │       │
//! │                        │  None           │   │  id, name       │       │
//! │                        │  Tier{price,thr}│   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Wholesale Tier
// =============================================================================

/// Optional bulk price for a product.
///
/// A price and its threshold only exist together, so a product can never
/// carry a wholesale price without a threshold or the other way around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WholesaleTier {
    /// Every quantity sells at the product's unit price.
    #[default]
    None,
    /// `price` applies to the whole line once quantity reaches `threshold`.
    Tier { price: Money, threshold: i64 },
}

impl WholesaleTier {
    /// Builds a tier from two loosely-typed optional columns.
    ///
    /// An inconsistent pair (only one side set) or a non-positive threshold
    /// degrades to [`WholesaleTier::None`] instead of failing.
    ///
    /// ```rust
    /// use kasir_core::{Money, WholesaleTier};
    ///
    /// let tier = WholesaleTier::from_parts(Some(Money::from_rupiah(3000)), Some(10));
    /// assert_eq!(tier.threshold(), Some(10));
    ///
    /// assert_eq!(WholesaleTier::from_parts(Some(Money::from_rupiah(3000)), None), WholesaleTier::None);
    /// ```
    pub fn from_parts(price: Option<Money>, threshold: Option<i64>) -> Self {
        match (price, threshold) {
            (Some(price), Some(threshold)) if threshold > 0 => WholesaleTier::Tier { price, threshold },
            _ => WholesaleTier::None,
        }
    }

    /// Splits the tier back into its two storage columns.
    pub fn into_parts(self) -> (Option<Money>, Option<i64>) {
        match self {
            WholesaleTier::None => (None, None),
            WholesaleTier::Tier { price, threshold } => (Some(price), Some(threshold)),
        }
    }

    /// Returns the wholesale price, if a tier is configured.
    pub fn price(&self) -> Option<Money> {
        self.into_parts().0
    }

    /// Returns the quantity threshold, if a tier is configured.
    pub fn threshold(&self) -> Option<i64> {
        self.into_parts().1
    }

    #[inline]
    pub fn is_configured(&self) -> bool {
        matches!(self, WholesaleTier::Tier { .. })
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown to cashier and on receipt.
    pub name: String,

    /// Barcode scanned at the checkout (EAN-13 in practice).
    pub barcode: String,

    /// Optional category this product is filed under.
    pub category_id: Option<String>,

    /// Standard selling price per piece.
    pub unit_price: Money,

    /// Cost per piece (for profit reports).
    pub purchase_price: Money,

    /// Bulk price tier.
    pub wholesale: WholesaleTier,

    /// Current stock, in pieces.
    pub stock_quantity: i64,

    /// Pieces per bundle. `None` or `Some(0)` means not configured.
    pub bundle_size: Option<i64>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// A product sold below cost. Allowed, but worth flagging in the admin UI.
    pub fn has_loss_warning(&self) -> bool {
        self.purchase_price > self.unit_price
    }

    /// Checks whether `quantity` pieces can be taken from current stock.
    pub fn can_sell(&self, quantity: i64) -> bool {
        quantity <= self.stock_quantity
    }
}

// =============================================================================
// Category
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Sold Line Item
// =============================================================================

/// One line of a completed transaction, as seen by reporting.
///
/// The product name and price are frozen at sale time so the history
/// survives product edits and deletions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SoldLineItem {
    pub transaction_id: String,
    /// `None` once the product has been deleted.
    pub product_id: Option<String>,
    pub product_name: String,
    pub quantity_sold: i64,
    pub unit_price_at_sale: Money,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
}

impl SoldLineItem {
    #[inline]
    pub fn revenue(&self) -> Money {
        self.unit_price_at_sale.multiply_quantity(self.quantity_sold)
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// A settled sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub id: String,
    pub total: Money,
    pub amount_tendered: Money,
    pub change: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Restock Purchase
// =============================================================================

/// Money spent buying stock from a supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RestockPurchase {
    pub id: String,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub amount: Money,
    pub note: String,
}

// =============================================================================
// Unit Tests
// =============================================================================
