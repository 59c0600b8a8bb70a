//! # Stock Units
//!
//! Pieces ↔ bundle conversion for display and restock entry.
//!
//! A bundle (a "renteng", a carton) is only a counting convenience: stock is
//! always stored in pieces.
//!
//! ```text
//! stock 37, 12 pcs per bundle  ──►  3 bundle + 1 pcs   (3 × 12 + 1 = 37)
//! stock 37, no bundle size     ──►  37 pcs
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::validation::ValidationResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StockDisplay {
    /// No bundle size configured, show pieces only.
    RawOnly { stock_quantity: i64 },
    /// `bundle_count * bundle_size + remainder == stock`.
    Bundled {
        bundle_count: i64,
        remainder: i64,
        bundle_size: i64,
    },
}

impl StockDisplay {
    /// The stock count this display was built from.
    pub fn stock_quantity(&self) -> i64 {
        match *self {
            StockDisplay::RawOnly { stock_quantity } => stock_quantity,
            StockDisplay::Bundled {
                bundle_count,
                remainder,
                bundle_size,
            } => bundle_count * bundle_size + remainder,
        }
    }
}

impl fmt::Display for StockDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StockDisplay::RawOnly { stock_quantity } => write!(f, "{} pcs", stock_quantity),
            StockDisplay::Bundled {
                bundle_count,
                remainder,
                ..
            } => write!(f, "{} bundle + {} pcs", bundle_count, remainder),
        }
    }
}

/// Breaks a piece count into whole bundles plus loose pieces.
///
/// `stock_quantity` must be non-negative.
///
/// ```rust
/// use kasir_core::stock::{to_bundle_display, StockDisplay};
///
/// assert_eq!(
///     to_bundle_display(37, Some(12)),
///     StockDisplay::Bundled { bundle_count: 3, remainder: 1, bundle_size: 12 }
/// );
/// assert_eq!(to_bundle_display(37, None), StockDisplay::RawOnly { stock_quantity: 37 });
/// ```
pub fn to_bundle_display(stock_quantity: i64, bundle_size: Option<i64>) -> StockDisplay {
    debug_assert!(stock_quantity >= 0, "stock quantity must be non-negative");

    match bundle_size {
        Some(size) if size > 0 => StockDisplay::Bundled {
            bundle_count: stock_quantity / size,
            remainder: stock_quantity % size,
            bundle_size: size,
        },
        _ => StockDisplay::RawOnly { stock_quantity },
    }
}

/// Converts a restock entered as bundles plus loose pieces into pieces.
///
/// Both counts must be non-negative. Without a bundle size the bundle count
/// is ignored.
///
/// ```rust
/// use kasir_core::stock::pieces_from_bundles;
///
/// assert_eq!(pieces_from_bundles(3, 1, Some(12)), Ok(37));
/// assert!(pieces_from_bundles(-1, 30, Some(24)).is_err());
/// ```
pub fn pieces_from_bundles(
    bundles: i64,
    loose_pieces: i64,
    bundle_size: Option<i64>,
) -> ValidationResult<i64> {
    non_negative("bundles", bundles)?;
    non_negative("loose pieces", loose_pieces)?;

    match bundle_size {
        Some(size) if size > 0 => bundles
            .checked_mul(size)
            .and_then(|pieces| pieces.checked_add(loose_pieces))
            .ok_or_else(|| ValidationError::OutOfRange {
                field: "restock quantity".to_string(),
                min: 0,
                max: i64::MAX,
            }),
        _ => Ok(loose_pieces),
    }
}

fn non_negative(field: &str, count: i64) -> ValidationResult<()> {
    if count < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
