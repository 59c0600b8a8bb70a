//! # Validation Module
//!
//! Admin-input validation for products, categories and restock entries.
//!
//! ## Where It Runs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Product form ──► validate_* (THIS MODULE) ──► ProductRepository        │
//! │                         │                          │                    │
//! │                         ▼                          ▼                    │
//! │                  ValidationError            UNIQUE / NOT NULL           │
//! │                                              constraints                │
//! │                                                                         │
//! │  The pricing path never calls these: a half-configured wholesale pair  │
//! │  that slipped into storage is treated as "no tier" instead.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kasir_core::validation::{validate_barcode, validate_wholesale_pair};
//! use kasir_core::Money;
//!
//! validate_barcode("8992761111111").unwrap();
//! assert!(validate_wholesale_pair(Some(Money::from_rupiah(3000)), None).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::WholesaleTier;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;
const MAX_BARCODE_LEN: usize = 32;
const MAX_NOTE_LEN: usize = 500;

// =============================================================================
// String Validators
// =============================================================================

fn required_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a product name: non-empty, at most 200 characters.
///
/// ```rust
/// use kasir_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Indomie Goreng").is_ok());
/// assert!(validate_product_name("   ").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    required_text("name", name, MAX_NAME_LEN)
}

pub fn validate_category_name(name: &str) -> ValidationResult<()> {
    required_text("category name", name, MAX_NAME_LEN)
}

/// Validates a scan barcode.
///
/// ## Rules
/// - Must not be empty
/// - Digits only (EAN-8, EAN-13, UPC-A and in-store codes)
/// - At most 32 characters
pub fn validate_barcode(barcode: &str) -> ValidationResult<()> {
    let barcode = barcode.trim();
    required_text("barcode", barcode, MAX_BARCODE_LEN)?;

    if !barcode.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "must contain only digits".to_string(),
        });
    }

    Ok(())
}

/// Notes are optional but bounded.
pub fn validate_note(note: &str) -> ValidationResult<()> {
    if note.chars().count() > MAX_NOTE_LEN {
        return Err(ValidationError::TooLong {
            field: "note".to_string(),
            max: MAX_NOTE_LEN,
        });
    }
    Ok(())
}

/// Validates a search query and returns it trimmed.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Zero is allowed (free items); negatives are not.
///
/// ```rust
/// use kasir_core::validation::validate_price;
/// use kasir_core::Money;
///
/// assert!(validate_price("unit price", Money::from_rupiah(3500)).is_ok());
/// assert!(validate_price("unit price", Money::zero()).is_ok());
/// assert!(validate_price("unit price", Money::from_rupiah(-1)).is_err());
/// ```
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Quantities entered by hand must be positive.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

pub fn validate_stock_quantity(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// A bundle holds at least one piece.
pub fn validate_bundle_size(size: i64) -> ValidationResult<()> {
    if size < 1 {
        return Err(ValidationError::MustBePositive {
            field: "bundle size".to_string(),
        });
    }
    Ok(())
}

pub fn validate_restock_amount(amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "restock amount".to_string(),
        });
    }
    Ok(())
}

/// Checks a wholesale price/threshold pair from the product form and
/// builds the tier.
///
/// ## Rules
/// ```text
/// (None,  None)       ──► WholesaleTier::None
/// (Some,  Some(t≥1))  ──► WholesaleTier::Tier
/// (Some,  None)       ──► MissingPair
/// (None,  Some)       ──► MissingPair
/// threshold < 1       ──► OutOfRange
/// ```
pub fn validate_wholesale_pair(
    price: Option<Money>,
    threshold: Option<i64>,
) -> ValidationResult<WholesaleTier> {
    match (price, threshold) {
        (None, None) => Ok(WholesaleTier::None),
        (Some(_), None) => Err(ValidationError::MissingPair {
            field: "wholesale price".to_string(),
            other: "wholesale threshold".to_string(),
        }),
        (None, Some(_)) => Err(ValidationError::MissingPair {
            field: "wholesale threshold".to_string(),
            other: "wholesale price".to_string(),
        }),
        (Some(price), Some(threshold)) => {
            validate_price("wholesale price", price)?;
            if threshold < 1 {
                return Err(ValidationError::OutOfRange {
                    field: "wholesale threshold".to_string(),
                    min: 1,
                    max: i64::MAX,
                });
            }
            Ok(WholesaleTier::Tier { price, threshold })
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
