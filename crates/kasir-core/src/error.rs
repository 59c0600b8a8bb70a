//! # Error Types
//!
//! Domain-specific error types for kasir-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  kasir-core errors (this file)                                         │
//! │  ├── CoreError        - Cart, checkout and lookup failures             │
//! │  └── ValidationError  - Admin input validation failures                │
//! │                                                                         │
//! │  kasir-db errors (separate crate)                                      │
//! │  └── DbError          - Database failures, wraps CoreError             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → caller                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant is recoverable: the caller reports it to the operator and
//! the cart is left as it was.

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Product cannot be found.
    ///
    /// ## When This Occurs
    /// - Barcode scan with no matching product
    /// - Quantity change for a product that is not in the cart
    /// - Product deleted between adding to cart and checkout
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Not enough pieces on hand.
    ///
    /// ## User Workflow
    /// ```text
    /// Stepper + (qty: 6)
    ///      │
    ///      ▼
    /// Check stock: available=5
    ///      │
    ///      ▼
    /// InsufficientStock { product: "Aqua 600ml", available: 5, requested: 6 }
    ///      │
    ///      ▼
    /// UI shows: "Stok Aqua 600ml tinggal 5"
    /// ```
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// Cash tendered is missing or below the cart total.
    #[error("Insufficient payment: total {total}, tendered {tendered}")]
    InsufficientPayment { total: Money, tendered: Money },

    /// Checkout attempted with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// The checkout was already committed; start the next customer first.
    #[error("Checkout is already settled")]
    CheckoutSettled,

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// A non-atomic store wrote the transaction but not every stock decrement.
    ///
    /// Carries enough detail to reconcile by hand or to retry the rest.
    #[error(
        "Transaction {transaction_id} recorded but stock decrement failed for {failed} \
         (already decremented: {decremented:?})"
    )]
    PartialCommitFailure {
        transaction_id: String,
        decremented: Vec<String>,
        failed: String,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised by the admin forms before anything is written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., non-digit barcode, reversed date range).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// One field of a pair was filled without the other.
    #[error("{field} requires {other}")]
    MissingPair { field: String, other: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
