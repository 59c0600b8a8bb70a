//! # Checkout
//!
//! Totals, payment validation and the two-state checkout session.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   ┌──────────┐   prepare_commit() ok    ┌──────────┐                   │
//! │   │   Open   │ ── store persists ──────►│ Settled  │                   │
//! │   │ (edits)  │      settle(tx_id)       │(terminal)│                   │
//! │   └──────────┘                          └────┬─────┘                   │
//! │        ▲                                     │                          │
//! │        └──────────── next_customer() ────────┘                          │
//! │                                                                         │
//! │   prepare_commit() checks, in order:                                   │
//! │     1. cart not empty         → else EmptyCart                         │
//! │     2. tendered ≥ total       → else InsufficientPayment               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::{Cart, CartLine};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Product;

// =============================================================================
// Totals
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutTotals {
    pub total: Money,
    /// `amount_tendered - total`. Negative while payment is short.
    pub change: Money,
}

impl CheckoutTotals {
    /// Change for display, never below zero.
    pub fn display_change(&self) -> Money {
        self.change.clamp_non_negative()
    }

    pub fn is_fully_paid(&self) -> bool {
        !self.change.is_negative()
    }
}

/// Computes the cart total and the signed change owed.
///
/// ```rust
/// use kasir_core::checkout::compute_totals;
/// use kasir_core::{Cart, Money};
///
/// let totals = compute_totals(&Cart::new(), Money::from_rupiah(5000));
/// assert_eq!(totals.total, Money::zero());
/// assert_eq!(totals.change.rupiah(), 5000);
/// ```
pub fn compute_totals(cart: &Cart, amount_tendered: Money) -> CheckoutTotals {
    let total = cart.total();
    CheckoutTotals {
        total,
        change: amount_tendered - total,
    }
}

// =============================================================================
// Commit Request
// =============================================================================

/// Everything the store needs to persist a sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CommitRequest {
    pub lines: Vec<CartLine>,
    pub total: Money,
    pub amount_tendered: Money,
    pub change: Money,
}

// =============================================================================
// Checkout Session
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutState {
    /// Cart is editable.
    #[default]
    Open,
    /// Sale committed; terminal until the next customer.
    Settled,
}

/// One customer's checkout: a cart plus its state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Checkout {
    cart: Cart,
    state: CheckoutState,
    transaction_id: Option<String>,
}

impl Checkout {
    pub fn new() -> Self {
        Checkout::default()
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn state(&self) -> CheckoutState {
        self.state
    }

    /// Id of the committed transaction once settled.
    pub fn transaction_id(&self) -> Option<&str> {
        self.transaction_id.as_deref()
    }

    pub fn add_or_increment(&mut self, product: &Product) -> CoreResult<&CartLine> {
        self.ensure_open()?;
        self.cart.add_or_increment(product)
    }

    pub fn set_quantity(&mut self, product_id: &str, new_quantity: i64) -> CoreResult<()> {
        self.ensure_open()?;
        self.cart.set_quantity(product_id, new_quantity)
    }

    pub fn remove(&mut self, product_id: &str) -> CoreResult<()> {
        self.ensure_open()?;
        self.cart.remove(product_id);
        Ok(())
    }

    pub fn clear(&mut self) -> CoreResult<()> {
        self.ensure_open()?;
        self.cart.clear();
        Ok(())
    }

    pub fn totals(&self, amount_tendered: Money) -> CheckoutTotals {
        compute_totals(&self.cart, amount_tendered)
    }

    /// Validates the checkout and builds the request to persist.
    ///
    /// Does not change state: the caller settles only after the store has
    /// written everything.
    pub fn prepare_commit(&self, amount_tendered: Option<Money>) -> CoreResult<CommitRequest> {
        self.ensure_open()?;

        if self.cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        let total = self.cart.total();
        let tendered = match amount_tendered {
            Some(tendered) if tendered >= total => tendered,
            other => {
                return Err(CoreError::InsufficientPayment {
                    total,
                    tendered: other.unwrap_or_default(),
                })
            }
        };

        let totals = compute_totals(&self.cart, tendered);
        Ok(CommitRequest {
            lines: self.cart.lines().to_vec(),
            total: totals.total,
            amount_tendered: tendered,
            change: totals.change,
        })
    }

    /// Marks the checkout as committed under `transaction_id`.
    pub fn settle(&mut self, transaction_id: impl Into<String>) -> CoreResult<()> {
        self.ensure_open()?;
        self.state = CheckoutState::Settled;
        self.transaction_id = Some(transaction_id.into());
        Ok(())
    }

    /// Starts over with an empty, open cart.
    pub fn next_customer(&mut self) {
        *self = Checkout::new();
    }

    fn ensure_open(&self) -> CoreResult<()> {
        match self.state {
            CheckoutState::Open => Ok(()),
            CheckoutState::Settled => Err(CoreError::CheckoutSettled),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::tests::test_product;
    use crate::types::WholesaleTier;

    /// 10 × Indomie at the wholesale price: Rp 30.000.
    fn checkout_worth_30000() -> Checkout {
        let mut product = test_product("indomie", 3500, 100);
        product.wholesale = WholesaleTier::Tier {
            price: Money::from_rupiah(3000),
            threshold: 10,
        };
        let mut checkout = Checkout::new();
        for _ in 0..10 {
            checkout.add_or_increment(&product).unwrap();
        }
        checkout
    }

    #[test]
    fn test_compute_totals_change() {
        let checkout = checkout_worth_30000();

        let totals = checkout.totals(Money::from_rupiah(50000));
        assert_eq!(totals.total.rupiah(), 30000);
        assert_eq!(totals.change.rupiah(), 20000);
        assert!(totals.is_fully_paid());
    }

    #[test]
    fn test_negative_change_is_kept() {
        let checkout = checkout_worth_30000();

        let totals = checkout.totals(Money::from_rupiah(20000));
        assert_eq!(totals.change.rupiah(), -10000);
        assert_eq!(totals.display_change(), Money::zero());
        assert!(!totals.is_fully_paid());
    }

    #[test]
    fn test_prepare_rejects_short_payment() {
        let checkout = checkout_worth_30000();

        let err = checkout
            .prepare_commit(Some(Money::from_rupiah(20000)))
            .unwrap_err();
        assert_eq!(
            err,
            CoreError::InsufficientPayment {
                total: Money::from_rupiah(30000),
                tendered: Money::from_rupiah(20000),
            }
        );
        assert_eq!(checkout.state(), CheckoutState::Open);
    }

    #[test]
    fn test_prepare_rejects_missing_payment() {
        let checkout = checkout_worth_30000();
        assert!(matches!(
            checkout.prepare_commit(None),
            Err(CoreError::InsufficientPayment { .. })
        ));
    }

    #[test]
    fn test_empty_cart_checked_before_payment() {
        let checkout = Checkout::new();
        assert_eq!(checkout.prepare_commit(None), Err(CoreError::EmptyCart));
        assert_eq!(
            checkout.prepare_commit(Some(Money::from_rupiah(1000))),
            Err(CoreError::EmptyCart)
        );
    }

    #[test]
    fn test_exact_payment_is_accepted() {
        let checkout = checkout_worth_30000();
        let request = checkout
            .prepare_commit(Some(Money::from_rupiah(30000)))
            .unwrap();
        assert_eq!(request.change, Money::zero());
        assert_eq!(request.lines.len(), 1);
        assert_eq!(request.lines[0].quantity, 10);
    }

    #[test]
    fn test_settle_then_next_customer() {
        let mut checkout = checkout_worth_30000();
        checkout
            .prepare_commit(Some(Money::from_rupiah(50000)))
            .unwrap();

        checkout.settle("tx-1").unwrap();
        assert_eq!(checkout.state(), CheckoutState::Settled);
        assert_eq!(checkout.transaction_id(), Some("tx-1"));

        // Settled is terminal
        let product = test_product("aqua", 3000, 10);
        assert_eq!(
            checkout.add_or_increment(&product).unwrap_err(),
            CoreError::CheckoutSettled
        );
        assert_eq!(
            checkout.prepare_commit(Some(Money::from_rupiah(50000))),
            Err(CoreError::CheckoutSettled)
        );
        assert_eq!(checkout.settle("tx-2"), Err(CoreError::CheckoutSettled));

        checkout.next_customer();
        assert_eq!(checkout.state(), CheckoutState::Open);
        assert!(checkout.cart().is_empty());
        assert!(checkout.add_or_increment(&product).is_ok());
    }
}
