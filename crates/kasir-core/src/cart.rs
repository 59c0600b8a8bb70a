//! # Cart
//!
//! The checkout cart as a plain value, mutated only through the operations
//! below.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Cashier Action           Operation               Cart Change           │
//! │  ──────────────           ─────────               ───────────           │
//! │                                                                         │
//! │  Scan / tap product ─────► add_or_increment() ──► qty + 1, re-price    │
//! │                                                                         │
//! │  Stepper + / - ──────────► set_quantity() ──────► qty = n, re-price    │
//! │                                                                         │
//! │  Trash icon ─────────────► remove() ────────────► line dropped         │
//! │                                                                         │
//! │  Cancel sale ────────────► clear() ─────────────► empty                │
//! │                                                                         │
//! │  A rejected operation leaves the cart exactly as it was.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Lines are unique by `product_id`
//! - `quantity >= 1` on every line
//! - `line_subtotal == quantity × applied_unit_price` on every line

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::pricing::resolve_for_tier;
use crate::types::{Product, WholesaleTier};
use crate::MAX_CART_LINES;

// =============================================================================
// Cart Line
// =============================================================================

/// A line in the cart.
///
/// ## Product Snapshot
/// Name, prices and the stock figure are copied from the product on every
/// add, so the line can be re-priced on a quantity change without another
/// lookup. The stock figure is a snapshot: the store checks it again when
/// the sale is committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: String,
    pub name: String,
    pub unit_price: Money,
    pub wholesale: WholesaleTier,
    pub available_stock: i64,
    pub quantity: i64,
    pub applied_unit_price: Money,
    pub line_subtotal: Money,
}

impl CartLine {
    fn from_product(product: &Product, quantity: i64) -> Self {
        let mut line = CartLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.unit_price,
            wholesale: product.wholesale,
            available_stock: product.stock_quantity,
            quantity,
            applied_unit_price: product.unit_price,
            line_subtotal: Money::zero(),
        };
        line.reprice();
        line
    }

    /// Applies the pricing rule to the whole line.
    fn reprice(&mut self) {
        self.applied_unit_price = resolve_for_tier(self.unit_price, self.wholesale, self.quantity);
        self.line_subtotal = self.applied_unit_price.multiply_quantity(self.quantity);
    }

    fn insufficient_stock(&self, requested: i64) -> CoreError {
        CoreError::InsufficientStock {
            product: self.name.clone(),
            available: self.available_stock,
            requested,
        }
    }

    /// True when the wholesale price is in effect for this line.
    pub fn is_wholesale(&self) -> bool {
        self.wholesale.is_configured() && self.applied_unit_price != self.unit_price
    }
}

// =============================================================================
// Cart
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Adds one piece of `product`, or starts a line for it.
    ///
    /// ## Behavior
    /// - Not in cart: new line with quantity 1
    /// - In cart: quantity + 1, unless that exceeds `product.stock_quantity`
    /// - The line's snapshot is refreshed from `product` and re-priced
    ///
    /// ## Example
    /// ```rust
    /// # use kasir_core::{Cart, Money, Product, WholesaleTier};
    /// # use chrono::Utc;
    /// # let product = Product {
    /// #     id: "p1".into(), name: "Aqua 600ml".into(), barcode: "8888001234568".into(),
    /// #     category_id: None, unit_price: Money::from_rupiah(3000),
    /// #     purchase_price: Money::from_rupiah(2200), wholesale: WholesaleTier::None,
    /// #     stock_quantity: 2, bundle_size: None, created_at: Utc::now(), updated_at: Utc::now(),
    /// # };
    /// let mut cart = Cart::new();
    /// cart.add_or_increment(&product).unwrap();
    /// cart.add_or_increment(&product).unwrap();
    /// assert!(cart.add_or_increment(&product).is_err()); // only 2 in stock
    /// assert_eq!(cart.total_quantity(), 2);
    /// ```
    pub fn add_or_increment(&mut self, product: &Product) -> CoreResult<&CartLine> {
        match self.position(&product.id) {
            Some(index) => {
                let requested = self.lines[index].quantity + 1;
                if !product.can_sell(requested) {
                    return Err(CoreError::InsufficientStock {
                        product: product.name.clone(),
                        available: product.stock_quantity,
                        requested,
                    });
                }
                self.lines[index] = CartLine::from_product(product, requested);
                Ok(&self.lines[index])
            }
            None => {
                if !product.can_sell(1) {
                    return Err(CoreError::InsufficientStock {
                        product: product.name.clone(),
                        available: product.stock_quantity,
                        requested: 1,
                    });
                }
                if self.lines.len() >= MAX_CART_LINES {
                    return Err(CoreError::CartTooLarge {
                        max: MAX_CART_LINES,
                    });
                }
                self.lines.push(CartLine::from_product(product, 1));
                Ok(&self.lines[self.lines.len() - 1])
            }
        }
    }

    /// Sets a line's quantity explicitly.
    ///
    /// ## Behavior
    /// - `new_quantity <= 0`: same as [`Cart::remove`]
    /// - More than the line's stock snapshot: `InsufficientStock`, no change
    /// - Product not in cart: `ProductNotFound`
    pub fn set_quantity(&mut self, product_id: &str, new_quantity: i64) -> CoreResult<()> {
        if new_quantity <= 0 {
            self.remove(product_id);
            return Ok(());
        }

        let index = self
            .position(product_id)
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

        let line = &mut self.lines[index];
        if new_quantity > line.available_stock {
            return Err(line.insufficient_stock(new_quantity));
        }

        line.quantity = new_quantity;
        line.reprice();
        Ok(())
    }

    /// Removes a line. Removing a product that is not in the cart is a no-op.
    pub fn remove(&mut self, product_id: &str) {
        self.lines.retain(|line| line.product_id != product_id);
    }

    /// Clears all lines from the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, product_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product_id == product_id)
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total pieces across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Sum of line subtotals.
    pub fn total(&self) -> Money {
        self.lines.iter().map(|line| line.line_subtotal).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn position(&self, product_id: &str) -> Option<usize> {
        self.lines.iter().position(|line| line.product_id == product_id)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::tests::test_product;

    fn assert_line_invariants(cart: &Cart) {
        for line in cart.lines() {
            assert!(line.quantity >= 1);
            assert_eq!(
                line.line_subtotal,
                line.applied_unit_price.multiply_quantity(line.quantity)
            );
        }
    }

    fn indomie() -> Product {
        let mut product = test_product("indomie", 3500, 100);
        product.wholesale = WholesaleTier::Tier {
            price: Money::from_rupiah(3000),
            threshold: 10,
        };
        product
    }

    #[test]
    fn test_add_new_line() {
        let mut cart = Cart::new();
        let product = test_product("1", 3000, 10);

        let line = cart.add_or_increment(&product).unwrap();
        assert_eq!(line.quantity, 1);
        assert_eq!(line.line_subtotal.rupiah(), 3000);
        assert_eq!(cart.line_count(), 1);
    }

    #[test]
    fn test_add_same_product_increments() {
        let mut cart = Cart::new();
        let product = test_product("1", 3000, 10);

        cart.add_or_increment(&product).unwrap();
        cart.add_or_increment(&product).unwrap();

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.total_quantity(), 2);
        assert_line_invariants(&cart);
    }

    #[test]
    fn test_wholesale_threshold_reprices_whole_line() {
        let mut cart = Cart::new();
        let product = indomie();

        for _ in 0..9 {
            cart.add_or_increment(&product).unwrap();
            assert_line_invariants(&cart);
        }
        let line = cart.line(&product.id).unwrap();
        assert_eq!(line.applied_unit_price.rupiah(), 3500);
        assert_eq!(line.line_subtotal.rupiah(), 31500);
        assert!(!line.is_wholesale());

        cart.add_or_increment(&product).unwrap();
        let line = cart.line(&product.id).unwrap();
        assert_eq!(line.quantity, 10);
        assert_eq!(line.applied_unit_price.rupiah(), 3000);
        assert_eq!(line.line_subtotal.rupiah(), 30000);
        assert!(line.is_wholesale());
    }

    #[test]
    fn test_increment_beyond_stock_is_rejected() {
        let mut cart = Cart::new();
        let product = test_product("1", 3000, 1);

        cart.add_or_increment(&product).unwrap();
        let before = cart.clone();

        let err = cart.add_or_increment(&product).unwrap_err();
        assert_eq!(
            err,
            CoreError::InsufficientStock {
                product: product.name.clone(),
                available: 1,
                requested: 2,
            }
        );
        assert_eq!(cart, before);
    }

    #[test]
    fn test_add_out_of_stock_product_is_rejected() {
        let mut cart = Cart::new();
        let product = test_product("1", 3000, 0);

        assert!(matches!(
            cart.add_or_increment(&product),
            Err(CoreError::InsufficientStock { requested: 1, .. })
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_reprices() {
        let mut cart = Cart::new();
        let product = indomie();
        cart.add_or_increment(&product).unwrap();

        cart.set_quantity(&product.id, 12).unwrap();
        let line = cart.line(&product.id).unwrap();
        assert_eq!(line.applied_unit_price.rupiah(), 3000);
        assert_eq!(line.line_subtotal.rupiah(), 36000);

        cart.set_quantity(&product.id, 3).unwrap();
        let line = cart.line(&product.id).unwrap();
        assert_eq!(line.applied_unit_price.rupiah(), 3500);
        assert_eq!(line.line_subtotal.rupiah(), 10500);
        assert_line_invariants(&cart);
    }

    #[test]
    fn test_set_quantity_beyond_stock_leaves_cart_unchanged() {
        let mut cart = Cart::new();
        let product = test_product("1", 3000, 5);
        cart.add_or_increment(&product).unwrap();
        cart.set_quantity(&product.id, 4).unwrap();
        let before = cart.clone();

        let err = cart.set_quantity(&product.id, 6).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock {
                available: 5,
                requested: 6,
                ..
            }
        ));
        assert_eq!(cart, before);
        assert_eq!(cart.line(&product.id).unwrap().quantity, 4);
    }

    #[test]
    fn test_set_quantity_zero_or_negative_removes() {
        let mut cart = Cart::new();
        let a = test_product("a", 3000, 5);
        let b = test_product("b", 4000, 5);
        cart.add_or_increment(&a).unwrap();
        cart.add_or_increment(&b).unwrap();

        cart.set_quantity(&a.id, 0).unwrap();
        assert!(cart.line(&a.id).is_none());

        cart.set_quantity(&b.id, -3).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_unknown_product() {
        let mut cart = Cart::new();
        assert_eq!(
            cart.set_quantity("missing", 2),
            Err(CoreError::ProductNotFound("missing".to_string()))
        );
    }

    #[test]
    fn test_remove_is_unconditional() {
        let mut cart = Cart::new();
        let product = test_product("1", 3000, 5);
        cart.add_or_increment(&product).unwrap();

        cart.remove("not-there");
        assert_eq!(cart.line_count(), 1);

        cart.remove(&product.id);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_refreshes_stock_snapshot() {
        let mut cart = Cart::new();
        let mut product = test_product("1", 3000, 2);
        cart.add_or_increment(&product).unwrap();

        product.stock_quantity = 20;
        cart.add_or_increment(&product).unwrap();
        cart.set_quantity(&product.id, 15).unwrap();
        assert_eq!(cart.line(&product.id).unwrap().quantity, 15);
    }

    #[test]
    fn test_cart_line_limit() {
        let mut cart = Cart::new();
        for i in 0..MAX_CART_LINES {
            cart.add_or_increment(&test_product(&i.to_string(), 1000, 5)).unwrap();
        }
        assert_eq!(
            cart.add_or_increment(&test_product("one-more", 1000, 5))
                .unwrap_err(),
            CoreError::CartTooLarge {
                max: MAX_CART_LINES
            }
        );
    }

    #[test]
    fn test_cart_total_and_clear() {
        let mut cart = Cart::new();
        cart.add_or_increment(&test_product("a", 3000, 5)).unwrap();
        cart.add_or_increment(&test_product("b", 4000, 5)).unwrap();
        assert_eq!(cart.total().rupiah(), 7000);

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Money::zero());
    }
}
