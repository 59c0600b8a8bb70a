//! # Checkout Commit
//!
//! Drives a [`Checkout`] through the store:
//!
//! ```text
//! prepare_commit(tendered) ──► TransactionRepository::commit ──► settle ──► next_customer
//!        │                              │
//!        ▼                              ▼
//!  EmptyCart / InsufficientPayment   InsufficientStock / ProductNotFound
//!  (nothing written)                 (rolled back, cart kept for editing)
//! ```

use serde::Serialize;
use tracing::info;

use crate::error::DbResult;
use crate::pool::Database;
use kasir_core::{CartLine, Checkout, Money, TransactionRecord};

/// What the receipt needs after a successful sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommittedSale {
    pub transaction: TransactionRecord,
    pub lines: Vec<CartLine>,
}

/// Commits the checkout's cart as one sale.
///
/// On success the checkout is reset for the next customer. On failure it is
/// left untouched so the cashier can fix the cart or the payment.
pub async fn commit_checkout(
    db: &Database,
    checkout: &mut Checkout,
    amount_tendered: Option<Money>,
) -> DbResult<CommittedSale> {
    let request = checkout.prepare_commit(amount_tendered)?;
    let transaction = db.transactions().commit(&request).await?;

    checkout.settle(transaction.id.clone())?;
    info!(
        id = %transaction.id,
        change = %transaction.change,
        "Checkout settled"
    );
    checkout.next_customer();

    Ok(CommittedSale {
        transaction,
        lines: request.lines,
    })
}
