//! [`Payments`]-related implementations.

use std::convert::Infallible;

use common::Money;
use tracing as log;
use uuid::Uuid;

use crate::domain::transaction;
#[cfg(doc)]
use crate::domain::Transaction;

/// Payment operation.
pub use common::Handler as Payments;

/// Operation of charging the platform commission on a completed
/// [`Transaction`].
#[derive(Clone, Debug)]
pub struct ChargeCommission {
    /// ID of the completed [`Transaction`].
    pub transaction_id: transaction::Id,

    /// Commission amount to charge.
    pub amount: Money,
}

/// [`Payments`] collaborator issuing opaque invoice references.
///
/// Stands in for a real payment gateway, which is an upstream
/// collaborator.
#[derive(Clone, Copy, Debug, Default)]
pub struct Invoicer;

impl Payments<ChargeCommission> for Invoicer {
    type Ok = transaction::PaymentReference;
    type Err = Infallible;

    async fn execute(
        &self,
        op: ChargeCommission,
    ) -> Result<Self::Ok, Self::Err> {
        let reference = format!("INV-{}", Uuid::new_v4());
        log::info!(
            transaction_id = %op.transaction_id,
            amount = %op.amount,
            %reference,
            "commission invoiced",
        );
        Ok(transaction::PaymentReference::from(reference))
    }
}
