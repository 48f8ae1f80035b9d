//! [`Command`] for advancing a [`Transaction`] along its closing workflow.

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        listing, property, transaction, user, Listing, Property, Transaction,
    },
    infra::{database, notifier, payments, Database, Notifier, Payments},
    Service,
};
#[cfg(doc)]
use crate::domain::{Condition, User};

use super::Command;

/// [`Command`] for advancing a [`Transaction`] along its closing workflow.
///
/// Steps only move forward, one at a time. Entering
/// [`transaction::Step::ConditionsComplete`] requires every [`Condition`]
/// to have resolved favorably; entering [`transaction::Step::Completed`]
/// completes the sale: the listing and property go sold, the platform fee
/// is invoiced and both parties are notified.
#[derive(Clone, Debug)]
pub struct AdvanceTransactionStep {
    /// ID of the [`Transaction`] to advance.
    pub transaction_id: transaction::Id,

    /// ID of the [`User`] advancing the [`Transaction`].
    pub actor_id: user::Id,

    /// [`transaction::Step`] to advance to.
    pub step: transaction::Step,

    /// Free-text notes to record with the advance.
    pub notes: Option<transaction::Notes>,
}

impl<Db, Nf, Pm> Command<AdvanceTransactionStep> for Service<Db, Nf, Pm>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Transaction>, transaction::Id>>,
            Ok = Option<Transaction>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Lock<By<Transaction, transaction::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Transaction>, transaction::Id>>,
            Ok = Option<Transaction>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Listing>, listing::Id>>,
            Ok = Option<Listing>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<Update<Transaction>, Ok = (), Err = Traced<database::Error>>
        + Database<Update<Listing>, Ok = (), Err = Traced<database::Error>>
        + Database<Update<Property>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
    Nf: Notifier<notifier::Notify, Ok = (), Err: std::fmt::Display>,
    Pm: Payments<
        payments::ChargeCommission,
        Ok = transaction::PaymentReference,
        Err: std::fmt::Display,
    >,
{
    type Ok = Transaction;
    type Err = Traced<ExecutionError>;

    #[expect(clippy::too_many_lines, reason = "still readable")]
    async fn execute(
        &self,
        cmd: AdvanceTransactionStep,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AdvanceTransactionStep {
            transaction_id,
            actor_id,
            step,
            notes,
        } = cmd;

        let transaction = self
            .database()
            .execute(Select(By::<Option<Transaction>, _>::new(
                transaction_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::TransactionNotExists(transaction_id))
            .map_err(tracerr::wrap!())?;
        if !transaction.is_party(actor_id) {
            return Err(tracerr::new!(E::NotAuthorized(actor_id)));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Transaction`.
        tx.execute(Lock(By::new(transaction_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut transaction = tx
            .execute(Select(By::<Option<Transaction>, _>::new(
                transaction_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::TransactionNotExists(transaction_id))
            .map_err(tracerr::wrap!())?;
        if transaction.is_terminal() {
            return Err(tracerr::new!(E::TransactionTerminal(
                transaction_id,
                transaction.status,
            )));
        }
        if transaction.current_step.next() != Some(step) {
            return Err(tracerr::new!(E::StepOutOfOrder(
                transaction.current_step,
                step,
            )));
        }
        if step == transaction::Step::ConditionsComplete
            && !transaction.all_conditions_favorable()
        {
            return Err(tracerr::new!(E::ConditionsUnresolved(
                transaction_id,
            )));
        }

        transaction.advance_to(step, actor_id, notes);
        match step {
            transaction::Step::ClosingDay => {
                transaction.status = transaction::Status::Closing;
            }
            transaction::Step::Completed => {
                transaction.status = transaction::Status::Completed;

                let now = listing::SaleDateTime::now();
                let mut listing = tx
                    .execute(Select(By::<Option<Listing>, _>::new(
                        transaction.listing_id,
                    )))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or(E::ListingNotExists(transaction.listing_id))
                    .map_err(tracerr::wrap!())?;
                listing.status = listing::Status::Sold;
                listing.sale_price = Some(transaction.purchase_price);
                listing.sold_at = Some(now);
                tx.execute(Update(listing))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;

                let mut property = tx
                    .execute(Select(By::<Option<Property>, _>::new(
                        transaction.property_id,
                    )))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or(E::PropertyNotExists(transaction.property_id))
                    .map_err(tracerr::wrap!())?;
                property.status = property::Status::Sold;
                tx.execute(Update(property))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;

                // An invoicing failure leaves the fee `Pending`; the sale
                // itself still completes.
                match self
                    .payments()
                    .execute(payments::ChargeCommission {
                        transaction_id,
                        amount: transaction.platform_fee.amount,
                    })
                    .await
                {
                    Ok(reference) => {
                        transaction.platform_fee.status =
                            transaction::PaymentStatus::Invoiced;
                        transaction.platform_fee.reference = Some(reference);
                    }
                    Err(e) => {
                        log::warn!(
                            %transaction_id,
                            "failed to invoice the platform fee: {e}",
                        );
                    }
                }
            }
            transaction::Step::OfferAccepted
            | transaction::Step::DepositPending
            | transaction::Step::ConditionsPending
            | transaction::Step::ConditionsComplete
            | transaction::Step::LawyerEngaged
            | transaction::Step::TitleSearch
            | transaction::Step::MortgageFinalized
            | transaction::Step::ClosingDocuments
            | transaction::Step::FinalWalkthrough => {}
        }

        tx.execute(Update(transaction.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        if step == transaction::Step::Completed {
            self.notify(notifier::Event::TransactionComplete {
                transaction_id,
                buyer_id: transaction.buyer_id,
                seller_id: transaction.seller_id,
                sale_price: transaction.purchase_price,
            })
            .await;
        }

        Ok(transaction)
    }
}

/// Error of [`AdvanceTransactionStep`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Transaction`] still has unresolved [`Condition`]s.
    #[display("`Transaction(id: {_0})` has unresolved conditions")]
    ConditionsUnresolved(#[error(not(source))] transaction::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Listing`] with the provided ID does not exist.
    #[display("`Listing(id: {_0})` does not exist")]
    ListingNotExists(#[error(not(source))] listing::Id),

    /// [`User`] is not a party to the [`Transaction`].
    #[display("`User(id: {_0})` is not a party to the `Transaction`")]
    NotAuthorized(#[error(not(source))] user::Id),

    /// [`Property`] with the provided ID does not exist.
    #[display("`Property(id: {_0})` does not exist")]
    PropertyNotExists(#[error(not(source))] property::Id),

    /// Requested [`transaction::Step`] doesn't follow the current one.
    #[display("cannot advance from `{_0}` step to `{_1}`")]
    StepOutOfOrder(transaction::Step, transaction::Step),

    /// [`Transaction`] with the provided ID does not exist.
    #[display("`Transaction(id: {_0})` does not exist")]
    TransactionNotExists(#[error(not(source))] transaction::Id),

    /// [`Transaction`] already reached a terminal status.
    #[display("`Transaction(id: {_0})` is already `{_1}`")]
    TransactionTerminal(transaction::Id, transaction::Status),
}
