//! [`Command`] for resolving a [`Condition`] of a [`Transaction`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        condition, listing, property, transaction, user, Listing, Property,
        Transaction,
    },
    infra::{database, notifier, Database, Notifier},
    Service,
};
#[cfg(doc)]
use crate::domain::{Condition, User};

use super::Command;

/// [`Command`] for resolving a [`Condition`] of a [`Transaction`].
///
/// A favorable [`condition::Outcome`] may firm up the [`Transaction`] once
/// every [`Condition`] has resolved favorably. A failed one cancels the
/// [`Transaction`] in the same operation: the deposit returns to the buyer
/// and the [`Listing`] with its [`Property`] go back on the market.
#[derive(Clone, Debug)]
pub struct ResolveCondition {
    /// ID of the [`Transaction`] owning the [`Condition`].
    pub transaction_id: transaction::Id,

    /// ID of the [`Condition`] to resolve.
    pub condition_id: condition::Id,

    /// ID of the [`User`] resolving the [`Condition`].
    pub actor_id: user::Id,

    /// [`condition::Outcome`] to resolve the [`Condition`] with.
    pub outcome: condition::Outcome,

    /// Free-text notes to record with the resolution.
    pub notes: Option<condition::Notes>,
}

impl<Db, Nf, Pm> Command<ResolveCondition> for Service<Db, Nf, Pm>
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
{
    type Ok = Transaction;
    type Err = Traced<ExecutionError>;

    #[expect(clippy::too_many_lines, reason = "still readable")]
    async fn execute(
        &self,
        cmd: ResolveCondition,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ResolveCondition {
            transaction_id,
            condition_id,
            actor_id,
            outcome,
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

        // Avoid concurrent resolutions upon the same `Transaction`.
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

        let now = condition::ResolutionDateTime::now();
        {
            let cond = transaction
                .condition_mut(condition_id)
                .ok_or(E::ConditionNotExists(condition_id))
                .map_err(tracerr::wrap!())?;
            if cond.is_resolved() {
                return Err(tracerr::new!(E::ConditionAlreadyResolved(
                    condition_id,
                )));
            }
            cond.status = outcome.status();
            cond.resolution = Some(condition::Resolution {
                by: actor_id,
                at: now,
                outcome,
                notes,
            });
        }

        match outcome {
            condition::Outcome::Failed => {
                transaction.status = transaction::Status::Cancelled;
                transaction.cancellation =
                    Some(transaction::Cancellation {
                        reason:
                            transaction::CancellationReason::condition_failed(
                            ),
                        failed_condition: Some(condition_id),
                        deposit_disposition:
                            transaction::DepositDisposition::ReturnedToBuyer,
                        cancelled_at: now.coerce(),
                    });

                let mut listing = tx
                    .execute(Select(By::<Option<Listing>, _>::new(
                        transaction.listing_id,
                    )))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or(E::ListingNotExists(transaction.listing_id))
                    .map_err(tracerr::wrap!())?;
                listing.status = listing::Status::Active;
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
                property.status = property::Status::Active;
                tx.execute(Update(property))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
            }
            condition::Outcome::Fulfilled | condition::Outcome::Waived => {
                if transaction.all_conditions_favorable() {
                    transaction.status = transaction::Status::Firm;
                    transaction.firm_at = Some(now.coerce());
                    if transaction.current_step.u8()
                        < transaction::Step::ConditionsComplete.u8()
                    {
                        transaction.advance_to(
                            transaction::Step::ConditionsComplete,
                            actor_id,
                            None,
                        );
                    }
                }
            }
        }

        tx.execute(Update(transaction.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        if transaction.status == transaction::Status::Cancelled {
            self.notify(notifier::Event::TransactionCancelled {
                transaction_id,
                buyer_id: transaction.buyer_id,
                seller_id: transaction.seller_id,
            })
            .await;
        }

        Ok(transaction)
    }
}

/// Error of [`ResolveCondition`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Condition`] already reached a terminal status.
    #[display("`Condition(id: {_0})` is already resolved")]
    ConditionAlreadyResolved(#[error(not(source))] condition::Id),

    /// [`Condition`] with the provided ID does not exist.
    #[display("`Condition(id: {_0})` does not exist")]
    ConditionNotExists(#[error(not(source))] condition::Id),

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

    /// [`Transaction`] with the provided ID does not exist.
    #[display("`Transaction(id: {_0})` does not exist")]
    TransactionNotExists(#[error(not(source))] transaction::Id),

    /// [`Transaction`] already reached a terminal status.
    #[display("`Transaction(id: {_0})` is already `{_1}`")]
    TransactionTerminal(transaction::Id, transaction::Status),
}
