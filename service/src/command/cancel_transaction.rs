//! [`Command`] for cancelling a [`Transaction`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        listing, property, transaction, user, Listing, Property, Transaction,
    },
    infra::{database, notifier, Database, Notifier},
    Service,
};
#[cfg(doc)]
use crate::domain::User;

use super::Command;

/// [`Command`] for cancelling a [`Transaction`].
///
/// Cancellation is terminal and puts the [`Listing`] and its [`Property`]
/// back on the market. Retrying an already cancelled [`Transaction`] is a
/// no-op.
#[derive(Clone, Debug)]
pub struct CancelTransaction {
    /// ID of the [`Transaction`] to cancel.
    pub transaction_id: transaction::Id,

    /// ID of the [`User`] cancelling the [`Transaction`].
    pub actor_id: user::Id,

    /// Reason the [`Transaction`] is cancelled for.
    pub reason: transaction::CancellationReason,

    /// Where the deposit goes.
    pub deposit_disposition: transaction::DepositDisposition,
}

impl<Db, Nf, Pm> Command<CancelTransaction> for Service<Db, Nf, Pm>
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

    async fn execute(
        &self,
        cmd: CancelTransaction,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CancelTransaction {
            transaction_id,
            actor_id,
            reason,
            deposit_disposition,
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
        match transaction.status {
            transaction::Status::Cancelled => return Ok(transaction),
            transaction::Status::Completed => {
                return Err(tracerr::new!(E::TransactionTerminal(
                    transaction_id,
                    transaction.status,
                )));
            }
            transaction::Status::Conditional
            | transaction::Status::Firm
            | transaction::Status::Closing
            | transaction::Status::Disputed => {}
        }

        transaction.status = transaction::Status::Cancelled;
        transaction.cancellation = Some(transaction::Cancellation {
            reason,
            failed_condition: None,
            deposit_disposition,
            cancelled_at: transaction::CancellationDateTime::now(),
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

        tx.execute(Update(transaction.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        self.notify(notifier::Event::TransactionCancelled {
            transaction_id,
            buyer_id: transaction.buyer_id,
            seller_id: transaction.seller_id,
        })
        .await;

        Ok(transaction)
    }
}

/// Error of [`CancelTransaction`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
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
