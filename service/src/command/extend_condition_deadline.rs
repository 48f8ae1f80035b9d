//! [`Command`] for extending a [`Condition`] deadline.

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{condition, transaction, user, Transaction},
    infra::{database, Database},
    Service,
};
#[cfg(doc)]
use crate::domain::{Condition, User};

use super::Command;

/// [`Command`] for extending a [`Condition`] deadline.
///
/// An extension binds only when both parties agreed to it. It moves the
/// deadline and marks the [`Condition`] as extended, still awaiting
/// resolution; the owning [`Transaction`]'s status never changes.
#[derive(Clone, Copy, Debug)]
pub struct ExtendConditionDeadline {
    /// ID of the [`Transaction`] owning the [`Condition`].
    pub transaction_id: transaction::Id,

    /// ID of the [`Condition`] to extend.
    pub condition_id: condition::Id,

    /// ID of the [`User`] recording the extension.
    pub actor_id: user::Id,

    /// New deadline to move the [`Condition`] to.
    pub new_deadline: condition::DeadlineDateTime,

    /// Whether the buyer agreed to the extension.
    pub buyer_agreed: bool,

    /// Whether the seller agreed to the extension.
    pub seller_agreed: bool,
}

impl<Db, Nf, Pm> Command<ExtendConditionDeadline> for Service<Db, Nf, Pm>
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
        > + Database<Update<Transaction>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Transaction;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ExtendConditionDeadline,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ExtendConditionDeadline {
            transaction_id,
            condition_id,
            actor_id,
            new_deadline,
            buyer_agreed,
            seller_agreed,
        } = cmd;

        if !(buyer_agreed && seller_agreed) {
            return Err(tracerr::new!(E::ExtensionNotAgreed(condition_id)));
        }

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
            if new_deadline <= cond.deadline {
                return Err(tracerr::new!(E::InvalidDateOrdering));
            }

            cond.extensions.push(condition::Extension {
                prior_deadline: cond.deadline,
                new_deadline,
                buyer_agreed,
                seller_agreed,
                agreed_at: condition::ExtensionDateTime::now(),
            });
            cond.deadline = new_deadline;
            cond.status = condition::Status::Extended;
        }
        transaction.condition_deadline =
            transaction.conditions.iter().map(|c| c.deadline).max();

        tx.execute(Update(transaction.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(transaction)
    }
}

/// Error of [`ExtendConditionDeadline`] [`Command`] execution.
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

    /// Both parties must agree to an extension.
    #[display("extension of `Condition(id: {_0})` lacks agreement")]
    ExtensionNotAgreed(#[error(not(source))] condition::Id),

    /// New deadline does not move the current one forward.
    #[display("new deadline must follow the current one")]
    InvalidDateOrdering,

    /// [`User`] is not a party to the [`Transaction`].
    #[display("`User(id: {_0})` is not a party to the `Transaction`")]
    NotAuthorized(#[error(not(source))] user::Id),

    /// [`Transaction`] with the provided ID does not exist.
    #[display("`Transaction(id: {_0})` does not exist")]
    TransactionNotExists(#[error(not(source))] transaction::Id),

    /// [`Transaction`] already reached a terminal status.
    #[display("`Transaction(id: {_0})` is already `{_1}`")]
    TransactionTerminal(transaction::Id, transaction::Status),
}
