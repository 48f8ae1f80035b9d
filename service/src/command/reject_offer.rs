//! [`Command`] for rejecting an [`Offer`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{listing, offer, user, Listing, Offer},
    infra::{database, notifier, Database, Notifier},
    Service,
};
#[cfg(doc)]
use crate::domain::User;

use super::Command;

/// [`Command`] for rejecting an [`Offer`].
///
/// Rejection is terminal. Retrying an already rejected [`Offer`] is a
/// no-op.
#[derive(Clone, Copy, Debug)]
pub struct RejectOffer {
    /// ID of the [`Offer`] to reject.
    pub offer_id: offer::Id,

    /// ID of the [`User`] rejecting the [`Offer`].
    pub actor_id: user::Id,
}

impl<Db, Nf, Pm> Command<RejectOffer> for Service<Db, Nf, Pm>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Offer>, offer::Id>>,
            Ok = Option<Offer>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Lock<By<Listing, listing::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Offer>, offer::Id>>,
            Ok = Option<Offer>,
            Err = Traced<database::Error>,
        > + Database<Update<Offer>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
    Nf: Notifier<notifier::Notify, Ok = (), Err: std::fmt::Display>,
{
    type Ok = Offer;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: RejectOffer) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RejectOffer { offer_id, actor_id } = cmd;

        let offer = self
            .database()
            .execute(Select(By::<Option<Offer>, _>::new(offer_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::OfferNotExists(offer_id))
            .map_err(tracerr::wrap!())?;
        if !offer.is_seller(actor_id) {
            return Err(tracerr::new!(E::NotAuthorized(actor_id)));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Listing`.
        tx.execute(Lock(By::new(offer.listing_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut offer = tx
            .execute(Select(By::<Option<Offer>, _>::new(offer_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::OfferNotExists(offer_id))
            .map_err(tracerr::wrap!())?;
        match offer.status {
            offer::Status::Rejected => return Ok(offer),
            offer::Status::Submitted | offer::Status::Viewed => {}
            offer::Status::Accepted
            | offer::Status::Countered
            | offer::Status::Withdrawn => {
                return Err(tracerr::new!(E::InvalidTransition(
                    offer_id,
                    offer.status,
                )));
            }
        }
        if offer.is_expired() {
            return Err(tracerr::new!(E::OfferExpired(offer_id)));
        }

        offer.status = offer::Status::Rejected;
        tx.execute(Update(offer.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        self.notify(notifier::Event::OfferRejected {
            offer_id: offer.id,
            buyer_id: offer.buyer_id,
        })
        .await;

        Ok(offer)
    }
}

/// Error of [`RejectOffer`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Offer`] cannot be rejected from its current status.
    #[display("`Offer(id: {_0})` cannot be rejected from `{_1}` status")]
    InvalidTransition(offer::Id, offer::Status),

    /// [`User`] is not the seller of the [`Offer`].
    #[display("`User(id: {_0})` is not the seller of the `Offer`")]
    NotAuthorized(#[error(not(source))] user::Id),

    /// [`Offer`] passed its irrevocable deadline.
    #[display("`Offer(id: {_0})` has expired")]
    OfferExpired(#[error(not(source))] offer::Id),

    /// [`Offer`] with the provided ID does not exist.
    #[display("`Offer(id: {_0})` does not exist")]
    OfferNotExists(#[error(not(source))] offer::Id),
}
