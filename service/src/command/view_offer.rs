//! [`Command`] for marking a submitted [`Offer`] as viewed.

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{listing, offer, user, Listing, Offer},
    infra::{database, Database},
    Service,
};
#[cfg(doc)]
use crate::domain::User;

use super::Command;

/// [`Command`] for marking a submitted [`Offer`] as viewed by its seller.
#[derive(Clone, Copy, Debug)]
pub struct ViewOffer {
    /// ID of the [`Offer`] to mark as viewed.
    pub offer_id: offer::Id,

    /// ID of the [`User`] viewing the [`Offer`].
    pub actor_id: user::Id,
}

impl<Db, Nf, Pm> Command<ViewOffer> for Service<Db, Nf, Pm>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Offer>, offer::Id>>,
            Ok = Option<Offer>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Select<By<Option<Offer>, offer::Id>>,
            Ok = Option<Offer>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Listing, listing::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Update<Offer>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Offer;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: ViewOffer) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ViewOffer { offer_id, actor_id } = cmd;

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
            offer::Status::Viewed => return Ok(offer),
            offer::Status::Submitted => {}
            offer::Status::Accepted
            | offer::Status::Rejected
            | offer::Status::Countered
            | offer::Status::Withdrawn => {
                return Err(tracerr::new!(E::InvalidTransition(
                    offer_id,
                    offer.status,
                )));
            }
        }

        offer.status = offer::Status::Viewed;
        tx.execute(Update(offer.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(offer)
    }
}

/// Error of [`ViewOffer`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Offer`] cannot be viewed from its current status.
    #[display("`Offer(id: {_0})` cannot be viewed from `{_1}` status")]
    InvalidTransition(offer::Id, offer::Status),

    /// [`User`] is not the seller of the [`Offer`].
    #[display("`User(id: {_0})` is not the seller of the `Offer`")]
    NotAuthorized(#[error(not(source))] user::Id),

    /// [`Offer`] with the provided ID does not exist.
    #[display("`Offer(id: {_0})` does not exist")]
    OfferNotExists(#[error(not(source))] offer::Id),
}
