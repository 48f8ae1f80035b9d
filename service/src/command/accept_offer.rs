//! [`Command`] for accepting an [`Offer`].

use common::{
    operations::{
        By, Commit, Insert, Lock, Select, Transact, Transacted, Update,
    },
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        listing, offer, property, user, Listing, Offer, Property,
        Transaction,
    },
    infra::{database, notifier, Database, Notifier},
    read,
    Service,
};
#[cfg(doc)]
use crate::domain::{Condition, User};

use super::Command;

/// [`Command`] for accepting an [`Offer`].
///
/// Acceptance is exclusive per [`Listing`]: exactly one [`Transaction`] is
/// created, every other open [`Offer`] on the [`Listing`] is rejected, and
/// the [`Listing`] and its [`Property`] go pending, all atomically.
/// Re-accepting an already accepted [`Offer`] returns the existing
/// [`Transaction`].
#[derive(Clone, Copy, Debug)]
pub struct AcceptOffer {
    /// ID of the [`Offer`] to accept.
    pub offer_id: offer::Id,

    /// ID of the [`User`] accepting the [`Offer`].
    pub actor_id: user::Id,
}

impl<Db, Nf, Pm> Command<AcceptOffer> for Service<Db, Nf, Pm>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Offer>, offer::Id>>,
            Ok = Option<Offer>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Transaction>, offer::Id>>,
            Ok = Option<Transaction>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Lock<By<Listing, listing::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Listing>, listing::Id>>,
            Ok = Option<Listing>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Offer>, offer::Id>>,
            Ok = Option<Offer>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Transaction>, offer::Id>>,
            Ok = Option<Transaction>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<read::offer::Open<Offer>>, listing::Id>>,
            Ok = Vec<read::offer::Open<Offer>>,
            Err = Traced<database::Error>,
        > + Database<Insert<Transaction>, Ok = (), Err = Traced<database::Error>>
        + Database<Update<Offer>, Ok = (), Err = Traced<database::Error>>
        + Database<Update<Listing>, Ok = (), Err = Traced<database::Error>>
        + Database<Update<Property>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
    Nf: Notifier<notifier::Notify, Ok = (), Err: std::fmt::Display>,
{
    type Ok = Transaction;
    type Err = Traced<ExecutionError>;

    #[expect(clippy::too_many_lines, reason = "still readable")]
    async fn execute(&self, cmd: AcceptOffer) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AcceptOffer { offer_id, actor_id } = cmd;

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
        match offer.status {
            offer::Status::Accepted => {
                // Retry of an already accepted `Offer` is a no-op.
                return self
                    .database()
                    .execute(Select(By::<Option<Transaction>, _>::new(
                        offer_id,
                    )))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or(E::InvalidTransition(offer_id, offer.status))
                    .map_err(tracerr::wrap!());
            }
            offer::Status::Submitted | offer::Status::Viewed => {}
            offer::Status::Rejected
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

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent acceptances upon the same `Listing`.
        tx.execute(Lock(By::new(offer.listing_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut listing = tx
            .execute(Select(By::<Option<Listing>, _>::new(offer.listing_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ListingNotExists(offer.listing_id))
            .map_err(tracerr::wrap!())?;
        if !listing.is_active() {
            return Err(tracerr::new!(E::ListingNoLongerActive(listing.id)));
        }

        let mut offer = tx
            .execute(Select(By::<Option<Offer>, _>::new(offer_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::OfferNotExists(offer_id))
            .map_err(tracerr::wrap!())?;
        if !offer.is_open() {
            return Err(tracerr::new!(E::InvalidTransition(
                offer_id,
                offer.status,
            )));
        }

        let mut property = tx
            .execute(Select(By::<Option<Property>, _>::new(offer.property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PropertyNotExists(offer.property_id))
            .map_err(tracerr::wrap!())?;

        let now = DateTime::now();
        offer.status = offer::Status::Accepted;
        offer.seller_signed_at = Some(now.coerce());

        let transaction = Transaction::open(
            &offer,
            property.province,
            self.config().commission_rate,
            actor_id,
            now.coerce(),
        );

        let mut rejected = Vec::new();
        let others = tx
            .execute(Select(By::<Vec<read::offer::Open<Offer>>, _>::new(
                listing.id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        for read::offer::Open(mut other) in others {
            if other.id == offer.id {
                continue;
            }
            other.status = offer::Status::Rejected;
            rejected.push((other.id, other.buyer_id));
            tx.execute(Update(other))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
        }

        tx.execute(Update(offer.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(transaction.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        listing.status = listing::Status::Pending;
        tx.execute(Update(listing))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        property.status = property::Status::Pending;
        tx.execute(Update(property))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        self.notify(notifier::Event::OfferAccepted {
            offer_id: offer.id,
            transaction_id: transaction.id,
            buyer_id: offer.buyer_id,
        })
        .await;
        for (rejected_id, buyer_id) in rejected {
            self.notify(notifier::Event::OfferRejected {
                offer_id: rejected_id,
                buyer_id,
            })
            .await;
        }

        Ok(transaction)
    }
}

/// Error of [`AcceptOffer`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Offer`] cannot be accepted from its current status.
    #[display("`Offer(id: {_0})` cannot be accepted from `{_1}` status")]
    InvalidTransition(offer::Id, offer::Status),

    /// [`Listing`] went inactive before the acceptance took hold.
    #[display("`Listing(id: {_0})` is no longer active")]
    ListingNoLongerActive(#[error(not(source))] listing::Id),

    /// [`Listing`] with the provided ID does not exist.
    #[display("`Listing(id: {_0})` does not exist")]
    ListingNotExists(#[error(not(source))] listing::Id),

    /// [`User`] is not the seller of the [`Offer`].
    #[display("`User(id: {_0})` is not the seller of the `Offer`")]
    NotAuthorized(#[error(not(source))] user::Id),

    /// [`Offer`] passed its irrevocable deadline.
    #[display("`Offer(id: {_0})` has expired")]
    OfferExpired(#[error(not(source))] offer::Id),

    /// [`Offer`] with the provided ID does not exist.
    #[display("`Offer(id: {_0})` does not exist")]
    OfferNotExists(#[error(not(source))] offer::Id),

    /// [`Property`] with the provided ID does not exist.
    #[display("`Property(id: {_0})` does not exist")]
    PropertyNotExists(#[error(not(source))] property::Id),
}
