//! [`Command`] for countering an [`Offer`].

use common::{
    operations::{
        By, Commit, Insert, Lock, Select, Transact, Transacted, Update,
    },
    DateTime, Money,
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

/// [`Command`] for countering an [`Offer`].
///
/// Counters the [`Offer`] with a new one, swapping the negotiating roles:
/// the countering party becomes the proposer. The parent goes terminal
/// ([`offer::Status::Countered`]) and keeps a pointer to its counter,
/// extending the negotiation tree. Fields left unset are inherited from
/// the parent.
#[derive(Clone, Debug)]
pub struct CounterOffer {
    /// ID of the [`Offer`] to counter.
    pub offer_id: offer::Id,

    /// ID of the [`User`] countering the [`Offer`].
    pub actor_id: user::Id,

    /// New purchase price, if changed.
    pub price: Option<Money>,

    /// New deposit amount, if changed.
    pub deposit: Option<Money>,

    /// New deposit due [`DateTime`], if changed.
    pub deposit_due_at: Option<offer::DepositDueDateTime>,

    /// New irrevocable [`DateTime`], if changed.
    pub irrevocable_at: Option<offer::IrrevocableDateTime>,

    /// New closing [`DateTime`], if changed.
    pub closing_at: Option<offer::ClosingDateTime>,

    /// New condition [`offer::Term`]s, if changed.
    pub terms: Option<Vec<offer::Term>>,

    /// New inclusions, if changed.
    pub inclusions: Option<Vec<offer::Item>>,

    /// New exclusions, if changed.
    pub exclusions: Option<Vec<offer::Item>>,
}

impl<Db, Nf, Pm> Command<CounterOffer> for Service<Db, Nf, Pm>
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
            Select<By<Option<Listing>, listing::Id>>,
            Ok = Option<Listing>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Offer>, offer::Id>>,
            Ok = Option<Offer>,
            Err = Traced<database::Error>,
        > + Database<Insert<Offer>, Ok = (), Err = Traced<database::Error>>
        + Database<Update<Offer>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
    Nf: Notifier<notifier::Notify, Ok = (), Err: std::fmt::Display>,
{
    type Ok = Offer;
    type Err = Traced<ExecutionError>;

    #[expect(clippy::too_many_lines, reason = "still readable")]
    async fn execute(
        &self,
        cmd: CounterOffer,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CounterOffer {
            offer_id,
            actor_id,
            price,
            deposit,
            deposit_due_at,
            irrevocable_at,
            closing_at,
            terms,
            inclusions,
            exclusions,
        } = cmd;

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

        let price = price.unwrap_or(offer.price);
        let deposit = deposit.unwrap_or(offer.deposit);
        if !price.is_positive() || deposit.is_negative() {
            return Err(tracerr::new!(E::InvalidPrice));
        }
        let now = DateTime::now();
        let irrevocable_at = irrevocable_at.unwrap_or(offer.irrevocable_at);
        let closing_at = closing_at.unwrap_or(offer.closing_at);
        if irrevocable_at <= now.coerce()
            || closing_at <= irrevocable_at.coerce()
        {
            return Err(tracerr::new!(E::InvalidDateOrdering));
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

        let listing = tx
            .execute(Select(By::<Option<Listing>, _>::new(offer.listing_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ListingNotExists(offer.listing_id))
            .map_err(tracerr::wrap!())?;
        if !listing.is_active() {
            return Err(tracerr::new!(E::ListingNoLongerActive(listing.id)));
        }

        let mut parent = tx
            .execute(Select(By::<Option<Offer>, _>::new(offer_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::OfferNotExists(offer_id))
            .map_err(tracerr::wrap!())?;
        if !parent.is_open() {
            return Err(tracerr::new!(E::InvalidTransition(
                offer_id,
                parent.status,
            )));
        }
        if parent.is_expired() {
            return Err(tracerr::new!(E::OfferExpired(offer_id)));
        }

        let counter = Offer {
            id: offer::Id::new(),
            property_id: parent.property_id,
            listing_id: parent.listing_id,
            // The countering party becomes the proposer.
            buyer_id: parent.seller_id,
            seller_id: parent.buyer_id,
            price,
            deposit,
            deposit_due_at: deposit_due_at.unwrap_or(parent.deposit_due_at),
            irrevocable_at,
            closing_at,
            terms: terms.unwrap_or_else(|| parent.terms.clone()),
            inclusions: inclusions
                .unwrap_or_else(|| parent.inclusions.clone()),
            exclusions: exclusions
                .unwrap_or_else(|| parent.exclusions.clone()),
            status: offer::Status::Submitted,
            parent_offer: Some(parent.id),
            countered_by: None,
            buyer_signed_at: Some(now.coerce()),
            seller_signed_at: None,
            created_at: now.coerce(),
        };

        parent.status = offer::Status::Countered;
        parent.countered_by = Some(counter.id);
        tx.execute(Update(parent))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(counter.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        self.notify(notifier::Event::OfferReceived {
            offer_id: counter.id,
            listing_id: counter.listing_id,
            seller_id: counter.seller_id,
        })
        .await;

        Ok(counter)
    }
}

/// Error of [`CounterOffer`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Irrevocable and closing dates are not ordered into the future.
    #[display(
        "irrevocable date must be in the future and precede the closing date"
    )]
    InvalidDateOrdering,

    /// Price is not positive, or deposit is negative.
    #[display("price must be positive and deposit non-negative")]
    InvalidPrice,

    /// [`Offer`] cannot be countered from its current status.
    #[display("`Offer(id: {_0})` cannot be countered from `{_1}` status")]
    InvalidTransition(offer::Id, offer::Status),

    /// [`Listing`] went inactive before the counter took hold.
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
}
