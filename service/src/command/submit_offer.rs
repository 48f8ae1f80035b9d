//! [`Command`] for submitting a new [`Offer`] on a [`Listing`].

use common::{
    operations::{By, Insert, Select},
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

/// [`Command`] for submitting a new [`Offer`] on a [`Listing`].
#[derive(Clone, Debug)]
pub struct SubmitOffer {
    /// ID of the [`Listing`] the [`Offer`] answers.
    pub listing_id: listing::Id,

    /// ID of the buying [`User`] submitting the [`Offer`].
    pub buyer_id: user::Id,

    /// Proposed purchase price.
    pub price: Money,

    /// Proposed deposit amount.
    pub deposit: Money,

    /// [`DateTime`] the deposit is due by.
    pub deposit_due_at: offer::DepositDueDateTime,

    /// [`DateTime`] until which the [`Offer`] stays irrevocable.
    pub irrevocable_at: offer::IrrevocableDateTime,

    /// Proposed closing [`DateTime`].
    pub closing_at: offer::ClosingDateTime,

    /// Condition [`offer::Term`]s the [`Offer`] carries.
    pub terms: Vec<offer::Term>,

    /// Chattels included in the sale.
    pub inclusions: Vec<offer::Item>,

    /// Fixtures excluded from the sale.
    pub exclusions: Vec<offer::Item>,
}

impl<Db, Nf, Pm> Command<SubmitOffer> for Service<Db, Nf, Pm>
where
    Db: Database<
            Select<By<Option<Listing>, listing::Id>>,
            Ok = Option<Listing>,
            Err = Traced<database::Error>,
        > + Database<Insert<Offer>, Ok = (), Err = Traced<database::Error>>,
    Nf: Notifier<notifier::Notify, Ok = (), Err: std::fmt::Display>,
{
    type Ok = Offer;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: SubmitOffer) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SubmitOffer {
            listing_id,
            buyer_id,
            price,
            deposit,
            deposit_due_at,
            irrevocable_at,
            closing_at,
            terms,
            inclusions,
            exclusions,
        } = cmd;

        if !price.is_positive() || deposit.is_negative() {
            return Err(tracerr::new!(E::InvalidPrice));
        }
        let now = DateTime::now();
        if irrevocable_at <= now.coerce() || closing_at <= irrevocable_at.coerce()
        {
            return Err(tracerr::new!(E::InvalidDateOrdering));
        }

        let listing = self
            .database()
            .execute(Select(By::<Option<Listing>, _>::new(listing_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ListingNotExists(listing_id))
            .map_err(tracerr::wrap!())?;
        if !listing.is_active() {
            return Err(tracerr::new!(E::ListingNotActive(listing_id)));
        }

        let offer = Offer {
            id: offer::Id::new(),
            property_id: listing.property_id,
            listing_id: listing.id,
            buyer_id,
            seller_id: listing.seller_id,
            price,
            deposit,
            deposit_due_at,
            irrevocable_at,
            closing_at,
            terms,
            inclusions,
            exclusions,
            status: offer::Status::Submitted,
            parent_offer: None,
            countered_by: None,
            buyer_signed_at: Some(now.coerce()),
            seller_signed_at: None,
            created_at: now.coerce(),
        };
        self.database()
            .execute(Insert(offer.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        self.notify(notifier::Event::OfferReceived {
            offer_id: offer.id,
            listing_id: listing.id,
            seller_id: listing.seller_id,
        })
        .await;

        Ok(offer)
    }
}

/// Error of [`SubmitOffer`] [`Command`] execution.
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

    /// [`Listing`] with the provided ID is not active anymore.
    #[display("`Listing(id: {_0})` is no longer active")]
    ListingNotActive(#[error(not(source))] listing::Id),

    /// [`Listing`] with the provided ID does not exist.
    #[display("`Listing(id: {_0})` does not exist")]
    ListingNotExists(#[error(not(source))] listing::Id),
}
