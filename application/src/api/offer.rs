//! [`Offer`]-related definitions.

use std::{future, num::TryFromIntError};

use common::{DateTime, DateTimeOf, Handler as _, Money};
use derive_more::{AsRef, Display, From, Into};
use futures::TryFutureExt as _;
use juniper::{
    graphql_object, GraphQLEnum, GraphQLInputObject, GraphQLScalar,
};
use service::{domain, query};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{api, api::scalar, AsError, Context, Error};

/// An offer to purchase a listed property.
#[derive(Clone, Debug)]
pub struct Offer {
    /// ID of this [`Offer`].
    id: Id,

    /// Underlying [`domain::Offer`].
    offer: OnceCell<domain::Offer>,
}

impl From<domain::Offer> for Offer {
    fn from(offer: domain::Offer) -> Self {
        Self {
            id: offer.id.into(),
            offer: OnceCell::new_with(Some(offer)),
        }
    }
}

impl Offer {
    /// Creates a new [`Offer`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`Offer`] with the provided ID exists,
    /// otherwise accessing this [`Offer`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            offer: OnceCell::new(),
        }
    }

    /// Returns the underlying [`domain::Offer`].
    ///
    /// # Errors
    ///
    /// Errors if the [`domain::Offer`] doesn't exist.
    async fn offer(&self, ctx: &Context) -> Result<&domain::Offer, Error> {
        let id = self.id.into();
        self.offer
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::offer::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|o| {
                        future::ready(o.ok_or_else(|| {
                            api::query::OfferError::NotExists.into()
                        }))
                    })
            })
            .await
    }
}

/// An offer to purchase a listed property.
#[graphql_object(context = Context)]
impl Offer {
    /// Unique identifier of this `Offer`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Offer.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// ID of the `Property` this `Offer` is for.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Offer.propertyId",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn property_id(
        &self,
        ctx: &Context,
    ) -> Result<api::property::Id, Error> {
        Ok(self.offer(ctx).await?.property_id.into())
    }

    /// ID of the `Listing` this `Offer` answers.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Offer.listingId",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn listing_id(
        &self,
        ctx: &Context,
    ) -> Result<api::listing::Id, Error> {
        Ok(self.offer(ctx).await?.listing_id.into())
    }

    /// ID of the `User` proposing to buy.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Offer.buyerId",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn buyer_id(&self, ctx: &Context) -> Result<api::user::Id, Error> {
        Ok(self.offer(ctx).await?.buyer_id.into())
    }

    /// ID of the `User` this `Offer` is addressed to.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Offer.sellerId",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn seller_id(
        &self,
        ctx: &Context,
    ) -> Result<api::user::Id, Error> {
        Ok(self.offer(ctx).await?.seller_id.into())
    }

    /// Proposed purchase price.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Offer.price",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn price(&self, ctx: &Context) -> Result<Money, Error> {
        Ok(self.offer(ctx).await?.price)
    }

    /// Proposed deposit amount.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Offer.deposit",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn deposit(&self, ctx: &Context) -> Result<Money, Error> {
        Ok(self.offer(ctx).await?.deposit)
    }

    /// `DateTime` the deposit is due by.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Offer.depositDueAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn deposit_due_at(
        &self,
        ctx: &Context,
    ) -> Result<DateTime, Error> {
        Ok(self.offer(ctx).await?.deposit_due_at.coerce())
    }

    /// `DateTime` until which this `Offer` is irrevocable.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Offer.irrevocableAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn irrevocable_at(
        &self,
        ctx: &Context,
    ) -> Result<DateTime, Error> {
        Ok(self.offer(ctx).await?.irrevocable_at.coerce())
    }

    /// Proposed closing `DateTime`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Offer.closingAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn closing_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.offer(ctx).await?.closing_at.coerce())
    }

    /// Condition terms this `Offer` carries.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Offer.terms",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn terms(&self, ctx: &Context) -> Result<Vec<Term>, Error> {
        Ok(self
            .offer(ctx)
            .await?
            .terms
            .iter()
            .cloned()
            .map(Into::into)
            .collect())
    }

    /// Chattels included in the sale.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Offer.inclusions",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn inclusions(&self, ctx: &Context) -> Result<Vec<Item>, Error> {
        Ok(self
            .offer(ctx)
            .await?
            .inclusions
            .iter()
            .cloned()
            .map(Into::into)
            .collect())
    }

    /// Fixtures excluded from the sale.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Offer.exclusions",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn exclusions(&self, ctx: &Context) -> Result<Vec<Item>, Error> {
        Ok(self
            .offer(ctx)
            .await?
            .exclusions
            .iter()
            .cloned()
            .map(Into::into)
            .collect())
    }

    /// Status of this `Offer`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Offer.status",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn status(&self, ctx: &Context) -> Result<Status, Error> {
        Ok(self.offer(ctx).await?.status.into())
    }

    /// `Offer` this one counters, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Offer.parentOffer",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn parent_offer(
        &self,
        ctx: &Context,
    ) -> Result<Option<Offer>, Error> {
        Ok(self.offer(ctx).await?.parent_offer.map(|id| {
            #[expect(
                unsafe_code,
                reason = "`parent_offer` of a stored `Offer` always points \
                          at an existing one"
            )]
            unsafe {
                Self::new_unchecked(id)
            }
        }))
    }

    /// Counter-`Offer` that superseded this one, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Offer.counteredBy",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn countered_by(
        &self,
        ctx: &Context,
    ) -> Result<Option<Offer>, Error> {
        Ok(self.offer(ctx).await?.countered_by.map(|id| {
            #[expect(
                unsafe_code,
                reason = "`countered_by` of a stored `Offer` always points \
                          at an existing one"
            )]
            unsafe {
                Self::new_unchecked(id)
            }
        }))
    }

    /// `DateTime` when the buyer signed this `Offer`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Offer.buyerSignedAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn buyer_signed_at(
        &self,
        ctx: &Context,
    ) -> Result<Option<DateTime>, Error> {
        Ok(self.offer(ctx).await?.buyer_signed_at.map(DateTimeOf::coerce))
    }

    /// `DateTime` when the seller signed this `Offer`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Offer.sellerSignedAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn seller_signed_at(
        &self,
        ctx: &Context,
    ) -> Result<Option<DateTime>, Error> {
        Ok(self
            .offer(ctx)
            .await?
            .seller_signed_at
            .map(DateTimeOf::coerce))
    }

    /// Indicator whether this `Offer` passed its irrevocable deadline while
    /// still open.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Offer.isExpired",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn is_expired(&self, ctx: &Context) -> Result<bool, Error> {
        Ok(self.offer(ctx).await?.is_expired())
    }

    /// `DateTime` when this `Offer` was submitted.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Offer.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.offer(ctx).await?.created_at.coerce())
    }
}

/// Condition term carried by an `Offer`.
#[derive(Clone, Debug, From, Into)]
pub struct Term(domain::offer::Term);

/// Condition term carried by an `Offer`.
#[graphql_object(name = "OfferTerm", context = Context)]
impl Term {
    /// Kind of the condition this `OfferTerm` introduces.
    #[must_use]
    pub fn kind(&self) -> api::condition::Kind {
        self.0.kind.into()
    }

    /// Free-text description of the condition.
    #[must_use]
    pub fn description(&self) -> api::condition::Description {
        self.0.description.clone().into()
    }

    /// Days from acceptance the condition must be resolved within.
    #[must_use]
    pub fn days_to_deadline(&self) -> i32 {
        self.0.days_to_deadline.into()
    }
}

/// Condition term of a new `Offer`.
#[derive(Clone, Debug, GraphQLInputObject)]
#[graphql(name = "OfferTermInput")]
pub struct TermInput {
    /// Kind of the condition this term introduces.
    pub kind: api::condition::Kind,

    /// Free-text description of the condition.
    pub description: api::condition::Description,

    /// Days from acceptance the condition must be resolved within.
    pub days_to_deadline: i32,
}

impl TryFrom<TermInput> for domain::offer::Term {
    type Error = TryFromIntError;

    fn try_from(term: TermInput) -> Result<Self, Self::Error> {
        Ok(Self {
            kind: term.kind.into(),
            description: term.description.into(),
            days_to_deadline: term.days_to_deadline.try_into()?,
        })
    }
}

/// Unique identifier of an `Offer`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::offer::Id)]
#[into(domain::offer::Id)]
#[graphql(name = "OfferId", transparent)]
pub struct Id(Uuid);

/// Status of an `Offer`.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "OfferStatus")]
pub enum Status {
    /// The `Offer` was submitted and awaits the seller.
    Submitted,

    /// The seller has read the `Offer`.
    Viewed,

    /// The seller accepted the `Offer`.
    Accepted,

    /// The seller rejected the `Offer`.
    Rejected,

    /// The `Offer` was superseded by a counter-offer.
    Countered,

    /// The buyer withdrew the `Offer`.
    Withdrawn,
}

impl From<domain::offer::Status> for Status {
    fn from(status: domain::offer::Status) -> Self {
        use domain::offer::Status as S;
        match status {
            S::Submitted => Self::Submitted,
            S::Viewed => Self::Viewed,
            S::Accepted => Self::Accepted,
            S::Rejected => Self::Rejected,
            S::Countered => Self::Countered,
            S::Withdrawn => Self::Withdrawn,
        }
    }
}

/// Single chattel or fixture named by an `Offer`'s inclusion/exclusion
/// lists.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "OfferItem",
    with = scalar::Via::<domain::offer::Item>,
)]
pub struct Item(domain::offer::Item);
