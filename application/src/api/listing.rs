//! [`Listing`]-related definitions.

use std::future;

use common::{DateTime, DateTimeOf, Handler as _, Money};
use derive_more::{Display, From, Into};
use futures::TryFutureExt as _;
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::{domain, query};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{api, AsError, Context, Error};

/// Public offering of a property for sale.
#[derive(Clone, Debug)]
pub struct Listing {
    /// ID of this [`Listing`].
    id: Id,

    /// Underlying [`domain::Listing`].
    listing: OnceCell<domain::Listing>,
}

impl From<domain::Listing> for Listing {
    fn from(listing: domain::Listing) -> Self {
        Self {
            id: listing.id.into(),
            listing: OnceCell::new_with(Some(listing)),
        }
    }
}

impl Listing {
    /// Creates a new [`Listing`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`Listing`] with the provided ID exists,
    /// otherwise accessing this [`Listing`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            listing: OnceCell::new(),
        }
    }

    /// Returns the underlying [`domain::Listing`].
    ///
    /// # Errors
    ///
    /// Errors if the [`domain::Listing`] doesn't exist.
    async fn listing(&self, ctx: &Context) -> Result<&domain::Listing, Error> {
        let id = self.id.into();
        self.listing
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::listing::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|l| {
                        future::ready(l.ok_or_else(|| {
                            api::query::ListingError::NotExists.into()
                        }))
                    })
            })
            .await
    }
}

/// Public offering of a property for sale.
#[graphql_object(context = Context)]
impl Listing {
    /// Unique identifier of this `Listing`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// ID of the `Property` this `Listing` offers.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.propertyId",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn property_id(
        &self,
        ctx: &Context,
    ) -> Result<api::property::Id, Error> {
        Ok(self.listing(ctx).await?.property_id.into())
    }

    /// ID of the `User` selling the `Property`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.sellerId",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn seller_id(
        &self,
        ctx: &Context,
    ) -> Result<api::user::Id, Error> {
        Ok(self.listing(ctx).await?.seller_id.into())
    }

    /// Price the `Property` is listed at.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.listPrice",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn list_price(&self, ctx: &Context) -> Result<Money, Error> {
        Ok(self.listing(ctx).await?.list_price)
    }

    /// Status of this `Listing`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.status",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn status(&self, ctx: &Context) -> Result<Status, Error> {
        Ok(self.listing(ctx).await?.status.into())
    }

    /// Price the `Property` was sold for, once the sale completed.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.salePrice",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn sale_price(
        &self,
        ctx: &Context,
    ) -> Result<Option<Money>, Error> {
        Ok(self.listing(ctx).await?.sale_price)
    }

    /// `DateTime` when the sale completed.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.soldAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn sold_at(
        &self,
        ctx: &Context,
    ) -> Result<Option<DateTime>, Error> {
        Ok(self.listing(ctx).await?.sold_at.map(DateTimeOf::coerce))
    }

    /// `DateTime` when this `Listing` was published.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.listing(ctx).await?.created_at.coerce())
    }
}

/// Unique identifier of a `Listing`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::listing::Id)]
#[into(domain::listing::Id)]
#[graphql(name = "ListingId", transparent)]
pub struct Id(Uuid);

/// Status of a `Listing`.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "ListingStatus")]
pub enum Status {
    /// The `Listing` accepts new offers.
    Active,

    /// An accepted offer holds the `Listing`.
    Pending,

    /// The `Listing` completed with a sale.
    Sold,
}

impl From<domain::listing::Status> for Status {
    fn from(status: domain::listing::Status) -> Self {
        use domain::listing::Status as S;
        match status {
            S::Active => Self::Active,
            S::Pending => Self::Pending,
            S::Sold => Self::Sold,
        }
    }
}
