//! GraphQL [`Query`]s definitions.

use common::Money;
use juniper::graphql_object;
use service::{domain, query, Query as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

#[graphql_object(context = Context)]
impl Query {
    /// Returns the `Offer` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_FOUND` - the `Offer` with the specified ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "offer",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn offer(
        id: api::offer::Id,
        ctx: &Context,
    ) -> Result<api::Offer, Error> {
        ctx.service()
            .execute(query::offer::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| OfferError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the open `Offer`s on the specified `Listing`, oldest first.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_FOUND` - the `Listing` with the specified ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "openOffers",
            listing_id = %listing_id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn open_offers(
        listing_id: api::listing::Id,
        ctx: &Context,
    ) -> Result<Vec<api::Offer>, Error> {
        let listing_id = listing_id.into();

        let _ = ctx
            .service()
            .execute(query::listing::ById::by(listing_id))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| ListingError::NotExists.into())
            .map_err(ctx.error())?;

        ctx.service()
            .execute(query::offer::OpenByListing::by(listing_id))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|open| open.into_iter().map(|o| o.0.into()).collect())
    }

    /// Returns the `Listing` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_FOUND` - the `Listing` with the specified ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "listing",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn listing(
        id: api::listing::Id,
        ctx: &Context,
    ) -> Result<api::Listing, Error> {
        ctx.service()
            .execute(query::listing::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| ListingError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `Transaction` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_FOUND` - the `Transaction` with the specified ID does not
    ///                 exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "transaction",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn transaction(
        id: api::transaction::Id,
        ctx: &Context,
    ) -> Result<api::Transaction, Error> {
        ctx.service()
            .execute(query::transaction::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| TransactionError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `Transaction` created from the `Offer` with the specified
    /// ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_FOUND` - no `Transaction` was created from the `Offer` with
    ///                 the specified ID.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "transactionByOffer",
            offer_id = %offer_id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn transaction_by_offer(
        offer_id: api::offer::Id,
        ctx: &Context,
    ) -> Result<api::Transaction, Error> {
        ctx.service()
            .execute(query::transaction::ByOffer::by(offer_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| TransactionError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Calculates the land-transfer tax owed on purchasing a property in the
    /// specified province at the specified price.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `UNKNOWN_JURISDICTION` - the provided province code is not a known
    ///                            Canadian jurisdiction.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "landTransferTax",
            options = ?options,
            price = price.to_string(),
            province = %province,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn land_transfer_tax(
        province: String,
        price: Money,
        options: Option<api::jurisdiction::TaxOptions>,
        ctx: &Context,
    ) -> Result<api::jurisdiction::TaxBreakdown, Error> {
        let province = province
            .parse::<domain::jurisdiction::Province>()
            .map_err(|_| api::jurisdiction::ProvinceError::Unknown.into())
            .map_err(ctx.error())?;

        ctx.service()
            .execute(query::closing_costs::LandTransferTax {
                province,
                price,
                options: options.map(Into::into).unwrap_or_default(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Estimates the full closing costs of purchasing a property in the
    /// specified province at the specified price.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `UNKNOWN_JURISDICTION` - the provided province code is not a known
    ///                            Canadian jurisdiction.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "closingCostEstimate",
            options = ?options,
            price = price.to_string(),
            province = %province,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn closing_cost_estimate(
        province: String,
        price: Money,
        options: Option<api::jurisdiction::TaxOptions>,
        ctx: &Context,
    ) -> Result<api::jurisdiction::ClosingCostEstimate, Error> {
        let province = province
            .parse::<domain::jurisdiction::Province>()
            .map_err(|_| api::jurisdiction::ProvinceError::Unknown.into())
            .map_err(ctx.error())?;

        ctx.service()
            .execute(query::closing_costs::EstimateClosingCosts {
                province,
                price,
                options: options.map(Into::into).unwrap_or_default(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

define_error! {
    enum ListingError {
        #[code = "NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "`Listing` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum OfferError {
        #[code = "NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "`Offer` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum TransactionError {
        #[code = "NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "`Transaction` with the specified ID does not exist"]
        NotExists,
    }
}
