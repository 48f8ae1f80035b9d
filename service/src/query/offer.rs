//! [`Query`] collection related to [`Offer`]s.

use common::operations::By;

use crate::{
    domain::{listing, offer, Offer},
    read,
};
#[cfg(doc)]
use crate::{domain::Listing, Query};

use super::DatabaseQuery;

/// Queries an [`Offer`] by its [`offer::Id`].
pub type ById = DatabaseQuery<By<Option<Offer>, offer::Id>>;

/// Queries the open [`Offer`]s on a [`Listing`], oldest first.
pub type OpenByListing =
    DatabaseQuery<By<Vec<read::offer::Open<Offer>>, listing::Id>>;
