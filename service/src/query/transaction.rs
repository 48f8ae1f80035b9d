//! [`Query`] collection related to [`Transaction`]s.

use common::operations::By;

use crate::domain::{offer, transaction, Transaction};
#[cfg(doc)]
use crate::{domain::Offer, Query};

use super::DatabaseQuery;

/// Queries a [`Transaction`] by its [`transaction::Id`].
pub type ById = DatabaseQuery<By<Option<Transaction>, transaction::Id>>;

/// Queries a [`Transaction`] by the [`Offer`] it was created from.
pub type ByOffer = DatabaseQuery<By<Option<Transaction>, offer::Id>>;
