//! [`Listing`] definitions.

use common::{define_kind, unit, DateTimeOf, Money};
use derive_more::{Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{property, user};
#[cfg(doc)]
use crate::domain::{Offer, Property, Transaction, User};

/// Public offering of a [`Property`] for sale, receiving [`Offer`]s.
#[derive(Clone, Debug)]
pub struct Listing {
    /// ID of this [`Listing`].
    pub id: Id,

    /// ID of the [`Property`] this [`Listing`] offers.
    pub property_id: property::Id,

    /// ID of the [`User`] selling the [`Property`].
    pub seller_id: user::Id,

    /// Price the [`Property`] is listed at.
    pub list_price: Money,

    /// [`Status`] of this [`Listing`].
    pub status: Status,

    /// Price the [`Property`] was sold for, stamped on completion of the
    /// [`Transaction`].
    pub sale_price: Option<Money>,

    /// [`DateTimeOf`] when the sale completed, stamped together with
    /// [`Listing::sale_price`].
    pub sold_at: Option<SaleDateTime>,

    /// [`DateTimeOf`] when this [`Listing`] was published.
    pub created_at: CreationDateTime,
}

impl Listing {
    /// Returns whether this [`Listing`] is open to new [`Offer`]s.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == Status::Active
    }
}

/// ID of a [`Listing`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

define_kind! {
    #[doc = "Status of a [`Listing`]."]
    enum Status {
        #[doc = "The [`Listing`] accepts new offers."]
        Active = 1,

        #[doc = "An accepted offer holds the [`Listing`]."]
        Pending = 2,

        #[doc = "The [`Listing`] completed with a sale."]
        Sold = 3,
    }
}

/// [`DateTimeOf`] when a [`Listing`] was published.
pub type CreationDateTime = DateTimeOf<(Listing, unit::Creation)>;

/// Marker type indicating a completed sale.
#[derive(Clone, Copy, Debug)]
pub struct Sale;

/// [`DateTimeOf`] when a [`Listing`] was sold.
pub type SaleDateTime = DateTimeOf<(Listing, Sale)>;
