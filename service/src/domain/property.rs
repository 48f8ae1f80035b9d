//! [`Property`] definitions.

use std::str::FromStr;

use common::{define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr as DeriveFromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::jurisdiction::Province;

/// Real property a [`Listing`] offers for sale.
///
/// [`Listing`]: crate::domain::Listing
#[derive(Clone, Debug)]
pub struct Property {
    /// ID of this [`Property`].
    pub id: Id,

    /// Civic [`Address`] of this [`Property`].
    pub address: Address,

    /// [`Province`] this [`Property`] is located in.
    ///
    /// Drives land-transfer tax and closing-cost rules.
    pub province: Province,

    /// [`Status`] of this [`Property`].
    pub status: Status,

    /// [`DateTimeOf`] when this [`Property`] was registered.
    pub created_at: CreationDateTime,
}

/// ID of a [`Property`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    DeriveFromStr,
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

/// Civic address of a [`Property`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Address(String);

impl Address {
    /// Creates a new [`Address`] without performing any validation.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `address` is not empty.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Creates a new [`Address`] if the given `address` is valid.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`Address`].
    fn check(address: impl AsRef<str>) -> bool {
        let address = address.as_ref();
        address.trim() == address
            && !address.is_empty()
            && address.len() <= 512
    }
}

impl FromStr for Address {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Address`")
    }
}

define_kind! {
    #[doc = "Status of a [`Property`]."]
    enum Status {
        #[doc = "The [`Property`] is open to new offers."]
        Active = 1,

        #[doc = "An offer on the [`Property`] has been accepted."]
        Pending = 2,

        #[doc = "The [`Property`] has been sold."]
        Sold = 3,
    }
}

/// [`DateTimeOf`] when a [`Property`] was registered.
pub type CreationDateTime = DateTimeOf<(Property, unit::Creation)>;
