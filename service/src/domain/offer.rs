//! [`Offer`] definitions.

use std::str::FromStr;

use common::{define_kind, unit, DateTime, DateTimeOf, Money};
use derive_more::{
    AsRef, Display, From, FromStr as DeriveFromStr, Into,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{condition, listing, property, user};
#[cfg(doc)]
use crate::domain::{Listing, Property, User};

/// Negotiable proposal of a [`User`] to purchase a listed [`Property`].
///
/// Counter-offers reference their parent, forming an append-only tree
/// rooted at the first submitted [`Offer`] — the tree is the negotiation
/// audit history and is never pruned.
#[derive(Clone, Debug)]
pub struct Offer {
    /// ID of this [`Offer`].
    pub id: Id,

    /// ID of the [`Property`] this [`Offer`] is for.
    pub property_id: property::Id,

    /// ID of the [`Listing`] this [`Offer`] answers.
    pub listing_id: listing::Id,

    /// ID of the [`User`] proposing to buy.
    pub buyer_id: user::Id,

    /// ID of the [`User`] this [`Offer`] is addressed to.
    pub seller_id: user::Id,

    /// Proposed purchase price.
    pub price: Money,

    /// Proposed deposit amount.
    pub deposit: Money,

    /// [`DateTimeOf`] the deposit is due by.
    pub deposit_due_at: DepositDueDateTime,

    /// [`DateTimeOf`] until which this [`Offer`] is irrevocable.
    ///
    /// Past this moment an open [`Offer`] is expired for all transition
    /// purposes; expiry is evaluated lazily at each attempted transition,
    /// never stored.
    pub irrevocable_at: IrrevocableDateTime,

    /// Proposed closing [`DateTimeOf`], strictly after
    /// [`Offer::irrevocable_at`].
    pub closing_at: ClosingDateTime,

    /// Ordered condition [`Term`]s this [`Offer`] carries.
    pub terms: Vec<Term>,

    /// Chattels included in the sale.
    pub inclusions: Vec<Item>,

    /// Fixtures excluded from the sale.
    pub exclusions: Vec<Item>,

    /// [`Status`] of this [`Offer`].
    pub status: Status,

    /// ID of the [`Offer`] this one counters, if any.
    ///
    /// Always points at an earlier, already-terminal node of the tree.
    pub parent_offer: Option<Id>,

    /// ID of the counter-[`Offer`] that superseded this one, if any.
    pub countered_by: Option<Id>,

    /// [`DateTimeOf`] when the buyer signed this [`Offer`].
    pub buyer_signed_at: Option<SignatureDateTime>,

    /// [`DateTimeOf`] when the seller signed this [`Offer`].
    pub seller_signed_at: Option<SignatureDateTime>,

    /// [`DateTimeOf`] when this [`Offer`] was submitted.
    pub created_at: CreationDateTime,
}

impl Offer {
    /// Returns whether this [`Offer`] is still open to transitions.
    ///
    /// Note, that an open [`Offer`] may already be expired; see
    /// [`Offer::is_expired()`].
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self.status, Status::Submitted | Status::Viewed)
    }

    /// Returns whether this [`Offer`] passed its irrevocable deadline
    /// while still open.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_open() && DateTime::now().coerce() > self.irrevocable_at
    }

    /// Returns whether this [`Offer`] reached a terminal [`Status`].
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !self.is_open()
    }

    /// Returns whether the provided [`User`] is the buyer on this [`Offer`].
    #[must_use]
    pub fn is_buyer(&self, user_id: user::Id) -> bool {
        self.buyer_id == user_id
    }

    /// Returns whether the provided [`User`] is the seller on this [`Offer`].
    #[must_use]
    pub fn is_seller(&self, user_id: user::Id) -> bool {
        self.seller_id == user_id
    }
}

/// ID of an [`Offer`].
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

define_kind! {
    #[doc = "Status of an [`Offer`]."]
    enum Status {
        #[doc = "The [`Offer`] was submitted and awaits the seller."]
        Submitted = 1,

        #[doc = "The seller has read the [`Offer`]."]
        Viewed = 2,

        #[doc = "The seller accepted the [`Offer`]."]
        Accepted = 3,

        #[doc = "The seller rejected the [`Offer`]."]
        Rejected = 4,

        #[doc = "The [`Offer`] was superseded by a counter-offer."]
        Countered = 5,

        #[doc = "The buyer withdrew the [`Offer`]."]
        Withdrawn = 6,
    }
}

/// Condition term carried by an [`Offer`].
///
/// Terms are blueprints: they become live [`Condition`]s, with concrete
/// deadlines, on the transaction created at acceptance.
///
/// [`Condition`]: crate::domain::Condition
#[derive(Clone, Debug)]
pub struct Term {
    /// Kind of the condition this [`Term`] introduces.
    pub kind: condition::Kind,

    /// Free-text description of the condition.
    pub description: condition::Description,

    /// Days from acceptance the condition must be resolved within.
    pub days_to_deadline: u16,
}

/// Single chattel or fixture named by an [`Offer`]'s inclusion/exclusion
/// lists.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Item(String);

impl Item {
    /// Creates a new [`Item`] if the given `item` is valid.
    #[must_use]
    pub fn new(item: impl Into<String>) -> Option<Self> {
        let item = item.into();
        Self::check(&item).then_some(Self(item))
    }

    /// Checks whether the given `item` is a valid [`Item`].
    fn check(item: impl AsRef<str>) -> bool {
        let item = item.as_ref();
        item.trim() == item && !item.is_empty() && item.len() <= 256
    }
}

impl FromStr for Item {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Item`")
    }
}

/// [`DateTimeOf`] when an [`Offer`] was submitted.
pub type CreationDateTime = DateTimeOf<(Offer, unit::Creation)>;

/// Marker type indicating [`Offer`] irrevocability.
#[derive(Clone, Copy, Debug)]
pub struct Irrevocability;

/// [`DateTimeOf`] until which an [`Offer`] is irrevocable.
pub type IrrevocableDateTime = DateTimeOf<(Offer, Irrevocability)>;

/// Marker type indicating a proposed closing.
#[derive(Clone, Copy, Debug)]
pub struct Closing;

/// [`DateTimeOf`] an [`Offer`] proposes to close on.
pub type ClosingDateTime = DateTimeOf<(Offer, Closing)>;

/// Marker type indicating a deposit due date.
#[derive(Clone, Copy, Debug)]
pub struct DepositDue;

/// [`DateTimeOf`] an [`Offer`]'s deposit is due by.
pub type DepositDueDateTime = DateTimeOf<(Offer, DepositDue)>;

/// Marker type indicating an [`Offer`] signature.
#[derive(Clone, Copy, Debug)]
pub struct Signature;

/// [`DateTimeOf`] when a party signed an [`Offer`].
pub type SignatureDateTime = DateTimeOf<(Offer, Signature)>;

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::{DateTime, Money};
    use rust_decimal::Decimal;

    use crate::domain::{listing, property, user};

    use super::{Id, Offer, Status};

    fn offer(status: Status, irrevocable_in: i64) -> Offer {
        let now = DateTime::now();
        let irrevocable_at = if irrevocable_in >= 0 {
            now + Duration::from_secs(irrevocable_in.unsigned_abs())
        } else {
            now - Duration::from_secs(irrevocable_in.unsigned_abs())
        };
        Offer {
            id: Id::new(),
            property_id: property::Id::new(),
            listing_id: listing::Id::new(),
            buyer_id: user::Id::new(),
            seller_id: user::Id::new(),
            price: Money::cad(Decimal::new(500_000, 0)),
            deposit: Money::cad(Decimal::new(25_000, 0)),
            deposit_due_at: now.coerce(),
            irrevocable_at: irrevocable_at.coerce(),
            closing_at: (now + Duration::from_secs(86_400 * 60)).coerce(),
            terms: Vec::new(),
            inclusions: Vec::new(),
            exclusions: Vec::new(),
            status,
            parent_offer: None,
            countered_by: None,
            buyer_signed_at: Some(now.coerce()),
            seller_signed_at: None,
            created_at: now.coerce(),
        }
    }

    #[test]
    fn expiry_is_a_lazy_predicate() {
        assert!(offer(Status::Submitted, -1).is_expired());
        assert!(offer(Status::Viewed, -1).is_expired());
        assert!(!offer(Status::Submitted, 3600).is_expired());

        // Terminal offers never report as expired.
        assert!(!offer(Status::Accepted, -1).is_expired());
        assert!(!offer(Status::Rejected, -1).is_expired());
    }

    #[test]
    fn openness_tracks_status() {
        assert!(offer(Status::Submitted, 3600).is_open());
        assert!(offer(Status::Viewed, 3600).is_open());
        assert!(offer(Status::Countered, 3600).is_terminal());
        assert!(offer(Status::Withdrawn, 3600).is_terminal());
    }
}
