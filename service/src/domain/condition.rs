//! [`Condition`] definitions.

use std::str::FromStr;

use common::{define_kind, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr as DeriveFromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{offer, user};
#[cfg(doc)]
use crate::domain::{Offer, Transaction, User};

/// Negotiated contingency attached to one [`Transaction`] and the [`Offer`]
/// that introduced it.
///
/// A [`Transaction`] stays conditional until every attached [`Condition`]
/// resolves favorably, and cancels the moment any of them fails.
#[derive(Clone, Debug)]
pub struct Condition {
    /// ID of this [`Condition`].
    pub id: Id,

    /// ID of the [`Offer`] that introduced this [`Condition`].
    pub offer_id: offer::Id,

    /// [`Kind`] of this [`Condition`].
    pub kind: Kind,

    /// Free-text [`Description`] of this [`Condition`].
    pub description: Description,

    /// [`DateTimeOf`] this [`Condition`] must be resolved by.
    pub deadline: DeadlineDateTime,

    /// [`Status`] of this [`Condition`].
    pub status: Status,

    /// [`Resolution`] of this [`Condition`], if it was resolved.
    pub resolution: Option<Resolution>,

    /// History of deadline [`Extension`]s, oldest first.
    pub extensions: Vec<Extension>,
}

impl Condition {
    /// Returns whether this [`Condition`] reached a terminal [`Status`].
    ///
    /// A terminal [`Condition`] can never be reopened, only superseded by
    /// a separately negotiated one.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(
            self.status,
            Status::Fulfilled | Status::Waived | Status::Failed,
        )
    }

    /// Returns whether this [`Condition`] resolved favorably.
    #[must_use]
    pub fn is_favorable(&self) -> bool {
        matches!(self.status, Status::Fulfilled | Status::Waived)
    }
}

/// ID of a [`Condition`].
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
    #[doc = "Kind of a [`Condition`]."]
    enum Kind {
        #[doc = "Buyer must secure mortgage financing."]
        Financing = 1,

        #[doc = "Property must pass a home inspection."]
        Inspection = 2,

        #[doc = "Condominium status certificate must be reviewed."]
        StatusCertificate = 3,

        #[doc = "Buyer must sell their current property."]
        SaleOfBuyersProperty = 4,

        #[doc = "Property must appraise at or above the purchase price."]
        Appraisal = 5,

        #[doc = "Buyer's lawyer must approve the agreement."]
        LawyerReview = 6,

        #[doc = "Any other negotiated contingency."]
        Other = 7,
    }
}

define_kind! {
    #[doc = "Status of a [`Condition`]."]
    enum Status {
        #[doc = "The [`Condition`] awaits resolution."]
        Pending = 1,

        #[doc = "The [`Condition`] was satisfied."]
        Fulfilled = 2,

        #[doc = "The [`Condition`] was waived by the benefiting party."]
        Waived = 3,

        #[doc = "The [`Condition`] failed, cancelling the transaction."]
        Failed = 4,

        #[doc = "The deadline was extended; still awaiting resolution."]
        Extended = 5,
    }
}

define_kind! {
    #[doc = "Outcome of resolving a [`Condition`]."]
    enum Outcome {
        #[doc = "The [`Condition`] is satisfied."]
        Fulfilled = 1,

        #[doc = "The [`Condition`] is waived."]
        Waived = 2,

        #[doc = "The [`Condition`] cannot be satisfied."]
        Failed = 3,
    }
}

impl Outcome {
    /// Returns the terminal [`Status`] this [`Outcome`] resolves into.
    #[must_use]
    pub fn status(self) -> Status {
        match self {
            Self::Fulfilled => Status::Fulfilled,
            Self::Waived => Status::Waived,
            Self::Failed => Status::Failed,
        }
    }
}

/// Record of how a [`Condition`] was resolved.
#[derive(Clone, Debug)]
pub struct Resolution {
    /// ID of the [`User`] who resolved the [`Condition`].
    pub by: user::Id,

    /// [`DateTimeOf`] when the [`Condition`] was resolved.
    pub at: ResolutionDateTime,

    /// [`Outcome`] the [`Condition`] was resolved with.
    pub outcome: Outcome,

    /// Free-text notes accompanying the resolution.
    pub notes: Option<Notes>,
}

/// Record of a single [`Condition`] deadline extension.
///
/// An [`Extension`] is binding only when both parties agreed to it; it never
/// changes the owning transaction's status.
#[derive(Clone, Copy, Debug)]
pub struct Extension {
    /// Deadline superseded by this [`Extension`].
    pub prior_deadline: DeadlineDateTime,

    /// Deadline this [`Extension`] moved the [`Condition`] to.
    pub new_deadline: DeadlineDateTime,

    /// Whether the buyer agreed to this [`Extension`].
    pub buyer_agreed: bool,

    /// Whether the seller agreed to this [`Extension`].
    pub seller_agreed: bool,

    /// [`DateTimeOf`] when this [`Extension`] was recorded.
    pub agreed_at: ExtensionDateTime,
}

/// Description of a [`Condition`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Description(String);

impl Description {
    /// Creates a new [`Description`] without performing any validation.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `description` is not empty.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(description: impl Into<String>) -> Self {
        Self(description.into())
    }

    /// Creates a new [`Description`] if the given `description` is valid.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Option<Self> {
        let description = description.into();
        Self::check(&description).then_some(Self(description))
    }

    /// Checks whether the given `description` is a valid [`Description`].
    fn check(description: impl AsRef<str>) -> bool {
        let description = description.as_ref();
        description.trim() == description
            && !description.is_empty()
            && description.len() <= 512
    }
}

impl FromStr for Description {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Description`")
    }
}

/// Free-text notes on a [`Condition`] resolution.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Notes(String);

impl Notes {
    /// Creates a new [`Notes`] if the given `notes` are valid.
    #[must_use]
    pub fn new(notes: impl Into<String>) -> Option<Self> {
        let notes = notes.into();
        (!notes.trim().is_empty() && notes.len() <= 2048).then_some(Self(notes))
    }
}

impl FromStr for Notes {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Notes`")
    }
}

/// Marker type indicating a [`Condition`] deadline.
#[derive(Clone, Copy, Debug)]
pub struct Deadline;

/// [`DateTimeOf`] a [`Condition`] deadline.
pub type DeadlineDateTime = DateTimeOf<(Condition, Deadline)>;

/// [`DateTimeOf`] when a [`Condition`] was resolved.
pub type ResolutionDateTime = DateTimeOf<(Condition, Resolution)>;

/// [`DateTimeOf`] when a [`Condition`] deadline extension was recorded.
pub type ExtensionDateTime = DateTimeOf<(Condition, Extension)>;
