//! [`Condition`]-related definitions.

use common::DateTime;
use derive_more::{AsRef, Display, From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::domain;
use uuid::Uuid;

use crate::{api, api::scalar, Context};

/// Negotiated contingency attached to a `Transaction`.
#[derive(Clone, Debug, From, Into)]
pub struct Condition(domain::Condition);

/// Negotiated contingency attached to a `Transaction`.
#[graphql_object(context = Context)]
impl Condition {
    /// Unique identifier of this `Condition`.
    #[must_use]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// ID of the `Offer` that introduced this `Condition`.
    #[must_use]
    pub fn offer_id(&self) -> api::offer::Id {
        self.0.offer_id.into()
    }

    /// Kind of this `Condition`.
    #[must_use]
    pub fn kind(&self) -> Kind {
        self.0.kind.into()
    }

    /// Free-text description of this `Condition`.
    #[must_use]
    pub fn description(&self) -> Description {
        self.0.description.clone().into()
    }

    /// `DateTime` this `Condition` must be resolved by.
    #[must_use]
    pub fn deadline(&self) -> DateTime {
        self.0.deadline.coerce()
    }

    /// Status of this `Condition`.
    #[must_use]
    pub fn status(&self) -> Status {
        self.0.status.into()
    }

    /// Resolution of this `Condition`, if it was resolved.
    #[must_use]
    pub fn resolution(&self) -> Option<Resolution> {
        self.0.resolution.clone().map(Into::into)
    }

    /// Deadline extensions recorded on this `Condition`, oldest first.
    #[must_use]
    pub fn extensions(&self) -> Vec<Extension> {
        self.0.extensions.iter().copied().map(Into::into).collect()
    }
}

/// Record of how a `Condition` was resolved.
#[derive(Clone, Debug, From, Into)]
pub struct Resolution(domain::condition::Resolution);

/// Record of how a `Condition` was resolved.
#[graphql_object(name = "ConditionResolution", context = Context)]
impl Resolution {
    /// ID of the `User` who resolved the `Condition`.
    #[must_use]
    pub fn by(&self) -> api::user::Id {
        self.0.by.into()
    }

    /// `DateTime` when the `Condition` was resolved.
    #[must_use]
    pub fn at(&self) -> DateTime {
        self.0.at.coerce()
    }

    /// Outcome the `Condition` was resolved with.
    #[must_use]
    pub fn outcome(&self) -> Outcome {
        self.0.outcome.into()
    }

    /// Free-text notes accompanying the resolution.
    #[must_use]
    pub fn notes(&self) -> Option<Notes> {
        self.0.notes.clone().map(Into::into)
    }
}

/// Record of a single `Condition` deadline extension.
#[derive(Clone, Copy, Debug, From, Into)]
pub struct Extension(domain::condition::Extension);

/// Record of a single `Condition` deadline extension.
#[graphql_object(name = "ConditionExtension", context = Context)]
impl Extension {
    /// Deadline superseded by this `ConditionExtension`.
    #[must_use]
    pub fn prior_deadline(&self) -> DateTime {
        self.0.prior_deadline.coerce()
    }

    /// Deadline this `ConditionExtension` moved the `Condition` to.
    #[must_use]
    pub fn new_deadline(&self) -> DateTime {
        self.0.new_deadline.coerce()
    }

    /// Indicator whether the buyer agreed to this `ConditionExtension`.
    #[must_use]
    pub fn buyer_agreed(&self) -> bool {
        self.0.buyer_agreed
    }

    /// Indicator whether the seller agreed to this `ConditionExtension`.
    #[must_use]
    pub fn seller_agreed(&self) -> bool {
        self.0.seller_agreed
    }

    /// `DateTime` when this `ConditionExtension` was recorded.
    #[must_use]
    pub fn agreed_at(&self) -> DateTime {
        self.0.agreed_at.coerce()
    }
}

/// Unique identifier of a `Condition`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::condition::Id)]
#[into(domain::condition::Id)]
#[graphql(name = "ConditionId", transparent)]
pub struct Id(Uuid);

/// Kind of a `Condition`.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "ConditionKind")]
pub enum Kind {
    /// Buyer must secure mortgage financing.
    Financing,

    /// Property must pass a home inspection.
    Inspection,

    /// Condominium status certificate must be reviewed.
    StatusCertificate,

    /// Buyer must sell their current property.
    SaleOfBuyersProperty,

    /// Property must appraise at or above the purchase price.
    Appraisal,

    /// Buyer's lawyer must approve the agreement.
    LawyerReview,

    /// Any other negotiated contingency.
    Other,
}

impl From<domain::condition::Kind> for Kind {
    fn from(kind: domain::condition::Kind) -> Self {
        use domain::condition::Kind as K;
        match kind {
            K::Financing => Self::Financing,
            K::Inspection => Self::Inspection,
            K::StatusCertificate => Self::StatusCertificate,
            K::SaleOfBuyersProperty => Self::SaleOfBuyersProperty,
            K::Appraisal => Self::Appraisal,
            K::LawyerReview => Self::LawyerReview,
            K::Other => Self::Other,
        }
    }
}

impl From<Kind> for domain::condition::Kind {
    fn from(kind: Kind) -> Self {
        use Kind as K;
        match kind {
            K::Financing => Self::Financing,
            K::Inspection => Self::Inspection,
            K::StatusCertificate => Self::StatusCertificate,
            K::SaleOfBuyersProperty => Self::SaleOfBuyersProperty,
            K::Appraisal => Self::Appraisal,
            K::LawyerReview => Self::LawyerReview,
            K::Other => Self::Other,
        }
    }
}

/// Status of a `Condition`.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "ConditionStatus")]
pub enum Status {
    /// The `Condition` awaits resolution.
    Pending,

    /// The `Condition` was satisfied.
    Fulfilled,

    /// The `Condition` was waived by the benefiting party.
    Waived,

    /// The `Condition` failed, cancelling the `Transaction`.
    Failed,

    /// The deadline was extended; still awaiting resolution.
    Extended,
}

impl From<domain::condition::Status> for Status {
    fn from(status: domain::condition::Status) -> Self {
        use domain::condition::Status as S;
        match status {
            S::Pending => Self::Pending,
            S::Fulfilled => Self::Fulfilled,
            S::Waived => Self::Waived,
            S::Failed => Self::Failed,
            S::Extended => Self::Extended,
        }
    }
}

/// Outcome of resolving a `Condition`.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "ConditionOutcome")]
pub enum Outcome {
    /// The `Condition` is satisfied.
    Fulfilled,

    /// The `Condition` is waived.
    Waived,

    /// The `Condition` cannot be satisfied.
    Failed,
}

impl From<domain::condition::Outcome> for Outcome {
    fn from(outcome: domain::condition::Outcome) -> Self {
        use domain::condition::Outcome as O;
        match outcome {
            O::Fulfilled => Self::Fulfilled,
            O::Waived => Self::Waived,
            O::Failed => Self::Failed,
        }
    }
}

impl From<Outcome> for domain::condition::Outcome {
    fn from(outcome: Outcome) -> Self {
        use Outcome as O;
        match outcome {
            O::Fulfilled => Self::Fulfilled,
            O::Waived => Self::Waived,
            O::Failed => Self::Failed,
        }
    }
}

/// Description of a `Condition`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ConditionDescription",
    with = scalar::Via::<domain::condition::Description>,
)]
pub struct Description(domain::condition::Description);

/// Free-text notes on a `Condition` resolution.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ConditionNotes",
    with = scalar::Via::<domain::condition::Notes>,
)]
pub struct Notes(domain::condition::Notes);
