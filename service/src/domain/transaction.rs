//! [`Transaction`] definitions.

use std::{str::FromStr, time::Duration};

use common::{define_kind, unit, DateTimeOf, Money, Percent};
use derive_more::{
    AsRef, Display, From, FromStr as DeriveFromStr, Into,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    condition, jurisdiction::Province, listing, offer, property, user,
    Condition, Offer,
};
#[cfg(doc)]
use crate::domain::{Listing, Property, User};

/// Purchase in progress, created exactly once when an [`Offer`] is accepted.
///
/// Price and deposit are copied from the accepted [`Offer`] at creation and
/// are immutable thereafter. The [`Transaction`] exclusively owns its
/// [`Condition`] set.
#[derive(Clone, Debug)]
pub struct Transaction {
    /// ID of this [`Transaction`].
    pub id: Id,

    /// ID of the [`Property`] being purchased.
    pub property_id: property::Id,

    /// ID of the [`Listing`] the accepted [`Offer`] answered.
    pub listing_id: listing::Id,

    /// ID of the accepted [`Offer`].
    pub offer_id: offer::Id,

    /// ID of the buying [`User`].
    pub buyer_id: user::Id,

    /// ID of the selling [`User`].
    pub seller_id: user::Id,

    /// [`Province`] whose tax and closing rules govern this purchase.
    pub province: Province,

    /// Purchase price, copied from the accepted [`Offer`].
    pub purchase_price: Money,

    /// Deposit amount, copied from the accepted [`Offer`].
    pub deposit: Money,

    /// [`DateTimeOf`] when the [`Offer`] was accepted.
    pub accepted_at: AcceptanceDateTime,

    /// Agreed closing [`DateTimeOf`].
    pub closing_at: ClosingDateTime,

    /// [`Condition`]s this [`Transaction`] owns.
    pub conditions: Vec<Condition>,

    /// Latest deadline across all owned [`Condition`]s, if any.
    pub condition_deadline: Option<condition::DeadlineDateTime>,

    /// [`Status`] of this [`Transaction`].
    pub status: Status,

    /// Current [`Step`] of the closing workflow.
    pub current_step: Step,

    /// Append-only log of workflow [`Step`] advances, oldest first.
    pub step_history: Vec<StepRecord>,

    /// [`PlatformFee`] owed on this [`Transaction`].
    pub platform_fee: PlatformFee,

    /// [`DateTimeOf`] when every [`Condition`] resolved favorably.
    pub firm_at: Option<FirmDateTime>,

    /// [`Cancellation`] record, populated only when cancelled.
    pub cancellation: Option<Cancellation>,
}

impl Transaction {
    /// Opens a new [`Transaction`] from the provided accepted [`Offer`].
    ///
    /// [`Condition`] [`offer::Term`]s become live [`Condition`]s with
    /// deadlines counted in days from `accepted_at`. An [`Offer`] carrying
    /// no terms opens [`Status::Firm`] immediately.
    ///
    /// The [`PlatformFee`] amount is derived here, once, from the purchase
    /// price and the provided `fee_rate`, and is never recomputed after
    /// being invoiced or paid.
    #[must_use]
    pub fn open(
        offer: &Offer,
        province: Province,
        fee_rate: Percent,
        actor_id: user::Id,
        accepted_at: AcceptanceDateTime,
    ) -> Self {
        let conditions: Vec<_> = offer
            .terms
            .iter()
            .map(|term| Condition {
                id: condition::Id::new(),
                offer_id: offer.id,
                kind: term.kind,
                description: term.description.clone(),
                deadline: (accepted_at
                    + Duration::from_secs(
                        u64::from(term.days_to_deadline) * 86_400,
                    ))
                .coerce(),
                status: condition::Status::Pending,
                resolution: None,
                extensions: Vec::new(),
            })
            .collect();
        let condition_deadline =
            conditions.iter().map(|c| c.deadline).max();

        let (status, firm_at) = if conditions.is_empty() {
            (Status::Firm, Some(accepted_at.coerce()))
        } else {
            (Status::Conditional, None)
        };

        Self {
            id: Id::new(),
            property_id: offer.property_id,
            listing_id: offer.listing_id,
            offer_id: offer.id,
            buyer_id: offer.buyer_id,
            seller_id: offer.seller_id,
            province,
            purchase_price: offer.price,
            deposit: offer.deposit,
            accepted_at,
            closing_at: offer.closing_at.coerce(),
            conditions,
            condition_deadline,
            status,
            current_step: Step::OfferAccepted,
            step_history: vec![StepRecord {
                step: Step::OfferAccepted,
                at: accepted_at.coerce(),
                actor_id,
                notes: None,
            }],
            platform_fee: PlatformFee::derive(offer.price, fee_rate),
            firm_at,
            cancellation: None,
        }
    }

    /// Returns whether the provided [`User`] is a party to this
    /// [`Transaction`].
    #[must_use]
    pub fn is_party(&self, user_id: user::Id) -> bool {
        self.buyer_id == user_id || self.seller_id == user_id
    }

    /// Returns whether every owned [`Condition`] resolved favorably.
    ///
    /// Vacuously `true` for a [`Transaction`] owning no [`Condition`]s.
    #[must_use]
    pub fn all_conditions_favorable(&self) -> bool {
        self.conditions.iter().all(Condition::is_favorable)
    }

    /// Returns the owned [`Condition`] with the provided ID, if any.
    #[must_use]
    pub fn condition(&self, id: condition::Id) -> Option<&Condition> {
        self.conditions.iter().find(|c| c.id == id)
    }

    /// Returns the owned [`Condition`] with the provided ID, if any.
    #[must_use]
    pub fn condition_mut(
        &mut self,
        id: condition::Id,
    ) -> Option<&mut Condition> {
        self.conditions.iter_mut().find(|c| c.id == id)
    }

    /// Returns whether this [`Transaction`] reached a terminal [`Status`].
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self.status, Status::Completed | Status::Cancelled)
    }

    /// Advances this [`Transaction`] to the provided [`Step`], recording the
    /// advance in the append-only history.
    pub fn advance_to(
        &mut self,
        step: Step,
        actor_id: user::Id,
        notes: Option<Notes>,
    ) {
        self.current_step = step;
        self.step_history.push(StepRecord {
            step,
            at: StepDateTime::now(),
            actor_id,
            notes,
        });
    }

    /// Returns the recommended next action for the current [`Step`].
    ///
    /// Advisory only; never consulted by the state machine itself.
    #[must_use]
    pub fn next_action(&self) -> &'static str {
        match self.current_step {
            Step::OfferAccepted => "Collect the buyer's deposit",
            Step::DepositPending => {
                "Confirm the deposit has been received in trust"
            }
            Step::ConditionsPending => {
                "Resolve or waive the outstanding conditions"
            }
            Step::ConditionsComplete => "Engage lawyers for both parties",
            Step::LawyerEngaged => "Order the title search",
            Step::TitleSearch => {
                "Finalize mortgage instructions with the lender"
            }
            Step::MortgageFinalized => {
                "Prepare and circulate closing documents"
            }
            Step::ClosingDocuments => "Schedule the final walkthrough",
            Step::FinalWalkthrough => "Prepare for closing day",
            Step::ClosingDay => {
                "Exchange funds and keys, register the transfer"
            }
            Step::Completed => "Nothing left to do",
        }
    }
}

/// ID of a [`Transaction`].
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
    #[doc = "Status of a [`Transaction`]."]
    enum Status {
        #[doc = "At least one [`Condition`] is unresolved."]
        Conditional = 1,

        #[doc = "Every [`Condition`] resolved favorably."]
        Firm = 2,

        #[doc = "The workflow reached closing day."]
        Closing = 3,

        #[doc = "The sale completed."]
        Completed = 4,

        #[doc = "The purchase was cancelled; irreversible."]
        Cancelled = 5,

        #[doc = "Manual override applied outside the automatic machine."]
        Disputed = 6,
    }
}

define_kind! {
    #[doc = "Ordered closing-workflow position of a [`Transaction`]."]
    enum Step {
        #[doc = "The offer was accepted."]
        OfferAccepted = 1,

        #[doc = "The deposit is being collected."]
        DepositPending = 2,

        #[doc = "Conditions await resolution."]
        ConditionsPending = 3,

        #[doc = "Every condition resolved favorably."]
        ConditionsComplete = 4,

        #[doc = "Lawyers engaged for both parties."]
        LawyerEngaged = 5,

        #[doc = "Title search in progress."]
        TitleSearch = 6,

        #[doc = "Mortgage instructions finalized."]
        MortgageFinalized = 7,

        #[doc = "Closing documents in preparation."]
        ClosingDocuments = 8,

        #[doc = "Final walkthrough of the property."]
        FinalWalkthrough = 9,

        #[doc = "Closing day."]
        ClosingDay = 10,

        #[doc = "The sale completed."]
        Completed = 11,
    }
}

impl Step {
    /// Returns the [`Step`] following this one, if any.
    ///
    /// Steps only ever move forward, one position at a time.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        match self {
            Self::OfferAccepted => Some(Self::DepositPending),
            Self::DepositPending => Some(Self::ConditionsPending),
            Self::ConditionsPending => Some(Self::ConditionsComplete),
            Self::ConditionsComplete => Some(Self::LawyerEngaged),
            Self::LawyerEngaged => Some(Self::TitleSearch),
            Self::TitleSearch => Some(Self::MortgageFinalized),
            Self::MortgageFinalized => Some(Self::ClosingDocuments),
            Self::ClosingDocuments => Some(Self::FinalWalkthrough),
            Self::FinalWalkthrough => Some(Self::ClosingDay),
            Self::ClosingDay => Some(Self::Completed),
            Self::Completed => None,
        }
    }
}

/// Single entry of a [`Transaction`]'s append-only step history.
#[derive(Clone, Debug)]
pub struct StepRecord {
    /// [`Step`] the [`Transaction`] advanced to.
    pub step: Step,

    /// [`DateTimeOf`] when the advance was recorded.
    pub at: StepDateTime,

    /// ID of the [`User`] who caused the advance.
    pub actor_id: user::Id,

    /// Free-text notes accompanying the advance.
    pub notes: Option<Notes>,
}

/// Commission the platform charges on a completed sale.
#[derive(Clone, Debug)]
pub struct PlatformFee {
    /// Commission rate applied to the purchase price.
    pub rate: Percent,

    /// Commission amount, derived once at [`Transaction`] creation.
    pub amount: Money,

    /// [`PaymentStatus`] of the commission.
    pub status: PaymentStatus,

    /// Payment gateway reference, recorded once invoiced.
    pub reference: Option<PaymentReference>,
}

impl PlatformFee {
    /// Derives a new [`PlatformFee`] from the provided purchase price.
    #[must_use]
    pub fn derive(price: Money, rate: Percent) -> Self {
        Self {
            rate,
            amount: Money {
                amount: rate.of(price.amount),
                currency: price.currency,
            }
            .to_cents(),
            status: PaymentStatus::Pending,
            reference: None,
        }
    }
}

define_kind! {
    #[doc = "Payment status of a [`PlatformFee`]."]
    enum PaymentStatus {
        #[doc = "Not yet invoiced."]
        Pending = 1,

        #[doc = "Invoiced through the payment collaborator."]
        Invoiced = 2,

        #[doc = "Confirmed paid."]
        Paid = 3,
    }
}

/// Opaque reference issued by the payment collaborator.
#[derive(AsRef, Clone, Debug, Display, Eq, From, Into, PartialEq)]
#[as_ref(str, String)]
pub struct PaymentReference(String);

/// Record of why and how a [`Transaction`] was cancelled.
#[derive(Clone, Debug)]
pub struct Cancellation {
    /// Reason the [`Transaction`] was cancelled.
    pub reason: CancellationReason,

    /// ID of the failed [`Condition`], when a condition failure caused the
    /// cancellation.
    pub failed_condition: Option<condition::Id>,

    /// Where the deposit goes.
    pub deposit_disposition: DepositDisposition,

    /// [`DateTimeOf`] when the [`Transaction`] was cancelled.
    pub cancelled_at: CancellationDateTime,
}

define_kind! {
    #[doc = "Where the deposit goes after a cancellation."]
    enum DepositDisposition {
        #[doc = "Deposit returned to the buyer."]
        ReturnedToBuyer = 1,

        #[doc = "Deposit forfeited to the seller."]
        ForfeitedToSeller = 2,

        #[doc = "Deposit held pending dispute resolution."]
        InDispute = 3,
    }
}

/// Reason a [`Transaction`] was cancelled.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct CancellationReason(String);

impl CancellationReason {
    /// [`CancellationReason`] recorded when a [`Condition`] fails.
    #[must_use]
    pub fn condition_failed() -> Self {
        Self("Condition failed".into())
    }

    /// Creates a new [`CancellationReason`] if the given `reason` is valid.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Option<Self> {
        let reason = reason.into();
        (!reason.trim().is_empty() && reason.len() <= 512)
            .then_some(Self(reason))
    }
}

impl FromStr for CancellationReason {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `CancellationReason`")
    }
}

/// Free-text notes on a [`StepRecord`].
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

/// Marker type indicating [`Offer`] acceptance.
#[derive(Clone, Copy, Debug)]
pub struct Acceptance;

/// [`DateTimeOf`] when the [`Offer`] behind a [`Transaction`] was accepted.
pub type AcceptanceDateTime = DateTimeOf<(Transaction, Acceptance)>;

/// Marker type indicating a closing date.
#[derive(Clone, Copy, Debug)]
pub struct Closing;

/// [`DateTimeOf`] a [`Transaction`] closes on.
pub type ClosingDateTime = DateTimeOf<(Transaction, Closing)>;

/// Marker type indicating firmness.
#[derive(Clone, Copy, Debug)]
pub struct Firmness;

/// [`DateTimeOf`] when a [`Transaction`] became firm.
pub type FirmDateTime = DateTimeOf<(Transaction, Firmness)>;

/// [`DateTimeOf`] when a [`Transaction`] step advance was recorded.
pub type StepDateTime = DateTimeOf<(Transaction, StepRecord)>;

/// [`DateTimeOf`] when a [`Transaction`] was cancelled.
pub type CancellationDateTime =
    DateTimeOf<(Transaction, unit::Cancellation)>;

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::{DateTime, Money, Percent};
    use rust_decimal::Decimal;

    use crate::domain::{
        condition, jurisdiction::Province, listing, offer, property, user,
    };

    use super::{AcceptanceDateTime, Status, Step, Transaction};

    fn offer_with_terms(terms: Vec<offer::Term>) -> offer::Offer {
        let now = DateTime::now();
        offer::Offer {
            id: offer::Id::new(),
            property_id: property::Id::new(),
            listing_id: listing::Id::new(),
            buyer_id: user::Id::new(),
            seller_id: user::Id::new(),
            price: Money::cad(Decimal::new(500_000, 0)),
            deposit: Money::cad(Decimal::new(25_000, 0)),
            deposit_due_at: now.coerce(),
            irrevocable_at: (now + Duration::from_secs(3600)).coerce(),
            closing_at: (now + Duration::from_secs(86_400 * 60)).coerce(),
            terms,
            inclusions: Vec::new(),
            exclusions: Vec::new(),
            status: offer::Status::Accepted,
            parent_offer: None,
            countered_by: None,
            buyer_signed_at: Some(now.coerce()),
            seller_signed_at: Some(now.coerce()),
            created_at: now.coerce(),
        }
    }

    fn term(kind: condition::Kind, days: u16) -> offer::Term {
        offer::Term {
            kind,
            description: condition::Description::new("as negotiated")
                .unwrap(),
            days_to_deadline: days,
        }
    }

    fn rate() -> Percent {
        Percent::new(Decimal::new(25, 1)).unwrap()
    }

    #[test]
    fn steps_walk_forward_without_gaps() {
        let mut step = Step::OfferAccepted;
        let mut seen = vec![step];
        while let Some(next) = step.next() {
            assert_eq!(next.u8(), step.u8() + 1);
            seen.push(next);
            step = next;
        }
        assert_eq!(seen.len(), 11);
        assert_eq!(step, Step::Completed);
    }

    #[test]
    fn opens_conditional_with_derived_fee_and_deadline() {
        let offer = offer_with_terms(vec![
            term(condition::Kind::Financing, 10),
            term(condition::Kind::Inspection, 5),
        ]);
        let tx = Transaction::open(
            &offer,
            Province::On,
            rate(),
            offer.seller_id,
            AcceptanceDateTime::now(),
        );

        assert_eq!(tx.status, Status::Conditional);
        assert_eq!(tx.current_step, Step::OfferAccepted);
        assert_eq!(tx.conditions.len(), 2);
        assert_eq!(
            tx.condition_deadline,
            tx.conditions.iter().map(|c| c.deadline).max(),
        );
        // 2.5% of $500,000.
        assert_eq!(
            tx.platform_fee.amount,
            Money::cad(Decimal::new(12_500, 0)).to_cents(),
        );
        assert!(tx.firm_at.is_none());
    }

    #[test]
    fn opens_firm_without_conditions() {
        let offer = offer_with_terms(Vec::new());
        let tx = Transaction::open(
            &offer,
            Province::On,
            rate(),
            offer.seller_id,
            AcceptanceDateTime::now(),
        );

        assert_eq!(tx.status, Status::Firm);
        assert!(tx.firm_at.is_some());
        assert!(tx.all_conditions_favorable());
    }
}
