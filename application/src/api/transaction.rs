//! [`Transaction`]-related definitions.

use std::future;

use common::{DateTime, DateTimeOf, Handler as _, Money, Percent};
use derive_more::{AsRef, Display, From, Into};
use futures::TryFutureExt as _;
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::{domain, query};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{api, api::scalar, AsError, Context, Error};

/// Purchase in progress, created when an `Offer` is accepted.
#[derive(Clone, Debug)]
pub struct Transaction {
    /// ID of this [`Transaction`].
    id: Id,

    /// Underlying [`domain::Transaction`].
    transaction: OnceCell<domain::Transaction>,
}

impl From<domain::Transaction> for Transaction {
    fn from(transaction: domain::Transaction) -> Self {
        Self {
            id: transaction.id.into(),
            transaction: OnceCell::new_with(Some(transaction)),
        }
    }
}

impl Transaction {
    /// Creates a new [`Transaction`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`Transaction`] with the provided ID exists,
    /// otherwise accessing this [`Transaction`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            transaction: OnceCell::new(),
        }
    }

    /// Returns the underlying [`domain::Transaction`].
    ///
    /// # Errors
    ///
    /// Errors if the [`domain::Transaction`] doesn't exist.
    async fn transaction(
        &self,
        ctx: &Context,
    ) -> Result<&domain::Transaction, Error> {
        let id = self.id.into();
        self.transaction
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::transaction::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|t| {
                        future::ready(t.ok_or_else(|| {
                            api::query::TransactionError::NotExists.into()
                        }))
                    })
            })
            .await
    }
}

/// Purchase in progress, created when an `Offer` is accepted.
#[graphql_object(context = Context)]
impl Transaction {
    /// Unique identifier of this `Transaction`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Transaction.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// ID of the `Property` being purchased.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Transaction.propertyId",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn property_id(
        &self,
        ctx: &Context,
    ) -> Result<api::property::Id, Error> {
        Ok(self.transaction(ctx).await?.property_id.into())
    }

    /// ID of the `Listing` the accepted `Offer` answered.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Transaction.listingId",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn listing_id(
        &self,
        ctx: &Context,
    ) -> Result<api::listing::Id, Error> {
        Ok(self.transaction(ctx).await?.listing_id.into())
    }

    /// Accepted `Offer` this `Transaction` was created from.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Transaction.offer",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn offer(&self, ctx: &Context) -> Result<api::Offer, Error> {
        let id = self.transaction(ctx).await?.offer_id;
        #[expect(
            unsafe_code,
            reason = "`offer_id` of a stored `Transaction` always points at \
                      an existing `Offer`"
        )]
        Ok(unsafe { api::Offer::new_unchecked(id) })
    }

    /// ID of the buying `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Transaction.buyerId",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn buyer_id(&self, ctx: &Context) -> Result<api::user::Id, Error> {
        Ok(self.transaction(ctx).await?.buyer_id.into())
    }

    /// ID of the selling `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Transaction.sellerId",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn seller_id(
        &self,
        ctx: &Context,
    ) -> Result<api::user::Id, Error> {
        Ok(self.transaction(ctx).await?.seller_id.into())
    }

    /// Province whose tax and closing rules govern this purchase.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Transaction.province",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn province(
        &self,
        ctx: &Context,
    ) -> Result<api::jurisdiction::Province, Error> {
        Ok(self.transaction(ctx).await?.province.into())
    }

    /// Purchase price, copied from the accepted `Offer`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Transaction.purchasePrice",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn purchase_price(&self, ctx: &Context) -> Result<Money, Error> {
        Ok(self.transaction(ctx).await?.purchase_price)
    }

    /// Deposit amount, copied from the accepted `Offer`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Transaction.deposit",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn deposit(&self, ctx: &Context) -> Result<Money, Error> {
        Ok(self.transaction(ctx).await?.deposit)
    }

    /// `DateTime` when the `Offer` was accepted.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Transaction.acceptedAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn accepted_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.transaction(ctx).await?.accepted_at.coerce())
    }

    /// Agreed closing `DateTime`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Transaction.closingAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn closing_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.transaction(ctx).await?.closing_at.coerce())
    }

    /// `Condition`s this `Transaction` owns.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Transaction.conditions",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn conditions(
        &self,
        ctx: &Context,
    ) -> Result<Vec<api::Condition>, Error> {
        Ok(self
            .transaction(ctx)
            .await?
            .conditions
            .iter()
            .cloned()
            .map(Into::into)
            .collect())
    }

    /// Latest deadline across all owned `Condition`s, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Transaction.conditionDeadline",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn condition_deadline(
        &self,
        ctx: &Context,
    ) -> Result<Option<DateTime>, Error> {
        Ok(self
            .transaction(ctx)
            .await?
            .condition_deadline
            .map(DateTimeOf::coerce))
    }

    /// Status of this `Transaction`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Transaction.status",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn status(&self, ctx: &Context) -> Result<Status, Error> {
        Ok(self.transaction(ctx).await?.status.into())
    }

    /// Current step of the closing workflow.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Transaction.currentStep",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn current_step(&self, ctx: &Context) -> Result<Step, Error> {
        Ok(self.transaction(ctx).await?.current_step.into())
    }

    /// Append-only log of workflow step advances, oldest first.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Transaction.stepHistory",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn step_history(
        &self,
        ctx: &Context,
    ) -> Result<Vec<StepRecord>, Error> {
        Ok(self
            .transaction(ctx)
            .await?
            .step_history
            .iter()
            .cloned()
            .map(Into::into)
            .collect())
    }

    /// Commission the platform charges on this `Transaction`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Transaction.platformFee",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn platform_fee(
        &self,
        ctx: &Context,
    ) -> Result<PlatformFee, Error> {
        Ok(self.transaction(ctx).await?.platform_fee.clone().into())
    }

    /// `DateTime` when every `Condition` resolved favorably.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Transaction.firmAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn firm_at(
        &self,
        ctx: &Context,
    ) -> Result<Option<DateTime>, Error> {
        Ok(self.transaction(ctx).await?.firm_at.map(DateTimeOf::coerce))
    }

    /// Cancellation record, populated only when cancelled.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Transaction.cancellation",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn cancellation(
        &self,
        ctx: &Context,
    ) -> Result<Option<Cancellation>, Error> {
        Ok(self
            .transaction(ctx)
            .await?
            .cancellation
            .clone()
            .map(Into::into))
    }

    /// Recommended next action for the current step.
    ///
    /// Advisory only.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Transaction.nextAction",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn next_action(&self, ctx: &Context) -> Result<String, Error> {
        Ok(self.transaction(ctx).await?.next_action().to_owned())
    }
}

/// Single entry of a `Transaction`'s step history.
#[derive(Clone, Debug, From, Into)]
pub struct StepRecord(domain::transaction::StepRecord);

/// Single entry of a `Transaction`'s step history.
#[graphql_object(name = "TransactionStepRecord", context = Context)]
impl StepRecord {
    /// Step the `Transaction` advanced to.
    #[must_use]
    pub fn step(&self) -> Step {
        self.0.step.into()
    }

    /// `DateTime` when the advance was recorded.
    #[must_use]
    pub fn at(&self) -> DateTime {
        self.0.at.coerce()
    }

    /// ID of the `User` who caused the advance.
    #[must_use]
    pub fn actor_id(&self) -> api::user::Id {
        self.0.actor_id.into()
    }

    /// Free-text notes accompanying the advance.
    #[must_use]
    pub fn notes(&self) -> Option<Notes> {
        self.0.notes.clone().map(Into::into)
    }
}

/// Commission the platform charges on a completed sale.
#[derive(Clone, Debug, From, Into)]
pub struct PlatformFee(domain::transaction::PlatformFee);

/// Commission the platform charges on a completed sale.
#[graphql_object(context = Context)]
impl PlatformFee {
    /// Commission rate applied to the purchase price.
    #[must_use]
    pub fn rate(&self) -> Percent {
        self.0.rate
    }

    /// Commission amount, derived once at `Transaction` creation.
    #[must_use]
    pub fn amount(&self) -> Money {
        self.0.amount
    }

    /// Payment status of the commission.
    #[must_use]
    pub fn status(&self) -> PaymentStatus {
        self.0.status.into()
    }

    /// Payment gateway reference, recorded once invoiced.
    #[must_use]
    pub fn reference(&self) -> Option<String> {
        self.0.reference.as_ref().map(ToString::to_string)
    }
}

/// Record of why and how a `Transaction` was cancelled.
#[derive(Clone, Debug, From, Into)]
pub struct Cancellation(domain::transaction::Cancellation);

/// Record of why and how a `Transaction` was cancelled.
#[graphql_object(name = "TransactionCancellation", context = Context)]
impl Cancellation {
    /// Reason the `Transaction` was cancelled.
    #[must_use]
    pub fn reason(&self) -> CancellationReason {
        self.0.reason.clone().into()
    }

    /// ID of the failed `Condition`, when a condition failure caused the
    /// cancellation.
    #[must_use]
    pub fn failed_condition(&self) -> Option<api::condition::Id> {
        self.0.failed_condition.map(Into::into)
    }

    /// Where the deposit goes.
    #[must_use]
    pub fn deposit_disposition(&self) -> DepositDisposition {
        self.0.deposit_disposition.into()
    }

    /// `DateTime` when the `Transaction` was cancelled.
    #[must_use]
    pub fn cancelled_at(&self) -> DateTime {
        self.0.cancelled_at.coerce()
    }
}

/// Unique identifier of a `Transaction`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::transaction::Id)]
#[into(domain::transaction::Id)]
#[graphql(name = "TransactionId", transparent)]
pub struct Id(Uuid);

/// Status of a `Transaction`.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "TransactionStatus")]
pub enum Status {
    /// At least one `Condition` is unresolved.
    Conditional,

    /// Every `Condition` resolved favorably.
    Firm,

    /// The workflow reached closing day.
    Closing,

    /// The sale completed.
    Completed,

    /// The purchase was cancelled; irreversible.
    Cancelled,

    /// Manual override applied outside the automatic machine.
    Disputed,
}

impl From<domain::transaction::Status> for Status {
    fn from(status: domain::transaction::Status) -> Self {
        use domain::transaction::Status as S;
        match status {
            S::Conditional => Self::Conditional,
            S::Firm => Self::Firm,
            S::Closing => Self::Closing,
            S::Completed => Self::Completed,
            S::Cancelled => Self::Cancelled,
            S::Disputed => Self::Disputed,
        }
    }
}

/// Ordered closing-workflow position of a `Transaction`.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "TransactionStep")]
pub enum Step {
    /// The offer was accepted.
    OfferAccepted,

    /// The deposit is being collected.
    DepositPending,

    /// Conditions await resolution.
    ConditionsPending,

    /// Every condition resolved favorably.
    ConditionsComplete,

    /// Lawyers engaged for both parties.
    LawyerEngaged,

    /// Title search in progress.
    TitleSearch,

    /// Mortgage instructions finalized.
    MortgageFinalized,

    /// Closing documents in preparation.
    ClosingDocuments,

    /// Final walkthrough of the property.
    FinalWalkthrough,

    /// Closing day.
    ClosingDay,

    /// The sale completed.
    Completed,
}

impl From<domain::transaction::Step> for Step {
    fn from(step: domain::transaction::Step) -> Self {
        use domain::transaction::Step as S;
        match step {
            S::OfferAccepted => Self::OfferAccepted,
            S::DepositPending => Self::DepositPending,
            S::ConditionsPending => Self::ConditionsPending,
            S::ConditionsComplete => Self::ConditionsComplete,
            S::LawyerEngaged => Self::LawyerEngaged,
            S::TitleSearch => Self::TitleSearch,
            S::MortgageFinalized => Self::MortgageFinalized,
            S::ClosingDocuments => Self::ClosingDocuments,
            S::FinalWalkthrough => Self::FinalWalkthrough,
            S::ClosingDay => Self::ClosingDay,
            S::Completed => Self::Completed,
        }
    }
}

impl From<Step> for domain::transaction::Step {
    fn from(step: Step) -> Self {
        use Step as S;
        match step {
            S::OfferAccepted => Self::OfferAccepted,
            S::DepositPending => Self::DepositPending,
            S::ConditionsPending => Self::ConditionsPending,
            S::ConditionsComplete => Self::ConditionsComplete,
            S::LawyerEngaged => Self::LawyerEngaged,
            S::TitleSearch => Self::TitleSearch,
            S::MortgageFinalized => Self::MortgageFinalized,
            S::ClosingDocuments => Self::ClosingDocuments,
            S::FinalWalkthrough => Self::FinalWalkthrough,
            S::ClosingDay => Self::ClosingDay,
            S::Completed => Self::Completed,
        }
    }
}

/// Payment status of a `PlatformFee`.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
pub enum PaymentStatus {
    /// Not yet invoiced.
    Pending,

    /// Invoiced through the payment gateway.
    Invoiced,

    /// Confirmed paid.
    Paid,
}

impl From<domain::transaction::PaymentStatus> for PaymentStatus {
    fn from(status: domain::transaction::PaymentStatus) -> Self {
        use domain::transaction::PaymentStatus as S;
        match status {
            S::Pending => Self::Pending,
            S::Invoiced => Self::Invoiced,
            S::Paid => Self::Paid,
        }
    }
}

/// Where the deposit goes after a cancellation.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
pub enum DepositDisposition {
    /// Deposit returned to the buyer.
    ReturnedToBuyer,

    /// Deposit forfeited to the seller.
    ForfeitedToSeller,

    /// Deposit held pending dispute resolution.
    InDispute,
}

impl From<domain::transaction::DepositDisposition> for DepositDisposition {
    fn from(disposition: domain::transaction::DepositDisposition) -> Self {
        use domain::transaction::DepositDisposition as D;
        match disposition {
            D::ReturnedToBuyer => Self::ReturnedToBuyer,
            D::ForfeitedToSeller => Self::ForfeitedToSeller,
            D::InDispute => Self::InDispute,
        }
    }
}

impl From<DepositDisposition> for domain::transaction::DepositDisposition {
    fn from(disposition: DepositDisposition) -> Self {
        use DepositDisposition as D;
        match disposition {
            D::ReturnedToBuyer => Self::ReturnedToBuyer,
            D::ForfeitedToSeller => Self::ForfeitedToSeller,
            D::InDispute => Self::InDispute,
        }
    }
}

/// Free-text notes on a `Transaction` step advance.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "TransactionNotes",
    with = scalar::Via::<domain::transaction::Notes>,
)]
pub struct Notes(domain::transaction::Notes);

/// Reason a `Transaction` was cancelled.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "CancellationReason",
    with = scalar::Via::<domain::transaction::CancellationReason>,
)]
pub struct CancellationReason(domain::transaction::CancellationReason);
