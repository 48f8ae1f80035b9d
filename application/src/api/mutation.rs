//! GraphQL [`Mutation`]s definitions.

use common::{DateTime, Money};
use juniper::graphql_object;
use service::{command, Command as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Submits a new `Offer` on the `Listing` with the provided ID, on
    /// behalf of the acting `User` as the buyer.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_FOUND` - the `Listing` with the provided ID does not exist;
    /// - `LISTING_NO_LONGER_ACTIVE` - the `Listing` no longer accepts
    ///                                offers;
    /// - `INVALID_PRICE` - the price is not positive, or the deposit is
    ///                     negative;
    /// - `INVALID_DATE_ORDERING` - the irrevocable and closing dates are not
    ///                             ordered into the future.
    #[tracing::instrument(
        skip_all,
        fields(
            closing_at = %closing_at.to_rfc3339(),
            deposit = deposit.to_string(),
            deposit_due_at = %deposit_due_at.to_rfc3339(),
            gql.name = "submitOffer",
            irrevocable_at = %irrevocable_at.to_rfc3339(),
            listing_id = %listing_id,
            otel.name = Self::SPAN_NAME,
            price = price.to_string(),
        ),
    )]
    #[expect(clippy::too_many_arguments, reason = "still readable")]
    pub async fn submit_offer(
        listing_id: api::listing::Id,
        price: Money,
        deposit: Money,
        deposit_due_at: DateTime,
        irrevocable_at: DateTime,
        closing_at: DateTime,
        terms: Option<Vec<api::offer::TermInput>>,
        inclusions: Option<Vec<api::offer::Item>>,
        exclusions: Option<Vec<api::offer::Item>>,
        ctx: &Context,
    ) -> Result<api::Offer, Error> {
        let buyer_id = ctx.actor()?;
        let terms = terms
            .unwrap_or_default()
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<_>, _>>()
            .map_err(AsError::into_error)?;

        ctx.service()
            .execute(command::SubmitOffer {
                listing_id: listing_id.into(),
                buyer_id: buyer_id.into(),
                price,
                deposit,
                deposit_due_at: deposit_due_at.coerce(),
                irrevocable_at: irrevocable_at.coerce(),
                closing_at: closing_at.coerce(),
                terms,
                inclusions: inclusions
                    .unwrap_or_default()
                    .into_iter()
                    .map(Into::into)
                    .collect(),
                exclusions: exclusions
                    .unwrap_or_default()
                    .into_iter()
                    .map(Into::into)
                    .collect(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Marks the `Offer` with the provided ID as viewed by the seller.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_FOUND` - the `Offer` with the provided ID does not exist;
    /// - `NOT_AUTHORIZED` - the acting `User` is not the seller of the
    ///                      `Offer`;
    /// - `INVALID_TRANSITION` - the `Offer` cannot be viewed from its
    ///                          current status.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "viewOffer",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn view_offer(
        id: api::offer::Id,
        ctx: &Context,
    ) -> Result<api::Offer, Error> {
        let actor_id = ctx.actor()?;

        ctx.service()
            .execute(command::ViewOffer {
                offer_id: id.into(),
                actor_id: actor_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Accepts the `Offer` with the provided ID, creating the
    /// `Transaction`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_FOUND` - the `Offer` or its `Listing` does not exist;
    /// - `NOT_AUTHORIZED` - the acting `User` is not the seller of the
    ///                      `Offer`;
    /// - `INVALID_TRANSITION` - the `Offer` cannot be accepted from its
    ///                          current status;
    /// - `OFFER_EXPIRED` - the `Offer` passed its irrevocable deadline;
    /// - `LISTING_NO_LONGER_ACTIVE` - the `Listing` went inactive before
    ///                                the acceptance took hold.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "acceptOffer",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn accept_offer(
        id: api::offer::Id,
        ctx: &Context,
    ) -> Result<api::Transaction, Error> {
        let actor_id = ctx.actor()?;

        ctx.service()
            .execute(command::AcceptOffer {
                offer_id: id.into(),
                actor_id: actor_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Rejects the `Offer` with the provided ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_FOUND` - the `Offer` with the provided ID does not exist;
    /// - `NOT_AUTHORIZED` - the acting `User` is not the seller of the
    ///                      `Offer`;
    /// - `INVALID_TRANSITION` - the `Offer` cannot be rejected from its
    ///                          current status;
    /// - `OFFER_EXPIRED` - the `Offer` passed its irrevocable deadline.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "rejectOffer",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn reject_offer(
        id: api::offer::Id,
        ctx: &Context,
    ) -> Result<api::Offer, Error> {
        let actor_id = ctx.actor()?;

        ctx.service()
            .execute(command::RejectOffer {
                offer_id: id.into(),
                actor_id: actor_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Counters the `Offer` with the provided ID, swapping the negotiating
    /// roles.
    ///
    /// Fields left unset are inherited from the countered `Offer`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_FOUND` - the `Offer` or its `Listing` does not exist;
    /// - `NOT_AUTHORIZED` - the acting `User` is not the seller of the
    ///                      `Offer`;
    /// - `INVALID_TRANSITION` - the `Offer` cannot be countered from its
    ///                          current status;
    /// - `OFFER_EXPIRED` - the `Offer` passed its irrevocable deadline;
    /// - `LISTING_NO_LONGER_ACTIVE` - the `Listing` went inactive before
    ///                                the counter took hold;
    /// - `INVALID_PRICE` - the price is not positive, or the deposit is
    ///                     negative;
    /// - `INVALID_DATE_ORDERING` - the irrevocable and closing dates are not
    ///                             ordered into the future.
    #[tracing::instrument(
        skip_all,
        fields(
            closing_at = ?closing_at.as_ref().map(DateTime::to_rfc3339),
            deposit = ?deposit.as_ref().map(ToString::to_string),
            deposit_due_at = ?deposit_due_at
                .as_ref()
                .map(DateTime::to_rfc3339),
            gql.name = "counterOffer",
            id = %id,
            irrevocable_at = ?irrevocable_at
                .as_ref()
                .map(DateTime::to_rfc3339),
            otel.name = Self::SPAN_NAME,
            price = ?price.as_ref().map(ToString::to_string),
        ),
    )]
    #[expect(clippy::too_many_arguments, reason = "still readable")]
    pub async fn counter_offer(
        id: api::offer::Id,
        price: Option<Money>,
        deposit: Option<Money>,
        deposit_due_at: Option<DateTime>,
        irrevocable_at: Option<DateTime>,
        closing_at: Option<DateTime>,
        terms: Option<Vec<api::offer::TermInput>>,
        inclusions: Option<Vec<api::offer::Item>>,
        exclusions: Option<Vec<api::offer::Item>>,
        ctx: &Context,
    ) -> Result<api::Offer, Error> {
        let actor_id = ctx.actor()?;
        let terms = terms
            .map(|terms| {
                terms
                    .into_iter()
                    .map(TryInto::try_into)
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()
            .map_err(AsError::into_error)?;

        ctx.service()
            .execute(command::CounterOffer {
                offer_id: id.into(),
                actor_id: actor_id.into(),
                price,
                deposit,
                deposit_due_at: deposit_due_at.map(DateTime::coerce),
                irrevocable_at: irrevocable_at.map(DateTime::coerce),
                closing_at: closing_at.map(DateTime::coerce),
                terms,
                inclusions: inclusions
                    .map(|i| i.into_iter().map(Into::into).collect()),
                exclusions: exclusions
                    .map(|e| e.into_iter().map(Into::into).collect()),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Withdraws the `Offer` with the provided ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_FOUND` - the `Offer` with the provided ID does not exist;
    /// - `NOT_AUTHORIZED` - the acting `User` is not the buyer of the
    ///                      `Offer`;
    /// - `INVALID_TRANSITION` - the `Offer` cannot be withdrawn from its
    ///                          current status.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "withdrawOffer",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn withdraw_offer(
        id: api::offer::Id,
        ctx: &Context,
    ) -> Result<api::Offer, Error> {
        let actor_id = ctx.actor()?;

        ctx.service()
            .execute(command::WithdrawOffer {
                offer_id: id.into(),
                actor_id: actor_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Advances the `Transaction` with the provided ID to the specified
    /// workflow step.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_FOUND` - the `Transaction` with the provided ID does not
    ///                 exist;
    /// - `NOT_AUTHORIZED` - the acting `User` is not a party to the
    ///                      `Transaction`;
    /// - `INVALID_TRANSITION` - the requested step doesn't follow the
    ///                          current one, the `Transaction` is already
    ///                          terminal, or its conditions remain
    ///                          unresolved.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "advanceTransactionStep",
            id = %id,
            otel.name = Self::SPAN_NAME,
            step = ?step,
        ),
    )]
    pub async fn advance_transaction_step(
        id: api::transaction::Id,
        step: api::transaction::Step,
        notes: Option<api::transaction::Notes>,
        ctx: &Context,
    ) -> Result<api::Transaction, Error> {
        let actor_id = ctx.actor()?;

        ctx.service()
            .execute(command::AdvanceTransactionStep {
                transaction_id: id.into(),
                actor_id: actor_id.into(),
                step: step.into(),
                notes: notes.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Resolves the `Condition` with the provided ID on the `Transaction`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_FOUND` - the `Transaction` or the `Condition` does not exist;
    /// - `NOT_AUTHORIZED` - the acting `User` is not a party to the
    ///                      `Transaction`;
    /// - `INVALID_TRANSITION` - the `Transaction` is already terminal;
    /// - `CONDITION_ALREADY_RESOLVED` - the `Condition` is already
    ///                                  resolved.
    #[tracing::instrument(
        skip_all,
        fields(
            condition_id = %condition_id,
            gql.name = "resolveCondition",
            id = %id,
            otel.name = Self::SPAN_NAME,
            outcome = ?outcome,
        ),
    )]
    pub async fn resolve_condition(
        id: api::transaction::Id,
        condition_id: api::condition::Id,
        outcome: api::condition::Outcome,
        notes: Option<api::condition::Notes>,
        ctx: &Context,
    ) -> Result<api::Transaction, Error> {
        let actor_id = ctx.actor()?;

        ctx.service()
            .execute(command::ResolveCondition {
                transaction_id: id.into(),
                condition_id: condition_id.into(),
                actor_id: actor_id.into(),
                outcome: outcome.into(),
                notes: notes.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Extends the deadline of the `Condition` with the provided ID.
    ///
    /// Both parties must agree to the extension.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_FOUND` - the `Transaction` or the `Condition` does not exist;
    /// - `NOT_AUTHORIZED` - the acting `User` is not a party to the
    ///                      `Transaction`;
    /// - `INVALID_TRANSITION` - the `Transaction` is already terminal;
    /// - `CONDITION_ALREADY_RESOLVED` - the `Condition` is already
    ///                                  resolved;
    /// - `EXTENSION_NOT_AGREED` - one of the parties did not agree to the
    ///                            extension;
    /// - `INVALID_DATE_ORDERING` - the new deadline does not move the
    ///                             current one forward.
    #[tracing::instrument(
        skip_all,
        fields(
            buyer_agreed = %buyer_agreed,
            condition_id = %condition_id,
            gql.name = "extendConditionDeadline",
            id = %id,
            new_deadline = %new_deadline.to_rfc3339(),
            otel.name = Self::SPAN_NAME,
            seller_agreed = %seller_agreed,
        ),
    )]
    pub async fn extend_condition_deadline(
        id: api::transaction::Id,
        condition_id: api::condition::Id,
        new_deadline: DateTime,
        buyer_agreed: bool,
        seller_agreed: bool,
        ctx: &Context,
    ) -> Result<api::Transaction, Error> {
        let actor_id = ctx.actor()?;

        ctx.service()
            .execute(command::ExtendConditionDeadline {
                transaction_id: id.into(),
                condition_id: condition_id.into(),
                actor_id: actor_id.into(),
                new_deadline: new_deadline.coerce(),
                buyer_agreed,
                seller_agreed,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Cancels the `Transaction` with the provided ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_FOUND` - the `Transaction` with the provided ID does not
    ///                 exist;
    /// - `NOT_AUTHORIZED` - the acting `User` is not a party to the
    ///                      `Transaction`;
    /// - `INVALID_TRANSITION` - the `Transaction` is already terminal.
    #[tracing::instrument(
        skip_all,
        fields(
            deposit_disposition = ?deposit_disposition,
            gql.name = "cancelTransaction",
            id = %id,
            otel.name = Self::SPAN_NAME,
            reason = %reason,
        ),
    )]
    pub async fn cancel_transaction(
        id: api::transaction::Id,
        reason: api::transaction::CancellationReason,
        deposit_disposition: api::transaction::DepositDisposition,
        ctx: &Context,
    ) -> Result<api::Transaction, Error> {
        let actor_id = ctx.actor()?;

        ctx.service()
            .execute(command::CancelTransaction {
                transaction_id: id.into(),
                actor_id: actor_id.into(),
                reason: reason.into(),
                deposit_disposition: deposit_disposition.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

impl AsError for command::submit_offer::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::InvalidDateOrdering => DateError::InvalidOrdering.into(),
            Self::InvalidPrice => PriceError::Invalid.into(),
            Self::ListingNotActive(_) => ListingError::NoLongerActive.into(),
            Self::ListingNotExists(_) => ListingError::NotExists.into(),
        })
    }
}

impl AsError for command::view_offer::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::InvalidTransition(_, _) => {
                OfferError::InvalidTransition.into()
            }
            Self::NotAuthorized(_) => api::PartyError::NotAuthorized.into(),
            Self::OfferNotExists(_) => OfferError::NotExists.into(),
        })
    }
}

impl AsError for command::accept_offer::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::InvalidTransition(_, _) => {
                OfferError::InvalidTransition.into()
            }
            Self::ListingNoLongerActive(_) => {
                ListingError::NoLongerActive.into()
            }
            Self::ListingNotExists(_) => ListingError::NotExists.into(),
            Self::NotAuthorized(_) => api::PartyError::NotAuthorized.into(),
            Self::OfferExpired(_) => OfferError::Expired.into(),
            Self::OfferNotExists(_) => OfferError::NotExists.into(),
            Self::PropertyNotExists(_) => return None,
        })
    }
}

impl AsError for command::reject_offer::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::InvalidTransition(_, _) => {
                OfferError::InvalidTransition.into()
            }
            Self::NotAuthorized(_) => api::PartyError::NotAuthorized.into(),
            Self::OfferExpired(_) => OfferError::Expired.into(),
            Self::OfferNotExists(_) => OfferError::NotExists.into(),
        })
    }
}

impl AsError for command::counter_offer::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::InvalidDateOrdering => DateError::InvalidOrdering.into(),
            Self::InvalidPrice => PriceError::Invalid.into(),
            Self::InvalidTransition(_, _) => {
                OfferError::InvalidTransition.into()
            }
            Self::ListingNoLongerActive(_) => {
                ListingError::NoLongerActive.into()
            }
            Self::ListingNotExists(_) => ListingError::NotExists.into(),
            Self::NotAuthorized(_) => api::PartyError::NotAuthorized.into(),
            Self::OfferExpired(_) => OfferError::Expired.into(),
            Self::OfferNotExists(_) => OfferError::NotExists.into(),
        })
    }
}

impl AsError for command::withdraw_offer::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::InvalidTransition(_, _) => {
                OfferError::InvalidTransition.into()
            }
            Self::NotAuthorized(_) => api::PartyError::NotAuthorized.into(),
            Self::OfferNotExists(_) => OfferError::NotExists.into(),
        })
    }
}

impl AsError for command::advance_transaction_step::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::ConditionsUnresolved(_) => {
                TransactionError::ConditionsUnresolved.into()
            }
            Self::Db(e) => return e.try_as_error(),
            Self::ListingNotExists(_) | Self::PropertyNotExists(_) => {
                return None
            }
            Self::NotAuthorized(_) => api::PartyError::NotAuthorized.into(),
            Self::StepOutOfOrder(_, _) => {
                TransactionError::StepOutOfOrder.into()
            }
            Self::TransactionNotExists(_) => TransactionError::NotExists.into(),
            Self::TransactionTerminal(_, _) => {
                TransactionError::Terminal.into()
            }
        })
    }
}

impl AsError for command::resolve_condition::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::ConditionAlreadyResolved(_) => {
                ConditionError::AlreadyResolved.into()
            }
            Self::ConditionNotExists(_) => ConditionError::NotExists.into(),
            Self::Db(e) => return e.try_as_error(),
            Self::ListingNotExists(_) | Self::PropertyNotExists(_) => {
                return None
            }
            Self::NotAuthorized(_) => api::PartyError::NotAuthorized.into(),
            Self::TransactionNotExists(_) => TransactionError::NotExists.into(),
            Self::TransactionTerminal(_, _) => {
                TransactionError::Terminal.into()
            }
        })
    }
}

impl AsError for command::extend_condition_deadline::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::ConditionAlreadyResolved(_) => {
                ConditionError::AlreadyResolved.into()
            }
            Self::ConditionNotExists(_) => ConditionError::NotExists.into(),
            Self::Db(e) => return e.try_as_error(),
            Self::ExtensionNotAgreed(_) => {
                ConditionError::ExtensionNotAgreed.into()
            }
            Self::InvalidDateOrdering => DateError::InvalidOrdering.into(),
            Self::NotAuthorized(_) => api::PartyError::NotAuthorized.into(),
            Self::TransactionNotExists(_) => TransactionError::NotExists.into(),
            Self::TransactionTerminal(_, _) => {
                TransactionError::Terminal.into()
            }
        })
    }
}

impl AsError for command::cancel_transaction::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::ListingNotExists(_) | Self::PropertyNotExists(_) => {
                return None
            }
            Self::NotAuthorized(_) => api::PartyError::NotAuthorized.into(),
            Self::TransactionNotExists(_) => TransactionError::NotExists.into(),
            Self::TransactionTerminal(_, _) => {
                TransactionError::Terminal.into()
            }
        })
    }
}

define_error! {
    enum ConditionError {
        #[code = "CONDITION_ALREADY_RESOLVED"]
        #[status = CONFLICT]
        #[message = "`Condition` with the provided ID is already resolved"]
        AlreadyResolved,

        #[code = "EXTENSION_NOT_AGREED"]
        #[status = BAD_REQUEST]
        #[message = "Both parties must agree to a `Condition` deadline \
                     extension"]
        ExtensionNotAgreed,

        #[code = "NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "`Condition` with the provided ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum DateError {
        #[code = "INVALID_DATE_ORDERING"]
        #[status = BAD_REQUEST]
        #[message = "Provided dates are not ordered into the future"]
        InvalidOrdering,
    }
}

define_error! {
    enum ListingError {
        #[code = "LISTING_NO_LONGER_ACTIVE"]
        #[status = CONFLICT]
        #[message = "`Listing` no longer accepts offers"]
        NoLongerActive,

        #[code = "NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "`Listing` with the provided ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum OfferError {
        #[code = "OFFER_EXPIRED"]
        #[status = CONFLICT]
        #[message = "`Offer` passed its irrevocable deadline"]
        Expired,

        #[code = "INVALID_TRANSITION"]
        #[status = CONFLICT]
        #[message = "`Offer` cannot make this transition from its current \
                     status"]
        InvalidTransition,

        #[code = "NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "`Offer` with the provided ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum PriceError {
        #[code = "INVALID_PRICE"]
        #[status = BAD_REQUEST]
        #[message = "Price must be positive and deposit non-negative"]
        Invalid,
    }
}

define_error! {
    enum TransactionError {
        #[code = "INVALID_TRANSITION"]
        #[status = CONFLICT]
        #[message = "`Transaction` still has unresolved conditions"]
        ConditionsUnresolved,

        #[code = "NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "`Transaction` with the provided ID does not exist"]
        NotExists,

        #[code = "INVALID_TRANSITION"]
        #[status = CONFLICT]
        #[message = "Requested step does not follow the current one"]
        StepOutOfOrder,

        #[code = "INVALID_TRANSITION"]
        #[status = CONFLICT]
        #[message = "`Transaction` already reached a terminal status"]
        Terminal,
    }
}
