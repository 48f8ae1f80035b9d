//! [`Notifier`]-related implementations.

use std::convert::Infallible;

use common::Money;
use tracing as log;

use crate::domain::{condition, listing, offer, transaction, user};
#[cfg(doc)]
use crate::domain::{Condition, Listing, Offer, Transaction, User};

/// Notification dispatch operation.
pub use common::Handler as Notifier;

/// Operation of dispatching an [`Event`] to the interested [`User`]s.
///
/// Dispatch is fire-and-forget: callers log failures and move on, the
/// outcome of a command never depends on it.
#[derive(Clone, Debug)]
pub struct Notify(pub Event);

/// Domain event worth telling a [`User`] about.
#[derive(Clone, Debug)]
pub enum Event {
    /// A new [`Offer`] arrived on a [`Listing`].
    OfferReceived {
        /// ID of the received [`Offer`].
        offer_id: offer::Id,

        /// ID of the [`Listing`] the [`Offer`] answers.
        listing_id: listing::Id,

        /// ID of the selling [`User`] to notify.
        seller_id: user::Id,
    },

    /// An [`Offer`] was accepted.
    OfferAccepted {
        /// ID of the accepted [`Offer`].
        offer_id: offer::Id,

        /// ID of the created [`Transaction`].
        transaction_id: transaction::Id,

        /// ID of the buying [`User`] to notify.
        buyer_id: user::Id,
    },

    /// An [`Offer`] was rejected.
    OfferRejected {
        /// ID of the rejected [`Offer`].
        offer_id: offer::Id,

        /// ID of the buying [`User`] to notify.
        buyer_id: user::Id,
    },

    /// A [`Condition`] deadline is approaching.
    ConditionReminder {
        /// ID of the [`Condition`] nearing its deadline.
        condition_id: condition::Id,

        /// ID of the owning [`Transaction`].
        transaction_id: transaction::Id,

        /// ID of the [`User`] to remind.
        user_id: user::Id,

        /// Deadline being approached.
        deadline: condition::DeadlineDateTime,
    },

    /// A [`Transaction`] closing date is approaching.
    ClosingReminder {
        /// ID of the closing [`Transaction`].
        transaction_id: transaction::Id,

        /// ID of the [`User`] to remind.
        user_id: user::Id,

        /// Closing date being approached.
        closing_at: transaction::ClosingDateTime,
    },

    /// A [`Transaction`] completed with a sale.
    TransactionComplete {
        /// ID of the completed [`Transaction`].
        transaction_id: transaction::Id,

        /// ID of the buying [`User`].
        buyer_id: user::Id,

        /// ID of the selling [`User`].
        seller_id: user::Id,

        /// Final sale price.
        sale_price: Money,
    },

    /// A [`Transaction`] was cancelled.
    TransactionCancelled {
        /// ID of the cancelled [`Transaction`].
        transaction_id: transaction::Id,

        /// ID of the buying [`User`].
        buyer_id: user::Id,

        /// ID of the selling [`User`].
        seller_id: user::Id,
    },
}

/// [`Notifier`] writing every [`Event`] to the structured log.
///
/// Stands in for real delivery channels (email, push), which are upstream
/// collaborators.
#[derive(Clone, Copy, Debug, Default)]
pub struct Log;

impl Notifier<Notify> for Log {
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Notify(event): Notify,
    ) -> Result<Self::Ok, Self::Err> {
        match event {
            Event::OfferReceived {
                offer_id,
                listing_id,
                seller_id,
            } => log::info!(
                %offer_id, %listing_id, %seller_id,
                "offer received",
            ),
            Event::OfferAccepted {
                offer_id,
                transaction_id,
                buyer_id,
            } => log::info!(
                %offer_id, %transaction_id, %buyer_id,
                "offer accepted",
            ),
            Event::OfferRejected { offer_id, buyer_id } => {
                log::info!(%offer_id, %buyer_id, "offer rejected");
            }
            Event::ConditionReminder {
                condition_id,
                transaction_id,
                user_id,
                deadline,
            } => log::info!(
                %condition_id, %transaction_id, %user_id, %deadline,
                "condition deadline approaching",
            ),
            Event::ClosingReminder {
                transaction_id,
                user_id,
                closing_at,
            } => log::info!(
                %transaction_id, %user_id, %closing_at,
                "closing date approaching",
            ),
            Event::TransactionComplete {
                transaction_id,
                buyer_id,
                seller_id,
                sale_price,
            } => log::info!(
                %transaction_id, %buyer_id, %seller_id, %sale_price,
                "transaction complete",
            ),
            Event::TransactionCancelled {
                transaction_id,
                buyer_id,
                seller_id,
            } => log::info!(
                %transaction_id, %buyer_id, %seller_id,
                "transaction cancelled",
            ),
        }
        Ok(())
    }
}
