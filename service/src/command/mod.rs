//! [`Command`] definition.

pub mod accept_offer;
pub mod advance_transaction_step;
pub mod cancel_transaction;
pub mod counter_offer;
pub mod extend_condition_deadline;
pub mod reject_offer;
pub mod resolve_condition;
pub mod submit_offer;
pub mod view_offer;
pub mod withdraw_offer;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    accept_offer::AcceptOffer,
    advance_transaction_step::AdvanceTransactionStep,
    cancel_transaction::CancelTransaction, counter_offer::CounterOffer,
    extend_condition_deadline::ExtendConditionDeadline,
    reject_offer::RejectOffer, resolve_condition::ResolveCondition,
    submit_offer::SubmitOffer, view_offer::ViewOffer,
    withdraw_offer::WithdrawOffer,
};

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::{
        operations::{By, Insert, Select},
        DateTime, Money, Percent,
    };
    use rust_decimal::Decimal;

    use crate::{
        domain::{
            condition, jurisdiction, listing, offer, property, transaction,
            user, Listing, Offer, Property, Transaction,
        },
        infra::{notifier, payments, Inmem},
        task, Config, Service,
    };

    use super::*;

    type Svc = Service<Inmem, notifier::Log, payments::Invoicer>;

    fn service() -> Svc {
        let (svc, _bg) = Service::new(
            Config {
                commission_rate: Percent::new(Decimal::new(25, 1)).unwrap(),
                closing_reminders: task::closing_reminders::Config {
                    interval: Duration::from_secs(60 * 60),
                    window: Duration::from_secs(60 * 60 * 24),
                },
            },
            Inmem::new(),
            notifier::Log,
            payments::Invoicer,
        );
        svc
    }

    fn money(dollars: i64) -> Money {
        Money::cad(Decimal::new(dollars, 0))
    }

    fn term(kind: condition::Kind, days: u16) -> offer::Term {
        offer::Term {
            kind,
            description: condition::Description::new("as negotiated")
                .unwrap(),
            days_to_deadline: days,
        }
    }

    async fn seed(svc: &Svc) -> Listing {
        let property = Property {
            id: property::Id::new(),
            address: "123 Maple Ave, Toronto".parse().unwrap(),
            province: jurisdiction::Province::On,
            status: property::Status::Active,
            created_at: property::CreationDateTime::now(),
        };
        let listing = Listing {
            id: listing::Id::new(),
            property_id: property.id,
            seller_id: user::Id::new(),
            list_price: money(450_000),
            status: listing::Status::Active,
            sale_price: None,
            sold_at: None,
            created_at: listing::CreationDateTime::now(),
        };
        svc.database().execute(Insert(property)).await.unwrap();
        svc.database()
            .execute(Insert(listing.clone()))
            .await
            .unwrap();
        listing
    }

    fn submission(
        listing: &Listing,
        buyer_id: user::Id,
        terms: Vec<offer::Term>,
    ) -> SubmitOffer {
        let now = DateTime::now();
        SubmitOffer {
            listing_id: listing.id,
            buyer_id,
            price: money(470_000),
            deposit: money(20_000),
            deposit_due_at: (now + Duration::from_secs(86_400)).coerce(),
            irrevocable_at: (now + Duration::from_secs(86_400 * 3)).coerce(),
            closing_at: (now + Duration::from_secs(86_400 * 60)).coerce(),
            terms,
            inclusions: Vec::new(),
            exclusions: Vec::new(),
        }
    }

    async fn offer_by_id(svc: &Svc, id: offer::Id) -> Offer {
        svc.database()
            .execute(Select(By::<Option<Offer>, _>::new(id)))
            .await
            .unwrap()
            .unwrap()
    }

    async fn listing_by_id(svc: &Svc, id: listing::Id) -> Listing {
        svc.database()
            .execute(Select(By::<Option<Listing>, _>::new(id)))
            .await
            .unwrap()
            .unwrap()
    }

    async fn transaction_by_id(
        svc: &Svc,
        id: transaction::Id,
    ) -> Transaction {
        svc.database()
            .execute(Select(By::<Option<Transaction>, _>::new(id)))
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn submission_validates_price_and_dates() {
        let svc = service();
        let listing = seed(&svc).await;
        let buyer = user::Id::new();

        let mut cmd = submission(&listing, buyer, Vec::new());
        cmd.price = money(0);
        assert!(matches!(
            svc.execute(cmd).await.unwrap_err().as_ref(),
            submit_offer::ExecutionError::InvalidPrice,
        ));

        let mut cmd = submission(&listing, buyer, Vec::new());
        cmd.irrevocable_at =
            (DateTime::now() - Duration::from_secs(60)).coerce();
        assert!(matches!(
            svc.execute(cmd).await.unwrap_err().as_ref(),
            submit_offer::ExecutionError::InvalidDateOrdering,
        ));

        let mut cmd = submission(&listing, buyer, Vec::new());
        cmd.closing_at = cmd.irrevocable_at.coerce();
        assert!(matches!(
            svc.execute(cmd).await.unwrap_err().as_ref(),
            submit_offer::ExecutionError::InvalidDateOrdering,
        ));

        let mut cmd = submission(&listing, buyer, Vec::new());
        cmd.listing_id = listing::Id::new();
        assert!(matches!(
            svc.execute(cmd).await.unwrap_err().as_ref(),
            submit_offer::ExecutionError::ListingNotExists(_),
        ));
    }

    #[tokio::test]
    async fn viewing_marks_the_offer_viewed() {
        let svc = service();
        let listing = seed(&svc).await;

        let offer = svc
            .execute(submission(&listing, user::Id::new(), Vec::new()))
            .await
            .unwrap();

        assert!(matches!(
            svc.execute(ViewOffer {
                offer_id: offer.id,
                actor_id: user::Id::new(),
            })
            .await
            .unwrap_err()
            .as_ref(),
            view_offer::ExecutionError::NotAuthorized(_),
        ));

        let viewed = svc
            .execute(ViewOffer {
                offer_id: offer.id,
                actor_id: listing.seller_id,
            })
            .await
            .unwrap();
        assert_eq!(viewed.status, offer::Status::Viewed);

        // Repeated viewing is a no-op.
        let viewed = svc
            .execute(ViewOffer {
                offer_id: offer.id,
                actor_id: listing.seller_id,
            })
            .await
            .unwrap();
        assert_eq!(viewed.status, offer::Status::Viewed);
    }

    #[tokio::test]
    async fn rejection_is_terminal() {
        let svc = service();
        let listing = seed(&svc).await;

        let offer = svc
            .execute(submission(&listing, user::Id::new(), Vec::new()))
            .await
            .unwrap();
        let reject = RejectOffer {
            offer_id: offer.id,
            actor_id: listing.seller_id,
        };

        let rejected = svc.execute(reject).await.unwrap();
        assert_eq!(rejected.status, offer::Status::Rejected);

        // Retrying is a no-op.
        let rejected = svc.execute(reject).await.unwrap();
        assert_eq!(rejected.status, offer::Status::Rejected);

        // A rejected offer cannot be accepted anymore.
        assert!(matches!(
            svc.execute(AcceptOffer {
                offer_id: offer.id,
                actor_id: listing.seller_id,
            })
            .await
            .unwrap_err()
            .as_ref(),
            accept_offer::ExecutionError::InvalidTransition(
                _,
                offer::Status::Rejected,
            ),
        ));
    }

    #[tokio::test]
    async fn accepting_rejects_all_other_open_offers() {
        let svc = service();
        let listing = seed(&svc).await;

        let first = svc
            .execute(submission(&listing, user::Id::new(), Vec::new()))
            .await
            .unwrap();
        let second = svc
            .execute(submission(&listing, user::Id::new(), Vec::new()))
            .await
            .unwrap();
        let third = svc
            .execute(submission(&listing, user::Id::new(), Vec::new()))
            .await
            .unwrap();

        let tx = svc
            .execute(AcceptOffer {
                offer_id: second.id,
                actor_id: listing.seller_id,
            })
            .await
            .unwrap();
        assert_eq!(tx.offer_id, second.id);
        assert_eq!(tx.status, transaction::Status::Firm);

        assert_eq!(
            offer_by_id(&svc, first.id).await.status,
            offer::Status::Rejected,
        );
        assert_eq!(
            offer_by_id(&svc, second.id).await.status,
            offer::Status::Accepted,
        );
        assert_eq!(
            offer_by_id(&svc, third.id).await.status,
            offer::Status::Rejected,
        );
        assert_eq!(
            listing_by_id(&svc, listing.id).await.status,
            listing::Status::Pending,
        );
    }

    #[tokio::test]
    async fn concurrent_acceptances_pick_exactly_one_winner() {
        let svc = service();
        let listing = seed(&svc).await;

        let a = svc
            .execute(submission(&listing, user::Id::new(), Vec::new()))
            .await
            .unwrap();
        let b = svc
            .execute(submission(&listing, user::Id::new(), Vec::new()))
            .await
            .unwrap();

        let (ra, rb) = futures::join!(
            svc.execute(AcceptOffer {
                offer_id: a.id,
                actor_id: listing.seller_id,
            }),
            svc.execute(AcceptOffer {
                offer_id: b.id,
                actor_id: listing.seller_id,
            }),
        );
        assert!(ra.is_ok() ^ rb.is_ok());
        assert_eq!(
            listing_by_id(&svc, listing.id).await.status,
            listing::Status::Pending,
        );
    }

    #[tokio::test]
    async fn accepting_again_returns_the_same_transaction() {
        let svc = service();
        let listing = seed(&svc).await;

        let offer = svc
            .execute(submission(&listing, user::Id::new(), Vec::new()))
            .await
            .unwrap();
        let accept = AcceptOffer {
            offer_id: offer.id,
            actor_id: listing.seller_id,
        };

        let tx = svc.execute(accept).await.unwrap();
        let again = svc.execute(accept).await.unwrap();
        assert_eq!(tx.id, again.id);
    }

    #[tokio::test]
    async fn accepting_an_expired_offer_fails() {
        let svc = service();
        let listing = seed(&svc).await;
        let now = DateTime::now();

        let stale = Offer {
            id: offer::Id::new(),
            property_id: listing.property_id,
            listing_id: listing.id,
            buyer_id: user::Id::new(),
            seller_id: listing.seller_id,
            price: money(470_000),
            deposit: money(20_000),
            deposit_due_at: now.coerce(),
            irrevocable_at: (now - Duration::from_secs(60)).coerce(),
            closing_at: (now + Duration::from_secs(86_400 * 30)).coerce(),
            terms: Vec::new(),
            inclusions: Vec::new(),
            exclusions: Vec::new(),
            status: offer::Status::Submitted,
            parent_offer: None,
            countered_by: None,
            buyer_signed_at: Some(now.coerce()),
            seller_signed_at: None,
            created_at: now.coerce(),
        };
        svc.database()
            .execute(Insert(stale.clone()))
            .await
            .unwrap();

        assert!(matches!(
            svc.execute(AcceptOffer {
                offer_id: stale.id,
                actor_id: listing.seller_id,
            })
            .await
            .unwrap_err()
            .as_ref(),
            accept_offer::ExecutionError::OfferExpired(_),
        ));
        assert_eq!(
            listing_by_id(&svc, listing.id).await.status,
            listing::Status::Active,
        );
    }

    #[tokio::test]
    async fn withdrawing_an_accepted_offer_fails() {
        let svc = service();
        let listing = seed(&svc).await;
        let buyer = user::Id::new();

        let offer = svc
            .execute(submission(&listing, buyer, Vec::new()))
            .await
            .unwrap();
        let _ = svc
            .execute(AcceptOffer {
                offer_id: offer.id,
                actor_id: listing.seller_id,
            })
            .await
            .unwrap();

        assert!(matches!(
            svc.execute(WithdrawOffer {
                offer_id: offer.id,
                actor_id: buyer,
            })
            .await
            .unwrap_err()
            .as_ref(),
            withdraw_offer::ExecutionError::InvalidTransition(
                _,
                offer::Status::Accepted,
            ),
        ));
    }

    #[tokio::test]
    async fn buyer_withdraws_an_open_offer() {
        let svc = service();
        let listing = seed(&svc).await;
        let buyer = user::Id::new();

        let offer = svc
            .execute(submission(&listing, buyer, Vec::new()))
            .await
            .unwrap();

        let withdrawn = svc
            .execute(WithdrawOffer {
                offer_id: offer.id,
                actor_id: buyer,
            })
            .await
            .unwrap();
        assert_eq!(withdrawn.status, offer::Status::Withdrawn);

        // Retrying is a no-op.
        let withdrawn = svc
            .execute(WithdrawOffer {
                offer_id: offer.id,
                actor_id: buyer,
            })
            .await
            .unwrap();
        assert_eq!(withdrawn.status, offer::Status::Withdrawn);
    }

    #[tokio::test]
    async fn countering_swaps_the_negotiating_roles() {
        let svc = service();
        let listing = seed(&svc).await;
        let buyer = user::Id::new();

        let parent = svc
            .execute(submission(&listing, buyer, Vec::new()))
            .await
            .unwrap();

        let counter = svc
            .execute(CounterOffer {
                offer_id: parent.id,
                actor_id: listing.seller_id,
                price: Some(money(485_000)),
                deposit: None,
                deposit_due_at: None,
                irrevocable_at: None,
                closing_at: None,
                terms: None,
                inclusions: None,
                exclusions: None,
            })
            .await
            .unwrap();

        assert_eq!(counter.buyer_id, listing.seller_id);
        assert_eq!(counter.seller_id, buyer);
        assert_eq!(counter.price, money(485_000));
        assert_eq!(counter.deposit, parent.deposit);
        assert_eq!(counter.parent_offer, Some(parent.id));
        assert_eq!(counter.status, offer::Status::Submitted);

        let parent = offer_by_id(&svc, parent.id).await;
        assert_eq!(parent.status, offer::Status::Countered);
        assert_eq!(parent.countered_by, Some(counter.id));
    }

    #[tokio::test]
    async fn favorable_resolutions_firm_up_the_transaction() {
        let svc = service();
        let listing = seed(&svc).await;
        let buyer = user::Id::new();

        let offer = svc
            .execute(submission(
                &listing,
                buyer,
                vec![
                    term(condition::Kind::Financing, 10),
                    term(condition::Kind::Inspection, 7),
                ],
            ))
            .await
            .unwrap();
        let tx = svc
            .execute(AcceptOffer {
                offer_id: offer.id,
                actor_id: listing.seller_id,
            })
            .await
            .unwrap();
        assert_eq!(tx.status, transaction::Status::Conditional);

        let financing = tx
            .conditions
            .iter()
            .find(|c| c.kind == condition::Kind::Financing)
            .unwrap();
        let inspection = tx
            .conditions
            .iter()
            .find(|c| c.kind == condition::Kind::Inspection)
            .unwrap();

        let tx = svc
            .execute(ResolveCondition {
                transaction_id: tx.id,
                condition_id: financing.id,
                actor_id: buyer,
                outcome: condition::Outcome::Fulfilled,
                notes: None,
            })
            .await
            .unwrap();
        assert_eq!(tx.status, transaction::Status::Conditional);
        assert!(tx.firm_at.is_none());

        let tx = svc
            .execute(ResolveCondition {
                transaction_id: tx.id,
                condition_id: inspection.id,
                actor_id: buyer,
                outcome: condition::Outcome::Waived,
                notes: None,
            })
            .await
            .unwrap();
        assert_eq!(tx.status, transaction::Status::Firm);
        assert!(tx.firm_at.is_some());
        assert_eq!(
            tx.current_step,
            transaction::Step::ConditionsComplete,
        );

        // Resolving again fails.
        assert!(matches!(
            svc.execute(ResolveCondition {
                transaction_id: tx.id,
                condition_id: inspection.id,
                actor_id: buyer,
                outcome: condition::Outcome::Fulfilled,
                notes: None,
            })
            .await
            .unwrap_err()
            .as_ref(),
            resolve_condition::ExecutionError::ConditionAlreadyResolved(_),
        ));
    }

    #[tokio::test]
    async fn failed_condition_cancels_and_relists() {
        let svc = service();
        let listing = seed(&svc).await;
        let buyer = user::Id::new();

        let offer = svc
            .execute(submission(
                &listing,
                buyer,
                vec![term(condition::Kind::Financing, 10)],
            ))
            .await
            .unwrap();
        let tx = svc
            .execute(AcceptOffer {
                offer_id: offer.id,
                actor_id: listing.seller_id,
            })
            .await
            .unwrap();
        let financing = tx.conditions.first().unwrap();

        let tx = svc
            .execute(ResolveCondition {
                transaction_id: tx.id,
                condition_id: financing.id,
                actor_id: buyer,
                outcome: condition::Outcome::Failed,
                notes: None,
            })
            .await
            .unwrap();
        assert_eq!(tx.status, transaction::Status::Cancelled);

        let cancellation = tx.cancellation.unwrap();
        assert_eq!(cancellation.failed_condition, Some(financing.id));
        assert_eq!(
            cancellation.deposit_disposition,
            transaction::DepositDisposition::ReturnedToBuyer,
        );
        assert_eq!(
            listing_by_id(&svc, listing.id).await.status,
            listing::Status::Active,
        );
    }

    #[tokio::test]
    async fn extension_binds_only_with_both_agreements() {
        let svc = service();
        let listing = seed(&svc).await;
        let buyer = user::Id::new();

        let offer = svc
            .execute(submission(
                &listing,
                buyer,
                vec![term(condition::Kind::Financing, 10)],
            ))
            .await
            .unwrap();
        let tx = svc
            .execute(AcceptOffer {
                offer_id: offer.id,
                actor_id: listing.seller_id,
            })
            .await
            .unwrap();
        let financing = tx.conditions.first().unwrap();
        let new_deadline = financing.deadline + Duration::from_secs(86_400 * 5);

        assert!(matches!(
            svc.execute(ExtendConditionDeadline {
                transaction_id: tx.id,
                condition_id: financing.id,
                actor_id: buyer,
                new_deadline,
                buyer_agreed: true,
                seller_agreed: false,
            })
            .await
            .unwrap_err()
            .as_ref(),
            extend_condition_deadline::ExecutionError::ExtensionNotAgreed(_),
        ));
        let unchanged = transaction_by_id(&svc, tx.id).await;
        assert_eq!(
            unchanged.condition(financing.id).unwrap().deadline,
            financing.deadline,
        );

        let extended = svc
            .execute(ExtendConditionDeadline {
                transaction_id: tx.id,
                condition_id: financing.id,
                actor_id: buyer,
                new_deadline,
                buyer_agreed: true,
                seller_agreed: true,
            })
            .await
            .unwrap();
        let cond = extended.condition(financing.id).unwrap();
        assert_eq!(cond.status, condition::Status::Extended);
        assert_eq!(cond.deadline, new_deadline);
        assert_eq!(cond.extensions.len(), 1);
        assert_eq!(extended.condition_deadline, Some(new_deadline));

        // Extended, not resolved: still fine to resolve afterwards.
        let tx = svc
            .execute(ResolveCondition {
                transaction_id: tx.id,
                condition_id: financing.id,
                actor_id: buyer,
                outcome: condition::Outcome::Fulfilled,
                notes: None,
            })
            .await
            .unwrap();
        assert_eq!(tx.status, transaction::Status::Firm);
    }

    #[tokio::test]
    async fn steps_advance_only_one_forward() {
        let svc = service();
        let listing = seed(&svc).await;
        let buyer = user::Id::new();

        let offer = svc
            .execute(submission(&listing, buyer, Vec::new()))
            .await
            .unwrap();
        let tx = svc
            .execute(AcceptOffer {
                offer_id: offer.id,
                actor_id: listing.seller_id,
            })
            .await
            .unwrap();

        // Skipping a step.
        assert!(matches!(
            svc.execute(AdvanceTransactionStep {
                transaction_id: tx.id,
                actor_id: buyer,
                step: transaction::Step::ConditionsPending,
                notes: None,
            })
            .await
            .unwrap_err()
            .as_ref(),
            advance_transaction_step::ExecutionError::StepOutOfOrder(_, _),
        ));

        let tx = svc
            .execute(AdvanceTransactionStep {
                transaction_id: tx.id,
                actor_id: buyer,
                step: transaction::Step::DepositPending,
                notes: None,
            })
            .await
            .unwrap();
        assert_eq!(tx.current_step, transaction::Step::DepositPending);
        assert_eq!(tx.step_history.len(), 2);

        // Moving backwards.
        assert!(matches!(
            svc.execute(AdvanceTransactionStep {
                transaction_id: tx.id,
                actor_id: buyer,
                step: transaction::Step::OfferAccepted,
                notes: None,
            })
            .await
            .unwrap_err()
            .as_ref(),
            advance_transaction_step::ExecutionError::StepOutOfOrder(_, _),
        ));
    }

    #[tokio::test]
    async fn unresolved_conditions_gate_the_workflow() {
        let svc = service();
        let listing = seed(&svc).await;
        let buyer = user::Id::new();

        let offer = svc
            .execute(submission(
                &listing,
                buyer,
                vec![term(condition::Kind::Inspection, 7)],
            ))
            .await
            .unwrap();
        let mut tx = svc
            .execute(AcceptOffer {
                offer_id: offer.id,
                actor_id: listing.seller_id,
            })
            .await
            .unwrap();

        for step in [
            transaction::Step::DepositPending,
            transaction::Step::ConditionsPending,
        ] {
            tx = svc
                .execute(AdvanceTransactionStep {
                    transaction_id: tx.id,
                    actor_id: buyer,
                    step,
                    notes: None,
                })
                .await
                .unwrap();
        }

        assert!(matches!(
            svc.execute(AdvanceTransactionStep {
                transaction_id: tx.id,
                actor_id: buyer,
                step: transaction::Step::ConditionsComplete,
                notes: None,
            })
            .await
            .unwrap_err()
            .as_ref(),
            advance_transaction_step::ExecutionError::ConditionsUnresolved(
                _,
            ),
        ));
    }

    #[tokio::test]
    async fn completion_stamps_the_sale_and_invoices_the_fee() {
        let svc = service();
        let listing = seed(&svc).await;
        let buyer = user::Id::new();

        let offer = svc
            .execute(submission(&listing, buyer, Vec::new()))
            .await
            .unwrap();
        let mut tx = svc
            .execute(AcceptOffer {
                offer_id: offer.id,
                actor_id: listing.seller_id,
            })
            .await
            .unwrap();

        let mut step = tx.current_step;
        while let Some(next) = step.next() {
            tx = svc
                .execute(AdvanceTransactionStep {
                    transaction_id: tx.id,
                    actor_id: buyer,
                    step: next,
                    notes: None,
                })
                .await
                .unwrap();
            step = next;
        }

        assert_eq!(tx.status, transaction::Status::Completed);
        assert_eq!(tx.current_step, transaction::Step::Completed);
        assert_eq!(
            tx.platform_fee.status,
            transaction::PaymentStatus::Invoiced,
        );
        assert!(tx.platform_fee.reference.is_some());
        // 2.5% of $470,000.
        assert_eq!(
            tx.platform_fee.amount,
            Money::cad(Decimal::new(11_750, 0)).to_cents(),
        );

        let listing = listing_by_id(&svc, listing.id).await;
        assert_eq!(listing.status, listing::Status::Sold);
        assert_eq!(listing.sale_price, Some(tx.purchase_price));
        assert!(listing.sold_at.is_some());

        // A completed purchase cannot be cancelled anymore.
        assert!(matches!(
            svc.execute(CancelTransaction {
                transaction_id: tx.id,
                actor_id: buyer,
                reason: "changed my mind".parse().unwrap(),
                deposit_disposition:
                    transaction::DepositDisposition::ReturnedToBuyer,
            })
            .await
            .unwrap_err()
            .as_ref(),
            cancel_transaction::ExecutionError::TransactionTerminal(_, _),
        ));
    }

    #[tokio::test]
    async fn cancelling_relists_and_is_idempotent() {
        let svc = service();
        let listing = seed(&svc).await;
        let buyer = user::Id::new();

        let offer = svc
            .execute(submission(&listing, buyer, Vec::new()))
            .await
            .unwrap();
        let tx = svc
            .execute(AcceptOffer {
                offer_id: offer.id,
                actor_id: listing.seller_id,
            })
            .await
            .unwrap();

        let cancel = CancelTransaction {
            transaction_id: tx.id,
            actor_id: buyer,
            reason: "financing fell through".parse().unwrap(),
            deposit_disposition:
                transaction::DepositDisposition::ReturnedToBuyer,
        };
        let cancelled = svc.execute(cancel.clone()).await.unwrap();
        assert_eq!(cancelled.status, transaction::Status::Cancelled);
        assert!(cancelled.cancellation.is_some());
        assert_eq!(
            listing_by_id(&svc, listing.id).await.status,
            listing::Status::Active,
        );

        // Retrying is a no-op.
        let again = svc.execute(cancel).await.unwrap();
        assert_eq!(again.status, transaction::Status::Cancelled);
    }

    #[tokio::test]
    async fn only_parties_touch_the_transaction() {
        let svc = service();
        let listing = seed(&svc).await;
        let buyer = user::Id::new();
        let stranger = user::Id::new();

        let offer = svc
            .execute(submission(&listing, buyer, Vec::new()))
            .await
            .unwrap();
        let tx = svc
            .execute(AcceptOffer {
                offer_id: offer.id,
                actor_id: listing.seller_id,
            })
            .await
            .unwrap();

        assert!(matches!(
            svc.execute(AdvanceTransactionStep {
                transaction_id: tx.id,
                actor_id: stranger,
                step: transaction::Step::DepositPending,
                notes: None,
            })
            .await
            .unwrap_err()
            .as_ref(),
            advance_transaction_step::ExecutionError::NotAuthorized(_),
        ));
        assert!(matches!(
            svc.execute(CancelTransaction {
                transaction_id: tx.id,
                actor_id: stranger,
                reason: "not mine to cancel".parse().unwrap(),
                deposit_disposition:
                    transaction::DepositDisposition::InDispute,
            })
            .await
            .unwrap_err()
            .as_ref(),
            cancel_transaction::ExecutionError::NotAuthorized(_),
        ));
    }
}
