//! [`ClosingReminders`] [`Task`].

use std::{convert::Infallible, error::Error, time};

use common::operations::{By, Perform, Select, Start};
use tokio::time::interval;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{condition, transaction, Transaction},
    infra::{database, notifier, Database, Notifier},
    read,
    Service,
};
#[cfg(doc)]
use crate::domain::Condition;

use super::Task;

/// Configuration for [`ClosingReminders`] [`Task`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Interval between reminder sweeps.
    pub interval: time::Duration,

    /// How far ahead a closing date or [`Condition`] deadline must be to
    /// trigger a reminder.
    pub window: time::Duration,
}

/// [`Task`] reminding both parties about approaching closing dates and
/// [`Condition`] deadlines.
#[derive(Clone, Copy, Debug)]
pub struct ClosingReminders<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// [`Service`] instance.
    service: S,
}

impl<Db, Nf, Pm> Task<Start<By<ClosingReminders<Self>, Config>>>
    for Service<Db, Nf, Pm>
where
    ClosingReminders<Service<Db, Nf, Pm>>:
        Task<Perform<()>, Ok = (), Err: Error> + 'static,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<ClosingReminders<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let config = by.into_inner();
        let task = ClosingReminders {
            config,
            service: self.clone(),
        };

        let mut interval = interval(task.config.interval);
        loop {
            let _ = interval.tick().await;
            _ = task.execute(Perform(())).await.map_err(|e| {
                log::error!("`task::ClosingReminders` failed: {e}");
            });
        }
    }
}

impl<Db, Nf, Pm> Task<Perform<()>> for ClosingReminders<Service<Db, Nf, Pm>>
where
    Db: Database<
            Select<By<Vec<Transaction>, read::transaction::ClosingWithin>>,
            Ok = Vec<Transaction>,
            Err = Traced<database::Error>,
        > + Database<
            Select<
                By<
                    Vec<Transaction>,
                    read::transaction::ConditionDeadlineWithin,
                >,
            >,
            Ok = Vec<Transaction>,
            Err = Traced<database::Error>,
        >,
    Nf: Notifier<notifier::Notify, Ok = (), Err: std::fmt::Display>,
{
    type Ok = ();
    type Err = ExecutionError;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        let closing_bound =
            transaction::ClosingDateTime::now() + self.config.window;
        let closing = self
            .service
            .database()
            .execute(Select(By::new(read::transaction::ClosingWithin(
                closing_bound,
            ))))
            .await
            .map_err(tracerr::map_from_and_wrap!())?;
        for t in closing {
            for user_id in [t.buyer_id, t.seller_id] {
                self.service
                    .notify(notifier::Event::ClosingReminder {
                        transaction_id: t.id,
                        user_id,
                        closing_at: t.closing_at,
                    })
                    .await;
            }
        }

        let deadline_bound =
            condition::DeadlineDateTime::now() + self.config.window;
        let conditional = self
            .service
            .database()
            .execute(Select(By::new(
                read::transaction::ConditionDeadlineWithin(deadline_bound),
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!())?;
        for t in conditional {
            for c in
                t.conditions.iter().filter(|c| {
                    !c.is_resolved() && c.deadline <= deadline_bound
                })
            {
                for user_id in [t.buyer_id, t.seller_id] {
                    self.service
                        .notify(notifier::Event::ConditionReminder {
                            condition_id: c.id,
                            transaction_id: t.id,
                            user_id,
                            deadline: c.deadline,
                        })
                        .await;
                }
            }
        }

        Ok(())
    }
}

/// Error of [`ClosingReminders`] execution.
pub type ExecutionError = Traced<database::Error>;
