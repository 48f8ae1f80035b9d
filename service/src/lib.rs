//! Service contains the business logic of the application.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod infra;
pub mod query;
pub mod read;
pub mod task;

use common::{
    operations::{By, Start},
    Percent,
};
use derive_more::{Debug, Display, Error};
use tracing as log;

use crate::infra::{notifier, Notifier};
#[cfg(doc)]
use crate::infra::{Database, Payments};

pub use self::{command::Command, query::Query, task::Task};

/// [`Service`] configuration.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Commission rate the platform charges on completed sales.
    pub commission_rate: Percent,

    /// [`task::ClosingReminders`] configuration.
    pub closing_reminders: task::closing_reminders::Config,
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db, Nf, Pm> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,

    /// [`Notifier`] of this [`Service`].
    notifier: Nf,

    /// [`Payments`] collaborator of this [`Service`].
    payments: Pm,
}

impl<Db, Nf, Pm> Service<Db, Nf, Pm> {
    /// Creates a new [`Service`] with the provided parameters.
    pub fn new(
        config: Config,
        database: Db,
        notifier: Nf,
        payments: Pm,
    ) -> (Self, task::Background)
    where
        Self: Task<
                Start<
                    By<
                        task::ClosingReminders<Self>,
                        task::closing_reminders::Config,
                    >,
                >,
                Ok = (),
                Err: std::error::Error,
            > + Clone
            + 'static,
    {
        let this = Service {
            config,
            database,
            notifier,
            payments,
        };

        let mut bg = task::Background::default();
        let svc = this.clone();
        bg.spawn(async move {
            svc.execute(Start(By::new(svc.config().closing_reminders)))
                .await
        });

        (this, bg)
    }

    /// Returns [`Config`] of this [`Service`].
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }

    /// Returns [`Notifier`] of this [`Service`].
    #[must_use]
    pub fn notifier(&self) -> &Nf {
        &self.notifier
    }

    /// Returns [`Payments`] collaborator of this [`Service`].
    #[must_use]
    pub fn payments(&self) -> &Pm {
        &self.payments
    }

    /// Dispatches the provided [`notifier::Event`].
    ///
    /// Dispatch failures are logged and swallowed: no command outcome ever
    /// depends on a notification going out.
    pub(crate) async fn notify(&self, event: notifier::Event)
    where
        Nf: Notifier<notifier::Notify, Ok = (), Err: std::fmt::Display>,
    {
        if let Err(e) = self.notifier.execute(notifier::Notify(event)).await
        {
            log::warn!("failed to dispatch notification: {e}");
        }
    }
}

/// Shortcut for the error of starting a [`Task`].
type TaskStartError<Svc, T, Args> = <Svc as Task<Start<By<T, Args>>>>::Err;

/// Error of starting a [`Service`].
#[derive(Debug, Display, Error)]
pub enum StartupError<Svc>
where
    Svc: Task<
        Start<
            By<
                task::ClosingReminders<Svc>,
                task::closing_reminders::Config,
            >,
        >,
    >,
{
    /// [`task::ClosingReminders`] failed to start.
    ClosingRemindersTask(
        TaskStartError<
            Svc,
            task::ClosingReminders<Svc>,
            task::closing_reminders::Config,
        >,
    ),
}
