//! Infrastructure layer.

pub mod database;
pub mod notifier;
pub mod payments;

pub use self::database::Database;
#[cfg(feature = "inmem")]
pub use self::database::{inmem, Inmem};
pub use self::{notifier::Notifier, payments::Payments};
