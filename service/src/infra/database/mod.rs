//! [`Database`]-related implementations.

#[cfg(feature = "inmem")]
pub mod inmem;

use derive_more::{Display, Error as StdError, From};

#[cfg(feature = "inmem")]
pub use self::inmem::Inmem;

/// Database operation.
pub use common::Handler as Database;

/// [`Database`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    #[cfg(feature = "inmem")]
    /// [`Inmem`] error.
    Inmem(inmem::Error),
}
