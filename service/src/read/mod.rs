//! Read entities definitions.

pub mod offer;
pub mod transaction;

pub use self::offer::Open;
