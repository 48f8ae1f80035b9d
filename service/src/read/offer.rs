//! [`Offer`] read model definition.

#[cfg(doc)]
use crate::domain::Offer;

/// Wrapper around [`Offer`] indicating that it [`is_open()`].
///
/// [`is_open()`]: Offer::is_open
#[derive(Clone, Debug)]
pub struct Open<T>(pub T);
