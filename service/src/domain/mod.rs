//! Domain definitions.

pub mod condition;
pub mod jurisdiction;
pub mod listing;
pub mod offer;
pub mod property;
pub mod transaction;
pub mod user;

pub use self::{
    condition::Condition, jurisdiction::Province, listing::Listing,
    offer::Offer, property::Property, transaction::Transaction, user::User,
};
