//! GraphQL API definitions.

pub mod condition;
pub mod jurisdiction;
pub mod listing;
mod mutation;
pub mod offer;
pub mod property;
mod query;
pub mod scalar;
pub mod transaction;
pub mod user;

use crate::define_error;

pub use self::{
    condition::Condition, listing::Listing, mutation::Mutation, offer::Offer,
    query::Query, transaction::Transaction,
};

/// GraphQL schema.
pub type Schema = juniper::RootNode<
    'static,
    Query,
    Mutation,
    juniper::EmptySubscription<crate::Context>,
>;

define_error! {
    enum PartyError {
        #[code = "NOT_AUTHORIZED"]
        #[status = FORBIDDEN]
        #[message = "Acting `User` is not entitled to perform this action"]
        NotAuthorized,
    }
}
