//! In-memory [`Database`] implementation.

use std::{collections::HashMap, sync::Arc};

use common::operations::{
    By, Commit, Insert, Lock, Select, Transact, Update,
};
use derive_more::{Display, Error as StdError};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracerr::Traced;

use crate::{
    domain::{
        listing, offer, property, transaction, Listing, Offer, Property,
        Transaction,
    },
    infra::{database, Database},
    read,
};

/// In-memory [`Database`] client.
///
/// Transactions take an exclusive store-wide lock, so at most one is ever
/// in flight. Keep non-transactional operations out of any code path
/// holding a [`Tx`], or they will wait on it forever.
#[derive(Clone, Debug, Default)]
pub struct Inmem(Arc<Mutex<Store>>);

impl Inmem {
    /// Creates a new empty [`Inmem`] client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the provided function over the current [`Store`].
    async fn read<R>(&self, f: impl FnOnce(&Store) -> R) -> R {
        f(&*self.0.lock().await)
    }

    /// Runs the provided function over the current [`Store`], mutably.
    async fn write<R>(&self, f: impl FnOnce(&mut Store) -> R) -> R {
        f(&mut *self.0.lock().await)
    }
}

/// Entity tables of an [`Inmem`] client.
#[derive(Clone, Debug, Default)]
struct Store {
    /// [`Property`] entities, keyed by ID.
    properties: HashMap<property::Id, Property>,

    /// [`Listing`] entities, keyed by ID.
    listings: HashMap<listing::Id, Listing>,

    /// [`Offer`] entities, keyed by ID.
    offers: HashMap<offer::Id, Offer>,

    /// [`Transaction`] entities, keyed by ID.
    transactions: HashMap<transaction::Id, Transaction>,
}

/// Exclusive [`Inmem`] transaction handle.
///
/// Mutations apply to a shadow copy of the [`Store`] and become visible
/// atomically on [`Commit`]. Dropping the handle without committing
/// discards them.
#[derive(Debug)]
pub struct Tx(Mutex<TxState>);

/// State of a [`Tx`].
#[derive(Debug)]
struct TxState {
    /// Exclusive guard over the live [`Store`].
    guard: OwnedMutexGuard<Store>,

    /// Working copy the transaction mutates.
    shadow: Store,
}

impl Tx {
    /// Runs the provided function over the shadow [`Store`].
    async fn read<R>(&self, f: impl FnOnce(&Store) -> R) -> R {
        f(&self.0.lock().await.shadow)
    }

    /// Runs the provided function over the shadow [`Store`], mutably.
    async fn write<R>(&self, f: impl FnOnce(&mut Store) -> R) -> R {
        f(&mut self.0.lock().await.shadow)
    }
}

impl Database<Transact> for Inmem {
    type Ok = Tx;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        let guard = Arc::clone(&self.0).lock_owned().await;
        let shadow = guard.clone();
        Ok(Tx(Mutex::new(TxState { guard, shadow })))
    }
}

impl Database<Commit> for Tx {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        let mut state = self.0.lock().await;
        let committed = state.shadow.clone();
        *state.guard = committed;
        Ok(())
    }
}

// The store-wide transaction lock already serializes everything, so
// entity-level locks have nothing left to take.
impl Database<Lock<By<Listing, listing::Id>>> for Tx {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Listing, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Database<Lock<By<Transaction, transaction::Id>>> for Tx {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Transaction, transaction::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

/// Implements the [`Store`]-backed operations for the provided client.
macro_rules! impl_store_ops {
    ($ty:ty) => {
        impl Database<Select<By<Option<Property>, property::Id>>> for $ty {
            type Ok = Option<Property>;
            type Err = Traced<database::Error>;

            async fn execute(
                &self,
                Select(by): Select<By<Option<Property>, property::Id>>,
            ) -> Result<Self::Ok, Self::Err> {
                let id = by.into_inner();
                Ok(self.read(|s| s.properties.get(&id).cloned()).await)
            }
        }

        impl Database<Select<By<Option<Listing>, listing::Id>>> for $ty {
            type Ok = Option<Listing>;
            type Err = Traced<database::Error>;

            async fn execute(
                &self,
                Select(by): Select<By<Option<Listing>, listing::Id>>,
            ) -> Result<Self::Ok, Self::Err> {
                let id = by.into_inner();
                Ok(self.read(|s| s.listings.get(&id).cloned()).await)
            }
        }

        impl Database<Select<By<Option<Offer>, offer::Id>>> for $ty {
            type Ok = Option<Offer>;
            type Err = Traced<database::Error>;

            async fn execute(
                &self,
                Select(by): Select<By<Option<Offer>, offer::Id>>,
            ) -> Result<Self::Ok, Self::Err> {
                let id = by.into_inner();
                Ok(self.read(|s| s.offers.get(&id).cloned()).await)
            }
        }

        impl Database<Select<By<Option<Transaction>, transaction::Id>>>
            for $ty
        {
            type Ok = Option<Transaction>;
            type Err = Traced<database::Error>;

            async fn execute(
                &self,
                Select(by): Select<
                    By<Option<Transaction>, transaction::Id>,
                >,
            ) -> Result<Self::Ok, Self::Err> {
                let id = by.into_inner();
                Ok(self.read(|s| s.transactions.get(&id).cloned()).await)
            }
        }

        impl Database<Select<By<Option<Transaction>, offer::Id>>> for $ty {
            type Ok = Option<Transaction>;
            type Err = Traced<database::Error>;

            async fn execute(
                &self,
                Select(by): Select<By<Option<Transaction>, offer::Id>>,
            ) -> Result<Self::Ok, Self::Err> {
                let id = by.into_inner();
                Ok(self
                    .read(|s| {
                        s.transactions
                            .values()
                            .find(|t| t.offer_id == id)
                            .cloned()
                    })
                    .await)
            }
        }

        impl
            Database<
                Select<By<Vec<read::offer::Open<Offer>>, listing::Id>>,
            > for $ty
        {
            type Ok = Vec<read::offer::Open<Offer>>;
            type Err = Traced<database::Error>;

            async fn execute(
                &self,
                Select(by): Select<
                    By<Vec<read::offer::Open<Offer>>, listing::Id>,
                >,
            ) -> Result<Self::Ok, Self::Err> {
                let id = by.into_inner();
                Ok(self
                    .read(|s| {
                        let mut offers: Vec<_> = s
                            .offers
                            .values()
                            .filter(|o| o.listing_id == id && o.is_open())
                            .cloned()
                            .collect();
                        offers.sort_by_key(|o| o.created_at);
                        offers.into_iter().map(read::offer::Open).collect()
                    })
                    .await)
            }
        }

        impl
            Database<
                Select<
                    By<Vec<Transaction>, read::transaction::ClosingWithin>,
                >,
            > for $ty
        {
            type Ok = Vec<Transaction>;
            type Err = Traced<database::Error>;

            async fn execute(
                &self,
                Select(by): Select<
                    By<Vec<Transaction>, read::transaction::ClosingWithin>,
                >,
            ) -> Result<Self::Ok, Self::Err> {
                let read::transaction::ClosingWithin(bound) =
                    by.into_inner();
                Ok(self
                    .read(|s| {
                        s.transactions
                            .values()
                            .filter(|t| {
                                !t.is_terminal() && t.closing_at <= bound
                            })
                            .cloned()
                            .collect()
                    })
                    .await)
            }
        }

        impl
            Database<
                Select<
                    By<
                        Vec<Transaction>,
                        read::transaction::ConditionDeadlineWithin,
                    >,
                >,
            > for $ty
        {
            type Ok = Vec<Transaction>;
            type Err = Traced<database::Error>;

            async fn execute(
                &self,
                Select(by): Select<
                    By<
                        Vec<Transaction>,
                        read::transaction::ConditionDeadlineWithin,
                    >,
                >,
            ) -> Result<Self::Ok, Self::Err> {
                let read::transaction::ConditionDeadlineWithin(bound) =
                    by.into_inner();
                Ok(self
                    .read(|s| {
                        s.transactions
                            .values()
                            .filter(|t| {
                                !t.is_terminal()
                                    && t.conditions.iter().any(|c| {
                                        !c.is_resolved()
                                            && c.deadline <= bound
                                    })
                            })
                            .cloned()
                            .collect()
                    })
                    .await)
            }
        }

        impl_store_ops!(@write $ty, Property, properties);
        impl_store_ops!(@write $ty, Listing, listings);
        impl_store_ops!(@write $ty, Offer, offers);
        impl_store_ops!(@write $ty, Transaction, transactions);
    };
    (@write $ty:ty, $entity:ident, $table:ident) => {
        impl Database<Insert<$entity>> for $ty {
            type Ok = ();
            type Err = Traced<database::Error>;

            async fn execute(
                &self,
                Insert(entity): Insert<$entity>,
            ) -> Result<Self::Ok, Self::Err> {
                self.write(|s| {
                    drop(s.$table.insert(entity.id, entity));
                })
                .await;
                Ok(())
            }
        }

        impl Database<Update<$entity>> for $ty {
            type Ok = ();
            type Err = Traced<database::Error>;

            async fn execute(
                &self,
                Update(entity): Update<$entity>,
            ) -> Result<Self::Ok, Self::Err> {
                self.write(|s| {
                    if s.$table.contains_key(&entity.id) {
                        drop(s.$table.insert(entity.id, entity));
                        Ok(())
                    } else {
                        Err(tracerr::new!(database::Error::from(
                            Error::UpdateMissing,
                        )))
                    }
                })
                .await
            }
        }
    };
}

impl_store_ops!(Inmem);
impl_store_ops!(Tx);

/// [`Inmem`] database [`Error`].
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// Updated entity is not present in the store.
    #[display("entity to update does not exist")]
    UpdateMissing,
}
