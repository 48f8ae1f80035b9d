//! [`Transaction`]-related read definitions.

use crate::domain::{condition, transaction};
#[cfg(doc)]
use crate::domain::Transaction;

/// Selector of non-terminal [`Transaction`]s closing at or before the
/// wrapped moment.
#[derive(Clone, Copy, Debug)]
pub struct ClosingWithin(pub transaction::ClosingDateTime);

/// Selector of conditional [`Transaction`]s having an unresolved condition
/// whose deadline falls at or before the wrapped moment.
#[derive(Clone, Copy, Debug)]
pub struct ConditionDeadlineWithin(pub condition::DeadlineDateTime);
