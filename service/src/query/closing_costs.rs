//! [`Query`] collection over the jurisdiction rules table.
//!
//! These are pure calculations: no storage is touched, so they cannot
//! fail.

use std::convert::Infallible;

use common::Money;

use crate::{
    domain::jurisdiction::{
        self, ClosingCostEstimate, Province, TaxBreakdown, TaxOptions,
    },
    Service,
};

use super::Query;

/// Queries the land-transfer [`TaxBreakdown`] of a prospective purchase.
#[derive(Clone, Copy, Debug)]
pub struct LandTransferTax {
    /// [`Province`] the purchase happens in.
    pub province: Province,

    /// Purchase price.
    pub price: Money,

    /// Situational [`TaxOptions`].
    pub options: TaxOptions,
}

impl<Db, Nf, Pm> Query<LandTransferTax> for Service<Db, Nf, Pm> {
    type Ok = TaxBreakdown;
    type Err = Infallible;

    async fn execute(
        &self,
        q: LandTransferTax,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(jurisdiction::land_transfer_tax(
            q.province, q.price, &q.options,
        ))
    }
}

/// Queries the full [`ClosingCostEstimate`] of a prospective purchase.
#[derive(Clone, Copy, Debug)]
pub struct EstimateClosingCosts {
    /// [`Province`] the purchase happens in.
    pub province: Province,

    /// Purchase price.
    pub price: Money,

    /// Situational [`TaxOptions`].
    pub options: TaxOptions,
}

impl<Db, Nf, Pm> Query<EstimateClosingCosts> for Service<Db, Nf, Pm> {
    type Ok = ClosingCostEstimate;
    type Err = Infallible;

    async fn execute(
        &self,
        q: EstimateClosingCosts,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(jurisdiction::estimate_closing_costs(
            q.province, q.price, &q.options,
        ))
    }
}
