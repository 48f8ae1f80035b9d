//! Provincial tax and closing-cost definitions.

use common::Money;
use derive_more::{From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLInputObject};
use service::domain;

use crate::{define_error, Context};

/// Canadian province or territory.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
pub enum Province {
    /// Alberta.
    Ab,

    /// British Columbia.
    Bc,

    /// Manitoba.
    Mb,

    /// New Brunswick.
    Nb,

    /// Newfoundland and Labrador.
    Nl,

    /// Nova Scotia.
    Ns,

    /// Northwest Territories.
    Nt,

    /// Nunavut.
    Nu,

    /// Ontario.
    On,

    /// Prince Edward Island.
    Pe,

    /// Quebec.
    Qc,

    /// Saskatchewan.
    Sk,

    /// Yukon.
    Yt,
}

impl From<domain::jurisdiction::Province> for Province {
    fn from(province: domain::jurisdiction::Province) -> Self {
        use domain::jurisdiction::Province as P;
        match province {
            P::Ab => Self::Ab,
            P::Bc => Self::Bc,
            P::Mb => Self::Mb,
            P::Nb => Self::Nb,
            P::Nl => Self::Nl,
            P::Ns => Self::Ns,
            P::Nt => Self::Nt,
            P::Nu => Self::Nu,
            P::On => Self::On,
            P::Pe => Self::Pe,
            P::Qc => Self::Qc,
            P::Sk => Self::Sk,
            P::Yt => Self::Yt,
        }
    }
}

/// Situational toggles affecting a `TaxBreakdown`.
#[derive(Clone, Copy, Debug, GraphQLInputObject)]
pub struct TaxOptions {
    /// Whether the buyer qualifies as a first-time home buyer.
    pub first_time_buyer: Option<bool>,

    /// Whether the property is newly built.
    pub newly_built: Option<bool>,

    /// Whether the property lies within the City of Toronto.
    pub in_toronto: Option<bool>,
}

impl From<TaxOptions> for domain::jurisdiction::TaxOptions {
    fn from(opts: TaxOptions) -> Self {
        Self {
            first_time_buyer: opts.first_time_buyer.unwrap_or_default(),
            newly_built: opts.newly_built.unwrap_or_default(),
            in_toronto: opts.in_toronto.unwrap_or_default(),
        }
    }
}

/// Itemized land-transfer tax for a single purchase.
#[derive(Clone, Copy, Debug, From, Into)]
pub struct TaxBreakdown(domain::jurisdiction::TaxBreakdown);

/// Itemized land-transfer tax for a single purchase.
///
/// All amounts are CAD, rounded half-up to the cent.
#[graphql_object(context = Context)]
impl TaxBreakdown {
    /// Provincial land-transfer tax (or registration fee, where the
    /// province uses a fee model instead).
    #[must_use]
    pub fn provincial(&self) -> Money {
        self.0.provincial
    }

    /// Municipal land-transfer tax, where one applies.
    #[must_use]
    pub fn municipal(&self) -> Money {
        self.0.municipal
    }

    /// Rebates and exemptions subtracted from the gross tax.
    #[must_use]
    pub fn rebate(&self) -> Money {
        self.0.rebate
    }

    /// Net amount owed: provincial + municipal minus rebate, never negative.
    #[must_use]
    pub fn total(&self) -> Money {
        self.0.total
    }
}

/// Non-binding estimate of what closing a purchase will cost the buyer.
#[derive(Clone, Debug, From, Into)]
pub struct ClosingCostEstimate(domain::jurisdiction::ClosingCostEstimate);

/// Non-binding estimate of what closing a purchase will cost the buyer.
#[graphql_object(context = Context)]
impl ClosingCostEstimate {
    /// Land-transfer tax breakdown for the purchase.
    #[must_use]
    pub fn tax(&self) -> TaxBreakdown {
        self.0.tax.into()
    }

    /// Fixed advisory line items, identical across provinces.
    #[must_use]
    pub fn line_items(&self) -> Vec<LineItem> {
        self.0.line_items.iter().copied().map(Into::into).collect()
    }

    /// Net tax plus every line item.
    #[must_use]
    pub fn total(&self) -> Money {
        self.0.total
    }
}

/// Single advisory line of a `ClosingCostEstimate`.
#[derive(Clone, Copy, Debug, From, Into)]
pub struct LineItem(domain::jurisdiction::LineItem);

/// Single advisory line of a `ClosingCostEstimate`.
#[graphql_object(name = "ClosingCostLineItem", context = Context)]
impl LineItem {
    /// What the money is for.
    #[must_use]
    pub fn label(&self) -> &'static str {
        self.0.label
    }

    /// Estimated amount, CAD.
    #[must_use]
    pub fn amount(&self) -> Money {
        self.0.amount
    }
}

define_error! {
    enum ProvinceError {
        #[code = "UNKNOWN_JURISDICTION"]
        #[status = BAD_REQUEST]
        #[message = "Provided province code is not a known Canadian \
                     jurisdiction"]
        Unknown,
    }
}
