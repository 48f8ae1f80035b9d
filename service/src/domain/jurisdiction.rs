//! Provincial tax and closing-cost rules.
//!
//! Everything here is pure: a rules table keyed by [`Province`], with no
//! clock, storage or collaborator access.

use common::{define_kind, Money};
use rust_decimal::Decimal;

define_kind! {
    #[doc = "Canadian province or territory, parsed from its two-letter \
             code."]
    enum Province {
        #[doc = "Alberta."]
        Ab = 1,

        #[doc = "British Columbia."]
        Bc = 2,

        #[doc = "Manitoba."]
        Mb = 3,

        #[doc = "New Brunswick."]
        Nb = 4,

        #[doc = "Newfoundland and Labrador."]
        Nl = 5,

        #[doc = "Nova Scotia."]
        Ns = 6,

        #[doc = "Northwest Territories."]
        Nt = 7,

        #[doc = "Nunavut."]
        Nu = 8,

        #[doc = "Ontario."]
        On = 9,

        #[doc = "Prince Edward Island."]
        Pe = 10,

        #[doc = "Quebec."]
        Qc = 11,

        #[doc = "Saskatchewan."]
        Sk = 12,

        #[doc = "Yukon."]
        Yt = 13,
    }
}

/// Situational toggles affecting a [`TaxBreakdown`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TaxOptions {
    /// Whether the buyer qualifies as a first-time home buyer.
    pub first_time_buyer: bool,

    /// Whether the property is newly built.
    pub newly_built: bool,

    /// Whether the property lies within the City of Toronto, which levies
    /// its own municipal land-transfer tax on top of Ontario's.
    pub in_toronto: bool,
}

/// Itemized land-transfer tax for a single purchase.
///
/// All amounts are CAD, rounded half-up to the cent.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TaxBreakdown {
    /// Provincial land-transfer tax (or registration fee, where the
    /// province uses a fee model instead).
    pub provincial: Money,

    /// Municipal land-transfer tax, where one applies.
    pub municipal: Money,

    /// Rebates and exemptions subtracted from the gross tax.
    pub rebate: Money,

    /// Net amount owed: provincial + municipal − rebate, never negative.
    pub total: Money,
}

impl TaxBreakdown {
    /// All-zero [`TaxBreakdown`], returned for non-positive prices.
    #[must_use]
    pub fn zero() -> Self {
        Self {
            provincial: Money::cad(Decimal::ZERO),
            municipal: Money::cad(Decimal::ZERO),
            rebate: Money::cad(Decimal::ZERO),
            total: Money::cad(Decimal::ZERO),
        }
    }
}

/// Non-binding estimate of what closing a purchase will cost the buyer.
#[derive(Clone, Debug)]
pub struct ClosingCostEstimate {
    /// Land-transfer [`TaxBreakdown`] for the purchase.
    pub tax: TaxBreakdown,

    /// Fixed advisory [`LineItem`]s, identical across provinces.
    pub line_items: Vec<LineItem>,

    /// Net tax plus every [`LineItem`].
    pub total: Money,
}

/// Single advisory line of a [`ClosingCostEstimate`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LineItem {
    /// What the money is for.
    pub label: &'static str,

    /// Estimated amount, CAD.
    pub amount: Money,
}

/// Calculates the land-transfer tax owed on purchasing a property in the
/// given [`Province`] at the given `price`.
///
/// Non-positive prices yield [`TaxBreakdown::zero()`] rather than an
/// error. For any fixed [`TaxOptions`] the result is monotonically
/// non-decreasing in `price`.
#[must_use]
pub fn land_transfer_tax(
    province: Province,
    price: Money,
    opts: &TaxOptions,
) -> TaxBreakdown {
    let price = price.amount;
    if price <= Decimal::ZERO {
        return TaxBreakdown::zero();
    }

    let (provincial, municipal, rebate) = match province {
        Province::On => {
            let provincial = marginal(price, &ontario_brackets());
            let municipal = if opts.in_toronto {
                // Toronto's municipal schedule mirrors Ontario's.
                marginal(price, &ontario_brackets())
            } else {
                Decimal::ZERO
            };
            let rebate = if opts.first_time_buyer {
                let mut r = provincial.min(Decimal::new(4_000, 0));
                if opts.in_toronto {
                    r += municipal.min(Decimal::new(4_475, 0));
                }
                r
            } else {
                Decimal::ZERO
            };
            (provincial, municipal, rebate)
        }
        Province::Bc => {
            let provincial = marginal(
                price,
                &[
                    (Decimal::ZERO, rate_bp(100)),
                    (Decimal::new(200_000, 0), rate_bp(200)),
                    (Decimal::new(2_000_000, 0), rate_bp(300)),
                    (Decimal::new(3_000_000, 0), rate_bp(500)),
                ],
            );
            // First-time-buyer and newly-built exemptions phase out
            // linearly past their thresholds and do not stack.
            let ftb = if opts.first_time_buyer {
                phased_exemption(
                    provincial,
                    price,
                    Decimal::new(500_000, 0),
                    Decimal::new(525_000, 0),
                )
            } else {
                Decimal::ZERO
            };
            let newly_built = if opts.newly_built {
                phased_exemption(
                    provincial,
                    price,
                    Decimal::new(750_000, 0),
                    Decimal::new(800_000, 0),
                )
            } else {
                Decimal::ZERO
            };
            (provincial, Decimal::ZERO, ftb.max(newly_built))
        }
        Province::Mb => (
            marginal(
                price,
                &[
                    (Decimal::ZERO, Decimal::ZERO),
                    (Decimal::new(30_000, 0), rate_bp(50)),
                    (Decimal::new(90_000, 0), rate_bp(100)),
                    (Decimal::new(150_000, 0), rate_bp(150)),
                    (Decimal::new(200_000, 0), rate_bp(200)),
                ],
            ),
            Decimal::ZERO,
            Decimal::ZERO,
        ),
        Province::Qc => (
            // Duties on transfers of immovables ("welcome tax").
            marginal(
                price,
                &[
                    (Decimal::ZERO, rate_bp(50)),
                    (Decimal::new(51_700, 0), rate_bp(100)),
                    (Decimal::new(258_600, 0), rate_bp(150)),
                ],
            ),
            Decimal::ZERO,
            Decimal::ZERO,
        ),
        Province::Nb => (price * rate_bp(100), Decimal::ZERO, Decimal::ZERO),
        Province::Ns => {
            // Levied by municipalities; modeled at the common 1.5% rate.
            (Decimal::ZERO, price * rate_bp(150), Decimal::ZERO)
        }
        Province::Pe => {
            let provincial = price * rate_bp(100);
            let rebate = if opts.first_time_buyer {
                provincial
            } else {
                Decimal::ZERO
            };
            (provincial, Decimal::ZERO, rebate)
        }
        Province::Nl => (price * rate_bp(40), Decimal::ZERO, Decimal::ZERO),
        Province::Sk => (price * rate_bp(30), Decimal::ZERO, Decimal::ZERO),
        Province::Ab => {
            // Flat registration fee: $50 plus $5 per $5,000 of value.
            let per_value = (price / Decimal::new(5_000, 0)).ceil()
                * Decimal::new(5, 0);
            (
                Decimal::new(50, 0) + per_value,
                Decimal::ZERO,
                Decimal::ZERO,
            )
        }
        Province::Yt | Province::Nt | Province::Nu => {
            // Flat registration fee; no value-based transfer tax.
            (Decimal::new(100, 0), Decimal::ZERO, Decimal::ZERO)
        }
    };

    let provincial = Money::cad(provincial).to_cents();
    let municipal = Money::cad(municipal).to_cents();
    let rebate = Money::cad(rebate).to_cents();
    let total = (provincial.amount + municipal.amount - rebate.amount)
        .max(Decimal::ZERO);
    TaxBreakdown {
        provincial,
        municipal,
        rebate,
        total: Money::cad(total).to_cents(),
    }
}

/// Estimates the full closing costs of purchasing a property in the given
/// [`Province`] at the given `price`.
#[must_use]
pub fn estimate_closing_costs(
    province: Province,
    price: Money,
    opts: &TaxOptions,
) -> ClosingCostEstimate {
    let tax = land_transfer_tax(province, price, opts);
    let line_items = vec![
        LineItem {
            label: "Legal fees",
            amount: Money::cad(Decimal::new(1_800, 0)),
        },
        LineItem {
            label: "Title insurance",
            amount: Money::cad(Decimal::new(450, 0)),
        },
        LineItem {
            label: "Home inspection",
            amount: Money::cad(Decimal::new(550, 0)),
        },
        LineItem {
            label: "Appraisal",
            amount: Money::cad(Decimal::new(400, 0)),
        },
        LineItem {
            label: "Moving",
            amount: Money::cad(Decimal::new(1_200, 0)),
        },
    ];
    let total = tax.total.amount
        + line_items
            .iter()
            .map(|i| i.amount.amount)
            .sum::<Decimal>();
    ClosingCostEstimate {
        tax,
        line_items,
        total: Money::cad(total).to_cents(),
    }
}

/// Ontario's marginal land-transfer tax schedule, shared with Toronto's
/// mirroring municipal one.
fn ontario_brackets() -> [(Decimal, Decimal); 5] {
    [
        (Decimal::ZERO, rate_bp(50)),
        (Decimal::new(55_000, 0), rate_bp(100)),
        (Decimal::new(250_000, 0), rate_bp(150)),
        (Decimal::new(400_000, 0), rate_bp(200)),
        (Decimal::new(2_000_000, 0), rate_bp(250)),
    ]
}

/// Applies a progressive marginal schedule to the given `price`.
///
/// Each entry is a bracket lower bound paired with the rate applied to the
/// portion of the price above it (up to the next bound).
fn marginal(price: Decimal, brackets: &[(Decimal, Decimal)]) -> Decimal {
    let mut tax = Decimal::ZERO;
    for (i, &(lower, rate)) in brackets.iter().enumerate() {
        if price <= lower {
            break;
        }
        let upper = brackets
            .get(i + 1)
            .map_or(price, |&(next, _)| price.min(next));
        tax += (upper - lower) * rate;
    }
    tax
}

/// Full exemption up to `full_to`, linearly phasing out to zero at
/// `none_from`.
fn phased_exemption(
    tax: Decimal,
    price: Decimal,
    full_to: Decimal,
    none_from: Decimal,
) -> Decimal {
    if price <= full_to {
        tax
    } else if price >= none_from {
        Decimal::ZERO
    } else {
        tax * (none_from - price) / (none_from - full_to)
    }
}

/// Rate expressed in basis points (1 bp = 0.01%).
fn rate_bp(bp: i64) -> Decimal {
    Decimal::new(bp, 4)
}

#[cfg(test)]
mod spec {
    use common::Money;
    use rust_decimal::Decimal;

    use super::{
        land_transfer_tax, Province, TaxBreakdown, TaxOptions,
    };

    fn cad(amount: i64) -> Money {
        Money::cad(Decimal::new(amount, 0))
    }

    #[test]
    fn ontario_500k_owes_6475() {
        let tax = land_transfer_tax(
            Province::On,
            cad(500_000),
            &TaxOptions::default(),
        );
        assert_eq!(tax.provincial, Money::cad(Decimal::new(6_475_00, 2)));
        assert_eq!(tax.municipal.amount, Decimal::ZERO);
        assert_eq!(tax.rebate.amount, Decimal::ZERO);
        assert_eq!(tax.total, tax.provincial);
    }

    #[test]
    fn toronto_doubles_ontario_and_rebates_both() {
        let opts = TaxOptions {
            in_toronto: true,
            ..TaxOptions::default()
        };
        let tax = land_transfer_tax(Province::On, cad(500_000), &opts);
        assert_eq!(tax.municipal, tax.provincial);

        let ftb = land_transfer_tax(
            Province::On,
            cad(500_000),
            &TaxOptions {
                first_time_buyer: true,
                ..opts
            },
        );
        // $4,000 provincial cap + $4,475 municipal cap.
        assert_eq!(ftb.rebate, Money::cad(Decimal::new(8_475, 0)));
    }

    #[test]
    fn bc_first_time_buyer_exemption_phases_out() {
        let ftb = TaxOptions {
            first_time_buyer: true,
            ..TaxOptions::default()
        };

        let full = land_transfer_tax(Province::Bc, cad(500_000), &ftb);
        assert_eq!(full.rebate, full.provincial);
        assert_eq!(full.total.amount, Decimal::ZERO);

        let half = land_transfer_tax(Province::Bc, cad(512_500), &ftb);
        assert!(half.rebate.amount > Decimal::ZERO);
        assert!(half.rebate < half.provincial);

        let none = land_transfer_tax(Province::Bc, cad(525_000), &ftb);
        assert_eq!(none.rebate.amount, Decimal::ZERO);
    }

    #[test]
    fn non_positive_price_yields_zero() {
        for price in [0, -100_000] {
            assert_eq!(
                land_transfer_tax(
                    Province::On,
                    cad(price),
                    &TaxOptions::default(),
                ),
                TaxBreakdown::zero(),
            );
        }
    }

    #[test]
    fn tax_never_decreases_with_price() {
        for province in [
            Province::On,
            Province::Bc,
            Province::Mb,
            Province::Qc,
            Province::Ab,
        ] {
            let mut prev = Decimal::MIN;
            for price in (0..=2_500_000).step_by(100_000) {
                let tax = land_transfer_tax(
                    province,
                    cad(price),
                    &TaxOptions::default(),
                );
                assert!(tax.total.amount >= prev, "{province} at {price}");
                prev = tax.total.amount;
            }
        }
    }

    #[test]
    fn provinces_parse_from_two_letter_codes() {
        assert_eq!("ON".parse::<Province>().unwrap(), Province::On);
        assert_eq!("BC".parse::<Province>().unwrap(), Province::Bc);
        assert_eq!("NU".parse::<Province>().unwrap(), Province::Nu);
        assert!("ZZ".parse::<Province>().is_err());
        assert!("Ontario".parse::<Province>().is_err());
    }
}
