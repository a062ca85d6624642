//! Sale-price resolver
//!
//! Finds the price at which the seller keeps the desired margin after every
//! marketplace fee. The fixed fee and the shipping subsidy both depend on the
//! price being solved for, so the price is refined by a short fixed-point
//! iteration: price -> fees -> price, until two passes agree within
//! [`CONVERGENCE_TOLERANCE`] or [`MAX_ITERATIONS`] passes have run.
//!
//! This is an approximation, not an exact root-finder. A price sitting on a
//! band edge can flip between bands and exhaust the pass cap; the last price
//! is returned with `converged = false`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, warn};

use crate::error::PricingError;
use crate::fees::{fixed_fee, shipping_subsidy};
use crate::types::{CalculatorInputs, MarketplaceFeeProfile, MarketplaceResult};

/// Hard cap on fixed-point passes
pub const MAX_ITERATIONS: u32 = 5;

/// Two successive prices closer than this count as converged
pub const CONVERGENCE_TOLERANCE: Decimal = dec!(0.01);

/// Share of the sale price taken by commission, tax, ads and margin (0.42 = 42%).
pub fn aggregate_rate(commission_rate: Decimal, inputs: &CalculatorInputs) -> Decimal {
    (commission_rate + inputs.tax_percent + inputs.ads_percent + inputs.desired_profit_percent)
        / Decimal::ONE_HUNDRED
}

fn overflow(label: &str) -> PricingError {
    warn!(marketplace = %label, "Sale price out of range");
    PricingError::Overflow
}

/// Stateless price solver
pub struct PriceResolver;

impl PriceResolver {
    /// Price one commission tier of one marketplace.
    ///
    /// Inputs must already be validated. Returns [`PricingError::Infeasible`]
    /// when the percentage fees plus margin reach 100% of the price, since no
    /// finite positive price can satisfy them, and [`PricingError::Overflow`]
    /// when the price or a fee falls outside the `Decimal` range.
    pub fn resolve(
        profile: &MarketplaceFeeProfile,
        commission_rate: Decimal,
        inputs: &CalculatorInputs,
    ) -> Result<MarketplaceResult, PricingError> {
        let hundred = Decimal::ONE_HUNDRED;
        let label = profile.label_for(commission_rate);

        let aggregate_rate = aggregate_rate(commission_rate, inputs);
        if aggregate_rate >= Decimal::ONE {
            warn!(
                marketplace = %label,
                aggregate_rate = %aggregate_rate,
                "Infeasible fee combination"
            );
            return Err(PricingError::Infeasible { aggregate_rate });
        }
        let divisor = Decimal::ONE - aggregate_rate;

        let mut sale_price = inputs
            .product_value
            .checked_div(divisor)
            .ok_or_else(|| overflow(&label))?;
        let mut fixed = Decimal::ZERO;
        let mut subsidy = Decimal::ZERO;
        let mut iterations = 0;
        let mut converged = false;

        while iterations < MAX_ITERATIONS {
            iterations += 1;

            fixed = fixed_fee(profile, sale_price);
            subsidy = shipping_subsidy(profile, sale_price, inputs.shipping);

            let candidate = inputs
                .product_value
                .checked_add(fixed)
                .and_then(|v| v.checked_add(subsidy))
                .and_then(|v| v.checked_div(divisor))
                .ok_or_else(|| overflow(&label))?;
            let delta = (candidate - sale_price).abs();
            sale_price = candidate;

            if delta < CONVERGENCE_TOLERANCE {
                converged = true;
                break;
            }
        }

        if !converged {
            debug!(
                marketplace = %label,
                price = %sale_price,
                iterations,
                "Price did not settle within pass cap"
            );
        }

        let share = |percent: Decimal| {
            sale_price
                .checked_mul(percent)
                .and_then(|v| v.checked_div(hundred))
                .ok_or_else(|| overflow(&label))
        };
        let commission_amount = share(commission_rate)?;
        let tax_amount = share(inputs.tax_percent)?;
        let ads_amount = share(inputs.ads_percent)?;

        let total_cost = [subsidy, commission_amount, tax_amount, ads_amount, fixed]
            .into_iter()
            .try_fold(inputs.product_value, Decimal::checked_add)
            .ok_or_else(|| overflow(&label))?;
        let net_profit = sale_price - total_cost;
        let net_profit_percent = net_profit
            .checked_div(sale_price)
            .and_then(|v| v.checked_mul(hundred))
            .ok_or_else(|| overflow(&label))?;

        debug!(
            marketplace = %label,
            price = %sale_price,
            fixed_fee = %fixed,
            shipping = %subsidy,
            net_profit = %net_profit,
            iterations,
            "Resolved sale price"
        );

        Ok(MarketplaceResult {
            label,
            icon: profile.icon.clone(),
            sale_price,
            commission_rate,
            commission_amount,
            tax_amount,
            ads_amount,
            fixed_fee: fixed,
            shipping_subsidy: subsidy,
            total_cost,
            net_profit,
            net_profit_percent,
            iterations,
            converged,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_catalog;
    use crate::fees::FREE_SHIPPING_THRESHOLD;
    use rust_decimal_macros::dec;

    fn inputs(
        product_value: Decimal,
        shipping: Decimal,
        tax: Decimal,
        ads: Decimal,
        profit: Decimal,
    ) -> CalculatorInputs {
        CalculatorInputs {
            product_value,
            shipping,
            tax_percent: tax,
            ads_percent: ads,
            desired_profit_percent: profit,
        }
    }

    fn profile(tiered: bool, subsidy: bool, flat_fee: Decimal) -> MarketplaceFeeProfile {
        MarketplaceFeeProfile {
            name: "Test".to_string(),
            commission_rates: vec![dec!(12)],
            flat_fee,
            uses_tiered_fixed_fee: tiered,
            applies_free_shipping_subsidy_above_threshold: subsidy,
            icon: String::new(),
        }
    }

    fn assert_close(actual: Decimal, expected: Decimal, tolerance: Decimal) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {} ≈ {} (±{})",
            actual,
            expected,
            tolerance
        );
    }

    #[test]
    fn test_mercado_livre_classico_scenario() {
        let catalog = default_catalog();
        let ml = &catalog[0];
        let input = inputs(dec!(100), dec!(20), dec!(5), dec!(10), dec!(15));

        assert_eq!(aggregate_rate(dec!(12), &input), dec!(0.42));

        let result = PriceResolver::resolve(ml, dec!(12), &input).unwrap();
        assert_close(result.sale_price, dec!(206.90), dec!(0.01));
        assert_eq!(result.fixed_fee, Decimal::ZERO);
        assert_eq!(result.shipping_subsidy, dec!(20));
        assert_close(result.net_profit_percent, dec!(15), dec!(0.5));
        assert!(result.converged);
        assert_eq!(result.iterations, 2);
        assert_eq!(result.label, "Mercado Livre Clássico (12%)");
    }

    #[test]
    fn test_infeasible_combination_is_flagged() {
        let p = profile(false, false, Decimal::ZERO);
        let input = inputs(dec!(100), dec!(0), dec!(30), dec!(20), dec!(10));
        let err = PriceResolver::resolve(&p, dec!(50), &input).unwrap_err();
        assert_eq!(
            err,
            PricingError::Infeasible {
                aggregate_rate: dec!(1.10)
            }
        );
    }

    #[test]
    fn test_exactly_one_hundred_percent_is_infeasible() {
        let p = profile(false, false, Decimal::ZERO);
        let input = inputs(dec!(100), dec!(0), dec!(30), dec!(20), dec!(30));
        assert!(PriceResolver::resolve(&p, dec!(20), &input).is_err());
    }

    #[test]
    fn test_huge_product_value_reports_overflow() {
        // 1e28 / (1 - 0.92) is past Decimal::MAX
        let p = profile(false, true, Decimal::ZERO);
        let input = inputs(
            dec!(10000000000000000000000000000),
            dec!(20),
            dec!(30),
            dec!(30),
            dec!(20),
        );
        assert!(input.validate().is_ok());
        assert_eq!(
            PriceResolver::resolve(&p, dec!(12), &input).unwrap_err(),
            PricingError::Overflow
        );
    }

    #[test]
    fn test_tiny_divisor_reports_overflow() {
        let p = profile(false, false, Decimal::ZERO);
        let input = inputs(
            // 1 - 0.9999999999999999999999999 = 1e-25
            dec!(1000000),
            dec!(0),
            dec!(87.99999999999999999999999),
            dec!(0),
            dec!(0),
        );
        assert_eq!(
            PriceResolver::resolve(&p, dec!(12), &input).unwrap_err(),
            PricingError::Overflow
        );
    }

    #[test]
    fn test_flat_fee_without_subsidy_is_closed_form() {
        // Shopee-like: 20% commission, 5.00 flat fee, no subsidy
        let p = profile(false, false, dec!(5));
        let input = inputs(dec!(50), dec!(15), dec!(0), dec!(0), dec!(10));
        let result = PriceResolver::resolve(&p, dec!(20), &input).unwrap();

        // (50 + 5) / 0.7
        assert_close(result.sale_price, dec!(78.5714), dec!(0.0001));
        assert_eq!(result.shipping_subsidy, Decimal::ZERO);
        assert_eq!(result.fixed_fee, dec!(5));
        assert!(result.converged);
    }

    #[test]
    fn test_low_price_uses_lowest_band() {
        let p = profile(true, true, Decimal::ZERO);
        let input = inputs(dec!(10), dec!(20), dec!(0), dec!(0), dec!(10));
        let result = PriceResolver::resolve(&p, dec!(12), &input).unwrap();

        // (10 + 6.25) / 0.78 ≈ 20.83, under the first band bound and the threshold
        assert_eq!(result.fixed_fee, dec!(6.25));
        assert_eq!(result.shipping_subsidy, Decimal::ZERO);
        assert_close(result.sale_price, dec!(20.83), dec!(0.01));
        assert!(result.converged);
    }

    #[test]
    fn test_subsidy_applies_only_above_threshold() {
        let p = profile(false, true, Decimal::ZERO);

        let cheap = inputs(dec!(40), dec!(20), dec!(0), dec!(0), dec!(10));
        let result = PriceResolver::resolve(&p, dec!(12), &cheap).unwrap();
        assert!(result.sale_price <= FREE_SHIPPING_THRESHOLD);
        assert_eq!(result.shipping_subsidy, Decimal::ZERO);

        let pricey = inputs(dec!(200), dec!(20), dec!(0), dec!(0), dec!(10));
        let result = PriceResolver::resolve(&p, dec!(12), &pricey).unwrap();
        assert!(result.sale_price > FREE_SHIPPING_THRESHOLD);
        assert_eq!(result.shipping_subsidy, dec!(20));
    }

    #[test]
    fn test_band_oscillation_hits_pass_cap() {
        // Base price just under 79 gets pushed over it by the 6.75 fee, where
        // the fee drops to zero and the price falls back under 79.
        let p = profile(true, false, Decimal::ZERO);
        // 69 / 0.88 ≈ 78.41, (69 + 6.75) / 0.88 ≈ 86.08
        let input = inputs(dec!(69), dec!(0), dec!(0), dec!(0), dec!(0));
        let result = PriceResolver::resolve(&p, dec!(12), &input).unwrap();

        assert!(!result.converged);
        assert_eq!(result.iterations, MAX_ITERATIONS);
        assert_eq!(result.total_cost + result.net_profit, result.sale_price);
    }

    #[test]
    fn test_costs_add_up_to_price() {
        let input = inputs(dec!(37.90), dec!(18.50), dec!(6), dec!(4), dec!(20));
        for p in default_catalog() {
            for rate in &p.commission_rates {
                let r = PriceResolver::resolve(&p, *rate, &input).unwrap();
                assert_eq!(r.total_cost + r.net_profit, r.sale_price);
                assert_close(r.net_profit_percent, dec!(20), dec!(0.5));
            }
        }
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let catalog = default_catalog();
        let input = inputs(dec!(123.45), dec!(21.9), dec!(7.5), dec!(3), dec!(18));
        let a = PriceResolver::resolve(&catalog[5], dec!(12.5), &input).unwrap();
        let b = PriceResolver::resolve(&catalog[5], dec!(12.5), &input).unwrap();
        assert_eq!(a, b);
    }
}
