//! Catalog-wide calculation

use tracing::info;

use crate::error::{InputResult, PricingError};
use crate::resolver::PriceResolver;
use crate::types::{Calculation, CalculatorInputs, MarketplaceFeeProfile, PricingOutcome};

/// Price every commission tier of every marketplace, in catalog order.
///
/// Inputs must already be validated. An infeasible tier is reported in place
/// and does not stop the rest of the catalog from being priced.
pub fn calculate(inputs: &CalculatorInputs, catalog: &[MarketplaceFeeProfile]) -> Calculation {
    let outcomes: Vec<PricingOutcome> = catalog
        .iter()
        .flat_map(|profile| {
            profile.commission_rates.iter().map(move |&rate| {
                match PriceResolver::resolve(profile, rate, inputs) {
                    Ok(result) => PricingOutcome::Priced(result),
                    Err(PricingError::Infeasible { aggregate_rate }) => PricingOutcome::Infeasible {
                        label: profile.label_for(rate),
                        commission_rate: rate,
                        aggregate_rate,
                    },
                    Err(PricingError::Overflow) => PricingOutcome::Overflow {
                        label: profile.label_for(rate),
                        commission_rate: rate,
                    },
                }
            })
        })
        .collect();

    let calculation = Calculation {
        inputs: *inputs,
        outcomes,
    };

    info!(
        product_value = %inputs.product_value,
        results = calculation.outcomes.len(),
        infeasible = calculation.infeasible_count(),
        overflow = calculation.overflow_count(),
        "Calculation complete"
    );

    calculation
}

/// Validate, then [`calculate`].
pub fn calculate_validated(
    inputs: &CalculatorInputs,
    catalog: &[MarketplaceFeeProfile],
) -> InputResult<Calculation> {
    inputs.validate()?;
    Ok(calculate(inputs, catalog))
}
