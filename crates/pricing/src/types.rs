//! Types for the pricing engine

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Numeric inputs for one calculation.
///
/// Values are expected to be range-checked (see [`CalculatorInputs::validate`])
/// before they reach the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculatorInputs {
    /// Product cost, in currency units
    pub product_value: Decimal,
    /// Shipping cost absorbed when a marketplace subsidizes free shipping
    pub shipping: Decimal,
    /// Invoice tax as a percentage of the sale price (e.g., 5 = 5%)
    pub tax_percent: Decimal,
    /// Advertising spend as a percentage of the sale price
    pub ads_percent: Decimal,
    /// Target net margin as a percentage of the sale price
    pub desired_profit_percent: Decimal,
}

/// Fee rules for one marketplace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketplaceFeeProfile {
    pub name: String,
    /// Alternative commission tiers, each priced separately
    pub commission_rates: Vec<Decimal>,
    /// Per-sale fee, ignored when `uses_tiered_fixed_fee` is set
    #[serde(default)]
    pub flat_fee: Decimal,
    #[serde(default)]
    pub uses_tiered_fixed_fee: bool,
    #[serde(default)]
    pub applies_free_shipping_subsidy_above_threshold: bool,
    #[serde(default)]
    pub icon: String,
}

impl MarketplaceFeeProfile {
    /// Display label for one of this profile's commission rates.
    ///
    /// Profiles with several tiers get the rate appended so each result stays
    /// distinguishable: `"Mercado Livre Clássico (12%)"`.
    pub fn label_for(&self, commission_rate: Decimal) -> String {
        if self.commission_rates.len() > 1 {
            format!("{} ({}%)", self.name, commission_rate.normalize())
        } else {
            self.name.clone()
        }
    }
}

/// Priced result for one (marketplace, commission rate) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketplaceResult {
    pub label: String,
    pub icon: String,
    pub sale_price: Decimal,
    pub commission_rate: Decimal,
    pub commission_amount: Decimal,
    pub tax_amount: Decimal,
    pub ads_amount: Decimal,
    pub fixed_fee: Decimal,
    pub shipping_subsidy: Decimal,
    pub total_cost: Decimal,
    pub net_profit: Decimal,
    pub net_profit_percent: Decimal,
    /// Fixed-point passes performed
    pub iterations: u32,
    /// Whether successive prices settled within tolerance before the pass cap
    pub converged: bool,
}

/// Outcome of pricing one commission tier of one marketplace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PricingOutcome {
    Priced(MarketplaceResult),
    /// Commission, tax, ads and margin together take 100% or more of the price
    Infeasible {
        label: String,
        commission_rate: Decimal,
        aggregate_rate: Decimal,
    },
    /// Price or fees fall outside the `Decimal` range
    Overflow {
        label: String,
        commission_rate: Decimal,
    },
}

impl PricingOutcome {
    pub fn label(&self) -> &str {
        match self {
            Self::Priced(result) => &result.label,
            Self::Infeasible { label, .. } | Self::Overflow { label, .. } => label,
        }
    }

    pub fn as_priced(&self) -> Option<&MarketplaceResult> {
        match self {
            Self::Priced(result) => Some(result),
            Self::Infeasible { .. } | Self::Overflow { .. } => None,
        }
    }

    pub fn is_infeasible(&self) -> bool {
        matches!(self, Self::Infeasible { .. })
    }
}

/// Full answer to one calculation request, in catalog order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calculation {
    pub inputs: CalculatorInputs,
    pub outcomes: Vec<PricingOutcome>,
}

impl Calculation {
    pub fn priced(&self) -> impl Iterator<Item = &MarketplaceResult> {
        self.outcomes.iter().filter_map(PricingOutcome::as_priced)
    }

    pub fn infeasible_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_infeasible()).count()
    }

    pub fn overflow_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, PricingOutcome::Overflow { .. }))
            .count()
    }
}
