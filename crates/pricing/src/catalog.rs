//! Marketplace fee catalog
//!
//! Ordered list of fee profiles. Catalog order is result order. The built-in
//! table covers the Brazilian marketplaces the calculator ships with; a JSON
//! file with the same shape can replace it at startup.

use std::collections::HashSet;
use std::path::Path;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::info;

use crate::error::{CatalogError, CatalogResult};
use crate::types::MarketplaceFeeProfile;

fn profile(
    name: &str,
    commission_rates: &[Decimal],
    flat_fee: Decimal,
    uses_tiered_fixed_fee: bool,
    applies_free_shipping_subsidy_above_threshold: bool,
    icon: &str,
) -> MarketplaceFeeProfile {
    MarketplaceFeeProfile {
        name: name.to_string(),
        commission_rates: commission_rates.to_vec(),
        flat_fee,
        uses_tiered_fixed_fee,
        applies_free_shipping_subsidy_above_threshold,
        icon: icon.to_string(),
    }
}

/// Built-in catalog, in display order
pub fn default_catalog() -> Vec<MarketplaceFeeProfile> {
    vec![
        profile("Mercado Livre Clássico", &[dec!(10), dec!(12)], Decimal::ZERO, true, true, "🛒"),
        profile("Mercado Livre Premium", &[dec!(18)], Decimal::ZERO, true, true, "⭐"),
        profile("Shopee", &[dec!(20)], dec!(5), false, false, "🛍️"),
        profile("Magalu", &[dec!(12)], Decimal::ZERO, false, true, "🏪"),
        profile("Americanas", &[dec!(18)], Decimal::ZERO, false, true, "🏬"),
        profile("Amazon", &[dec!(12.5)], dec!(5.50), false, true, "📦"),
        profile("Aliexpress", &[dec!(8)], Decimal::ZERO, false, false, "🌏"),
    ]
}

/// Check a catalog before it is published.
pub fn validate_catalog(catalog: &[MarketplaceFeeProfile]) -> CatalogResult<()> {
    if catalog.is_empty() {
        return Err(CatalogError::Empty);
    }

    let mut seen = HashSet::new();
    for p in catalog {
        if !seen.insert(p.name.as_str()) {
            return Err(CatalogError::DuplicateName(p.name.clone()));
        }
        if p.commission_rates.is_empty() {
            return Err(CatalogError::NoCommissionRates(p.name.clone()));
        }
        if let Some(rate) = p
            .commission_rates
            .iter()
            .find(|r| **r < Decimal::ZERO || **r > Decimal::ONE_HUNDRED)
        {
            return Err(CatalogError::CommissionOutOfRange {
                name: p.name.clone(),
                rate: *rate,
            });
        }
        if p.flat_fee < Decimal::ZERO {
            return Err(CatalogError::NegativeFlatFee {
                name: p.name.clone(),
                fee: p.flat_fee,
            });
        }
    }

    Ok(())
}

/// Parse and validate a catalog from JSON text (an array of profiles).
pub fn parse_catalog(json: &str) -> CatalogResult<Vec<MarketplaceFeeProfile>> {
    let catalog: Vec<MarketplaceFeeProfile> = serde_json::from_str(json)?;
    validate_catalog(&catalog)?;
    Ok(catalog)
}

/// Load a catalog file, or the built-in table when no path is given.
pub fn load_catalog(path: Option<&Path>) -> CatalogResult<Vec<MarketplaceFeeProfile>> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            let catalog = parse_catalog(&text)?;
            info!(
                path = %path.display(),
                marketplaces = catalog.len(),
                "Loaded fee catalog"
            );
            Ok(catalog)
        }
        None => Ok(default_catalog()),
    }
}
