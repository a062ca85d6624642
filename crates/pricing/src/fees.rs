//! Marketplace fee rules that depend on the sale price
//!
//! Two rules feed back into the price the resolver is solving for:
//! - Tiered fixed fee: a per-sale fee picked by price band, dropping to zero
//!   above the free-shipping threshold.
//! - Shipping subsidy: the seller absorbs the shipping cost once the price
//!   exceeds the free-shipping threshold.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::MarketplaceFeeProfile;

/// Sale price above which free shipping kicks in
pub const FREE_SHIPPING_THRESHOLD: Decimal = dec!(79);

/// Fixed-fee bands as (inclusive upper price bound, fee), ascending.
/// Prices above the last bound pay no fixed fee.
pub const TIERED_FIXED_FEE_BANDS: [(Decimal, Decimal); 3] = [
    (dec!(29), dec!(6.25)),
    (dec!(50), dec!(6.50)),
    (dec!(79), dec!(6.75)),
];

/// Fixed fee for a price under the tiered schedule.
pub fn tiered_fixed_fee(sale_price: Decimal) -> Decimal {
    TIERED_FIXED_FEE_BANDS
        .iter()
        .find(|(upper, _)| sale_price <= *upper)
        .map(|(_, fee)| *fee)
        .unwrap_or(Decimal::ZERO)
}

/// Fixed fee the profile charges at the given price.
pub fn fixed_fee(profile: &MarketplaceFeeProfile, sale_price: Decimal) -> Decimal {
    if profile.uses_tiered_fixed_fee {
        tiered_fixed_fee(sale_price)
    } else {
        profile.flat_fee
    }
}

/// Shipping the seller absorbs at the given price.
pub fn shipping_subsidy(
    profile: &MarketplaceFeeProfile,
    sale_price: Decimal,
    shipping: Decimal,
) -> Decimal {
    if profile.applies_free_shipping_subsidy_above_threshold && sale_price > FREE_SHIPPING_THRESHOLD
    {
        shipping
    } else {
        Decimal::ZERO
    }
}
