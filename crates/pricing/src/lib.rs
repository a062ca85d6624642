//! Marketplace Pricing Engine — sale prices that hit a target net margin
//!
//! Provides:
//! - Static marketplace fee catalog (commission tiers, fixed fees, free-shipping rules)
//! - Fixed-point sale-price resolver for price-dependent fees
//! - Catalog-wide calculation with infeasible-combination reporting
//! - Locale-aware input parsing and validation

pub mod calculator;
pub mod catalog;
pub mod error;
pub mod fees;
pub mod resolver;
pub mod types;
pub mod validation;

// Re-exports for convenience
pub use calculator::{calculate, calculate_validated};
pub use catalog::{default_catalog, load_catalog, parse_catalog, validate_catalog};
pub use error::{CatalogError, InputError, PricingError};
pub use fees::{FREE_SHIPPING_THRESHOLD, TIERED_FIXED_FEE_BANDS};
pub use resolver::{PriceResolver, CONVERGENCE_TOLERANCE, MAX_ITERATIONS};
pub use types::*;
pub use validation::{parse_locale_decimal, RawCalculatorInputs};
