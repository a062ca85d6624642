//! Error types for the pricing engine

use rust_decimal::Decimal;
use thiserror::Error;

/// Rejected calculator input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("{field}: '{value}' is not a number")]
    NotANumber { field: &'static str, value: String },

    #[error("{field} must be positive (got {value})")]
    NotPositive { field: &'static str, value: Decimal },

    #[error("{field} cannot be negative (got {value})")]
    Negative { field: &'static str, value: Decimal },

    #[error("{field} must be between 0 and 100 (got {value})")]
    PercentOutOfRange { field: &'static str, value: Decimal },
}

/// Failure to price one commission tier
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    #[error("infeasible pricing: fees and margin take {}% of the sale price", as_percent(.aggregate_rate))]
    Infeasible { aggregate_rate: Decimal },

    #[error("sale price exceeds the representable range")]
    Overflow,
}

fn as_percent(rate: &Decimal) -> Decimal {
    (rate * Decimal::ONE_HUNDRED).normalize()
}

/// Failure to load or accept a fee catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog is empty")]
    Empty,

    #[error("Duplicate marketplace name: {0}")]
    DuplicateName(String),

    #[error("{0}: no commission rates")]
    NoCommissionRates(String),

    #[error("{name}: commission rate {rate} outside 0-100")]
    CommissionOutOfRange { name: String, rate: Decimal },

    #[error("{name}: negative flat fee {fee}")]
    NegativeFlatFee { name: String, fee: Decimal },

    #[error("Catalog read error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type InputResult<T> = Result<T, InputError>;
pub type CatalogResult<T> = Result<T, CatalogError>;
