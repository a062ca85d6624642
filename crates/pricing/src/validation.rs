//! Input parsing and range checks
//!
//! Form input arrives as text such as `"12,50"`. It is parsed here and checked
//! before any pricing happens; the resolver trusts what it is given.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::{InputError, InputResult};
use crate::types::CalculatorInputs;

/// Parse a decimal typed with either `,` or `.` as the decimal separator.
pub fn parse_locale_decimal(field: &'static str, text: &str) -> InputResult<Decimal> {
    let normalized = text.trim().replacen(',', ".", 1);
    Decimal::from_str(&normalized).map_err(|_| InputError::NotANumber {
        field,
        value: text.to_string(),
    })
}

fn check_percent(field: &'static str, value: Decimal) -> InputResult<()> {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err(InputError::PercentOutOfRange { field, value });
    }
    Ok(())
}

impl CalculatorInputs {
    /// Reject values the resolver cannot price.
    pub fn validate(&self) -> InputResult<()> {
        if self.product_value <= Decimal::ZERO {
            return Err(InputError::NotPositive {
                field: "product_value",
                value: self.product_value,
            });
        }
        if self.shipping < Decimal::ZERO {
            return Err(InputError::Negative {
                field: "shipping",
                value: self.shipping,
            });
        }
        check_percent("tax_percent", self.tax_percent)?;
        check_percent("ads_percent", self.ads_percent)?;
        check_percent("desired_profit_percent", self.desired_profit_percent)?;
        Ok(())
    }
}

/// Calculator fields as typed by a user
#[derive(Debug, Clone, Default)]
pub struct RawCalculatorInputs {
    pub product_value: String,
    pub shipping: String,
    pub tax_percent: String,
    pub ads_percent: String,
    pub desired_profit_percent: String,
}

impl RawCalculatorInputs {
    /// Parse every field and validate the result.
    pub fn parse(&self) -> InputResult<CalculatorInputs> {
        let inputs = CalculatorInputs {
            product_value: parse_locale_decimal("product_value", &self.product_value)?,
            shipping: parse_locale_decimal("shipping", &self.shipping)?,
            tax_percent: parse_locale_decimal("tax_percent", &self.tax_percent)?,
            ads_percent: parse_locale_decimal("ads_percent", &self.ads_percent)?,
            desired_profit_percent: parse_locale_decimal(
                "desired_profit_percent",
                &self.desired_profit_percent,
            )?,
        };
        inputs.validate()?;
        Ok(inputs)
    }
}
