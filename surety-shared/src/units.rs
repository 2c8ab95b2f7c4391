//! Conversion between human-decimal amounts ("1.5") and base units.
//!
//! One whole unit is `10^DECIMALS` base units, mirroring ether/wei.

use crate::models::Wei;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

pub const DECIMALS: u32 = 18;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnitsError {
    #[error("Amount is empty")]
    Empty,

    #[error("Not a non-negative decimal amount: {0:?}")]
    InvalidAmount(String),

    #[error("Too many decimal places: {0} (max {DECIMALS})")]
    TooManyDecimals(u32),

    #[error("Amount overflows base units: {0}")]
    Overflow(String),
}

fn one_unit() -> Decimal {
    Decimal::from(10u64.pow(DECIMALS))
}

/// Parse a decimal string such as `"10"` or `"0.25"` into base units
pub fn parse_units(amount: &str) -> Result<Wei, UnitsError> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(UnitsError::Empty);
    }

    let value = Decimal::from_str(amount)
        .map_err(|_| UnitsError::InvalidAmount(amount.to_string()))?
        .normalize();
    if value.is_sign_negative() && !value.is_zero() {
        return Err(UnitsError::InvalidAmount(amount.to_string()));
    }
    if value.scale() > DECIMALS {
        return Err(UnitsError::TooManyDecimals(value.scale()));
    }

    value
        .checked_mul(one_unit())
        .and_then(|base| base.to_u128())
        .ok_or_else(|| UnitsError::Overflow(amount.to_string()))
}

/// Render base units as a decimal string without trailing zeros
pub fn format_units(amount: Wei) -> Result<String, UnitsError> {
    let overflow = || UnitsError::Overflow(amount.to_string());
    let mantissa = i128::try_from(amount).map_err(|_| overflow())?;
    let value = Decimal::try_from_i128_with_scale(mantissa, DECIMALS).map_err(|_| overflow())?;
    Ok(value.normalize().to_string())
}
