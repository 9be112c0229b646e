//! Typed Tool Requests
//!
//! Each tool reads the flat `key=value` record into one of these before
//! touching the catalog. Uses `rust_decimal` for all monetary values.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use agent_core::ToolInput;

use crate::error::{AdvisorError, Result};
use crate::format::title_case;

/// Flat surcharge applied to the financed amount.
///
/// Not an annual rate: it is charged once regardless of tenor, so long
/// tenors come out cheaper than any real amortized loan.
pub const INSTALLMENT_SURCHARGE: Decimal = dec!(0.07);

/// Model name as the catalog keys it (lower-case)
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ModelQuery {
    pub model: String,
}

impl ModelQuery {
    pub fn from_input(input: &ToolInput) -> Result<Self> {
        Ok(Self {
            model: input.require("model")?.to_lowercase(),
        })
    }
}

/// City name as the dealer list keys it (title-case)
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CityQuery {
    pub kota: String,
}

impl CityQuery {
    pub fn from_input(input: &ToolInput) -> Result<Self> {
        Ok(Self {
            kota: title_case(input.require("kota")?),
        })
    }
}

/// Vehicle financing request
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InstallmentRequest {
    /// On-the-road price
    pub harga: Decimal,
    /// Down payment
    pub dp: Decimal,
    /// Number of monthly payments
    pub tenor: u32,
}

impl InstallmentRequest {
    pub fn from_input(input: &ToolInput) -> Result<Self> {
        let harga = parse_amount("harga", input.require("harga")?)?;
        let dp = parse_amount("dp", input.require("dp")?)?;
        let tenor = parse_tenor(input.require("tenor")?)?;

        if dp > harga {
            return Err(AdvisorError::DownPaymentExceedsPrice { dp, harga });
        }

        Ok(Self { harga, dp, tenor })
    }

    /// Amount left to finance
    pub fn principal(&self) -> Decimal {
        self.harga - self.dp
    }

    /// Monthly payment before rounding: `principal * (1 + surcharge) / tenor`
    pub fn monthly_payment(&self) -> Result<Decimal> {
        self.principal()
            .checked_mul(Decimal::ONE + INSTALLMENT_SURCHARGE)
            .and_then(|total| total.checked_div(Decimal::from(self.tenor)))
            .ok_or(AdvisorError::Overflow)
    }
}

/// Non-negative decimal; plain or scientific notation
fn parse_amount(field: &'static str, raw: &str) -> Result<Decimal> {
    let text = raw.trim();
    let value = Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|_| AdvisorError::InvalidNumber {
            field,
            value: raw.to_string(),
        })?;

    if value.is_sign_negative() && !value.is_zero() {
        return Err(AdvisorError::NegativeAmount { field, value });
    }
    Ok(value)
}

/// Whole number of months, at least one
fn parse_tenor(raw: &str) -> Result<u32> {
    let months: i64 = raw
        .trim()
        .parse()
        .map_err(|_| AdvisorError::InvalidInteger {
            field: "tenor",
            value: raw.to_string(),
        })?;

    if months <= 0 {
        return Err(AdvisorError::NonPositiveTenor(months));
    }
    u32::try_from(months).map_err(|_| AdvisorError::Overflow)
}
