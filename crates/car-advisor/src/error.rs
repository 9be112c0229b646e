//! Error Types for Car Advisor
//!
//! Everything here stays inside the tool boundary: each tool turns an
//! `AdvisorError` into its own `Error <verb>: <reason>` answer.

use rust_decimal::Decimal;
use thiserror::Error;

use agent_core::ToolInputError;

pub type Result<T> = std::result::Result<T, AdvisorError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdvisorError {
    /// Input string did not parse, or a required key is absent
    #[error(transparent)]
    Input(#[from] ToolInputError),

    #[error("field '{field}' is not a number: '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("field '{field}' is not a whole number: '{value}'")]
    InvalidInteger { field: &'static str, value: String },

    #[error("field '{field}' must not be negative: {value}")]
    NegativeAmount { field: &'static str, value: Decimal },

    #[error("down payment {dp} exceeds price {harga}")]
    DownPaymentExceedsPrice { dp: Decimal, harga: Decimal },

    #[error("tenor must be at least one month, got {0}")]
    NonPositiveTenor(i64),

    #[error("installment amount is out of range")]
    Overflow,
}
