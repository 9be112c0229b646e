//! Installment Calculator Tool
//!
//! Monthly payment for a financed purchase:
//!
//! ```text
//! monthly = (harga - dp) * 1.07 / tenor
//! ```
//!
//! The 7% is a flat surcharge on the financed amount, charged once and not
//! compounded per month or per year. It approximates a dealer quote; it is
//! not an amortized loan schedule.

use async_trait::async_trait;
use rust_decimal::RoundingStrategy;
use serde_json::json;

use agent_core::{FieldSchema, Tool, ToolCall, ToolInput, ToolResult, ToolSchema};

use super::rejected;
use crate::error::Result;
use crate::format::rupiah_rounded;
use crate::model::{INSTALLMENT_SURCHARGE, InstallmentRequest};

pub const NAME: &str = "hitung_cicilan";

/// Tool for computing monthly installments
#[derive(Default)]
pub struct InstallmentCalculatorTool;

impl InstallmentCalculatorTool {
    pub const fn new() -> Self {
        Self
    }

    fn answer(raw: &str) -> Result<ToolResult> {
        let request = InstallmentRequest::from_input(&ToolInput::parse(raw)?)?;
        let monthly = request.monthly_payment()?;
        let rounded = monthly.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);

        Ok(
            ToolResult::success(NAME, format!("Cicilan per bulan: {}", rupiah_rounded(monthly)))
                .with_data(json!({
                    "harga": request.harga,
                    "dp": request.dp,
                    "tenor": request.tenor,
                    "principal": request.principal(),
                    "surcharge": INSTALLMENT_SURCHARGE,
                    "monthly": rounded,
                })),
        )
    }
}

#[async_trait]
impl Tool for InstallmentCalculatorTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NAME.into(),
            description: "Hitung cicilan mobil.".into(),
            input_format: "harga=250000000;dp=50000000;tenor=60".into(),
            fields: vec![
                FieldSchema::required("harga", "number", "Harga mobil dalam rupiah"),
                FieldSchema::required("dp", "number", "Uang muka dalam rupiah"),
                FieldSchema::required("tenor", "integer", "Lama cicilan dalam bulan"),
            ],
            category: Some("pembiayaan".into()),
        }
    }

    async fn execute(&self, call: &ToolCall) -> ToolResult {
        Self::answer(&call.input).unwrap_or_else(|e| rejected(NAME, "Error hitung cicilan", &e))
    }
}
