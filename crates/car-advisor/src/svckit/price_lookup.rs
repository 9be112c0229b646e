//! Price Lookup Tool
//!
//! Looks up the on-the-road price of a model.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use agent_core::{FieldSchema, Tool, ToolCall, ToolInput, ToolResult, ToolSchema};

use super::rejected;
use crate::catalog::Inventory;
use crate::error::Result;
use crate::format::{capitalize, rupiah};
use crate::model::ModelQuery;

pub const NAME: &str = "cek_harga_mobil";

/// Tool for looking up car prices
pub struct PriceLookupTool {
    inventory: Arc<dyn Inventory>,
}

impl PriceLookupTool {
    pub fn new(inventory: Arc<dyn Inventory>) -> Self {
        Self { inventory }
    }

    fn answer(&self, raw: &str) -> Result<ToolResult> {
        let query = ModelQuery::from_input(&ToolInput::parse(raw)?)?;

        let result = match self.inventory.price(&query.model) {
            Some(price) => ToolResult::success(
                NAME,
                format!("Harga {} adalah {}", capitalize(&query.model), rupiah(price)),
            )
            .with_data(json!({ "model": query.model, "found": true, "price": price })),
            None => ToolResult::success(NAME, "Model tidak ditemukan di database harga.")
                .with_data(json!({ "model": query.model, "found": false })),
        };
        Ok(result)
    }
}

#[async_trait]
impl Tool for PriceLookupTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NAME.into(),
            description: "Cek harga mobil berdasarkan model.".into(),
            input_format: "model=Avanza".into(),
            fields: vec![FieldSchema::required(
                "model",
                "string",
                "Nama model mobil, tidak peka huruf besar/kecil",
            )],
            category: Some("katalog".into()),
        }
    }

    async fn execute(&self, call: &ToolCall) -> ToolResult {
        self.answer(&call.input)
            .unwrap_or_else(|e| rejected(NAME, "Error cek harga", &e))
    }
}
