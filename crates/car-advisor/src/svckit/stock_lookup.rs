//! Stock Lookup Tool

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use agent_core::{FieldSchema, Tool, ToolCall, ToolInput, ToolResult, ToolSchema};

use super::rejected;
use crate::catalog::Inventory;
use crate::error::Result;
use crate::format::capitalize;
use crate::model::ModelQuery;

pub const NAME: &str = "cek_stok_mobil";

/// Tool for checking units in stock
pub struct StockLookupTool {
    inventory: Arc<dyn Inventory>,
}

impl StockLookupTool {
    pub fn new(inventory: Arc<dyn Inventory>) -> Self {
        Self { inventory }
    }

    fn answer(&self, raw: &str) -> Result<ToolResult> {
        let query = ModelQuery::from_input(&ToolInput::parse(raw)?)?;

        let result = match self.inventory.stock(&query.model) {
            Some(units) => ToolResult::success(
                NAME,
                format!("Stok {} tersedia: {units} unit.", capitalize(&query.model)),
            )
            .with_data(json!({ "model": query.model, "found": true, "units": units })),
            None => ToolResult::success(NAME, "Model tidak ditemukan di database stok.")
                .with_data(json!({ "model": query.model, "found": false })),
        };
        Ok(result)
    }
}

#[async_trait]
impl Tool for StockLookupTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NAME.into(),
            description: "Mengecek stok mobil berdasarkan model.".into(),
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
            .unwrap_or_else(|e| rejected(NAME, "Error cek stok", &e))
    }
}
