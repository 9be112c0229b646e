//! Dealer Locator Tool
//!
//! Finds the showroom for a city. City names are title-cased before the
//! lookup, so `jakarta` and `JAKARTA` both hit `Jakarta`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use agent_core::{FieldSchema, Tool, ToolCall, ToolInput, ToolResult, ToolSchema};

use super::rejected;
use crate::catalog::Inventory;
use crate::error::Result;
use crate::model::CityQuery;

pub const NAME: &str = "lokasi_dealer";

/// Tool for locating the nearest dealer
pub struct DealerLocatorTool {
    inventory: Arc<dyn Inventory>,
}

impl DealerLocatorTool {
    pub fn new(inventory: Arc<dyn Inventory>) -> Self {
        Self { inventory }
    }

    fn answer(&self, raw: &str) -> Result<ToolResult> {
        let query = CityQuery::from_input(&ToolInput::parse(raw)?)?;

        let result = match self.inventory.dealer(&query.kota) {
            Some(address) => ToolResult::success(
                NAME,
                format!("Dealer terdekat di {}: {address}", query.kota),
            )
            .with_data(json!({ "kota": query.kota, "found": true, "address": address })),
            None => ToolResult::success(NAME, "Dealer untuk kota tersebut tidak ditemukan.")
                .with_data(json!({ "kota": query.kota, "found": false })),
        };
        Ok(result)
    }
}

#[async_trait]
impl Tool for DealerLocatorTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: NAME.into(),
            description: "Mendapatkan dealer mobil terdekat.".into(),
            input_format: "kota=Jakarta".into(),
            fields: vec![FieldSchema::required("kota", "string", "Nama kota")],
            category: Some("dealer".into()),
        }
    }

    async fn execute(&self, call: &ToolCall) -> ToolResult {
        self.answer(&call.input)
            .unwrap_or_else(|e| rejected(NAME, "Error cari dealer", &e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticInventory;

    fn tool() -> DealerLocatorTool {
        DealerLocatorTool::new(Arc::new(StaticInventory::new()))
    }

    #[tokio::test]
    async fn test_city_case_folding() {
        let lower = tool().invoke("kota=jakarta").await;
        assert_eq!(lower, tool().invoke("kota=Jakarta").await);
        assert_eq!(lower, tool().invoke("kota=JAKARTA").await);
        assert_eq!(
            lower,
            "Dealer terdekat di Jakarta: Toyota Astrido Sunter, Jakarta Utara"
        );
    }

    #[tokio::test]
    async fn test_unknown_city() {
        assert_eq!(
            tool().invoke("kota=Makassar").await,
            "Dealer untuk kota tersebut tidak ditemukan."
        );
    }

    #[tokio::test]
    async fn test_missing_city() {
        assert_eq!(
            tool().invoke("city=Medan").await,
            "Error cari dealer: missing field 'kota'"
        );
    }
}
