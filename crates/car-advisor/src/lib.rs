//! # car-advisor
//!
//! Showroom knowledge for the dealer assistant: the catalog, the four sales
//! tools and the sales persona.
//!
//! ## Tools
//!
//! ```text
//! ┌──────────────────┬──────────────────────────────────────┬─────────────────────────────────┐
//! │ Tool             │ Input                                │ Answer                          │
//! ├──────────────────┼──────────────────────────────────────┼─────────────────────────────────┤
//! │ cek_harga_mobil  │ model=Avanza                         │ Harga Avanza adalah Rp 250,...  │
//! │ cek_stok_mobil   │ model=Avanza                         │ Stok Avanza tersedia: 5 unit.   │
//! │ hitung_cicilan   │ harga=250000000;dp=50000000;tenor=60 │ Cicilan per bulan: Rp 3,566,667 │
//! │ lokasi_dealer    │ kota=Jakarta                         │ Dealer terdekat di Jakarta: ... │
//! └──────────────────┴──────────────────────────────────────┴─────────────────────────────────┘
//! ```
//!
//! Every tool answers with text, including for bad input
//! (`Error cek harga: missing field 'model'`), so the planner can read the
//! fault and try again.

pub mod catalog;
pub mod error;
pub mod format;
pub mod model;
pub mod svckit;

use std::sync::Arc;

use agent_core::ToolRegistry;

pub use catalog::{Inventory, StaticInventory};
pub use error::{AdvisorError, Result};
pub use model::{CityQuery, InstallmentRequest, ModelQuery};

/// Re-export tools for easy registration
pub mod tools {
    pub use crate::svckit::{
        DealerLocatorTool, InstallmentCalculatorTool, PriceLookupTool, StockLookupTool,
    };
}

/// System prompt for the dealer assistant
pub const DEALER_SYSTEM_PROMPT: &str = "Kamu adalah BOT PELAYANAN PEMBELIAN MOBIL.
Gaya bahasa: formal, sopan, profesional.
Tugas:
- Memberikan informasi mobil, harga, stok, dealer, dan cicilan.
- Menggunakan tool jika diperlukan.
- Berbicara seperti sales marketing berpengalaman.

Jangan mengada-ada. Jika tidak tahu, gunakan tool.";

/// Register the four dealer tools over the built-in catalog
pub fn register_tools(registry: &mut ToolRegistry) {
    register_tools_with(registry, Arc::new(StaticInventory::new()));
}

/// Register the four dealer tools over a custom catalog
pub fn register_tools_with(registry: &mut ToolRegistry, inventory: Arc<dyn Inventory>) {
    tracing::debug!(catalog = inventory.name(), "Registering dealer tools");
    registry.register(tools::PriceLookupTool::new(Arc::clone(&inventory)));
    registry.register(tools::StockLookupTool::new(Arc::clone(&inventory)));
    registry.register(tools::InstallmentCalculatorTool::new());
    registry.register(tools::DealerLocatorTool::new(inventory));
}
