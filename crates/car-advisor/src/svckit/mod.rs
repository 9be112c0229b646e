//! Service Kit - Agent Tools
//!
//! Dealer tools that implement `agent_core::Tool`. Each one answers with
//! text: a catalog hit, a not-found sentence, or `Error <verb>: <reason>`.

mod dealer_locator;
mod installment_calculator;
mod price_lookup;
mod stock_lookup;

pub use dealer_locator::DealerLocatorTool;
pub use installment_calculator::InstallmentCalculatorTool;
pub use price_lookup::PriceLookupTool;
pub use stock_lookup::StockLookupTool;

use agent_core::ToolResult;

use crate::error::AdvisorError;

/// Turn a fault inside a tool into its failed answer
fn rejected(tool: &str, prefix: &str, err: &AdvisorError) -> ToolResult {
    tracing::debug!(tool, error = %err, "Tool input rejected");
    ToolResult::failure(tool, format!("{prefix}: {err}"))
}
