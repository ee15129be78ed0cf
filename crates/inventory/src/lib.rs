//! Inventory domain module.
//!
//! This crate contains business rules for stock keeping, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage): adjustment request
//! validation, the stock arithmetic for each movement type, stock-level
//! classification, and the filter vocabulary used by the admin overview.

pub mod adjustment;
pub mod filter;
pub mod movement;
pub mod stock;

pub use adjustment::{AdjustStock, AdjustStockRequest, MAX_REASON_LEN};
pub use filter::{InventoryFilter, ProductTypeFilter, StockLevelFilter};
pub use movement::{MovementType, StockMovement};
pub use stock::{LowStockThresholds, ProductKind, StockItem, StockLevel};
