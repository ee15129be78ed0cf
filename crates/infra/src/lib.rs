//! `stockroom-infra` — storage and application services for the inventory
//! back-office.
//!
//! The domain crates stay pure; everything that touches a database, a clock,
//! or a cache lives here: the [`store::StockStore`] seam with Postgres and
//! in-memory implementations, the stock adjustment service (single and
//! best-effort bulk), and the inventory query service.

pub mod query;
pub mod service;
pub mod store;

#[cfg(test)]
mod integration_tests;

pub use query::InventoryQueryService;
pub use service::{
    BulkAdjustFailure, BulkAdjustOutcome, RecordingRevalidationSink, RevalidationSink,
    StockAdjustmentService, TracingRevalidationSink,
};
pub use store::{
    AppliedAdjustment, HistoryQuery, InMemoryStockStore, InventoryPage, PostgresStockStore,
    StockStore, StoreError,
};
