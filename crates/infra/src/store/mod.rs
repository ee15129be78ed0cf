//! The storage seam for stock keeping.
//!
//! [`StockStore`] is the one boundary between the domain logic and the
//! relational store. Two implementations exist: [`PostgresStockStore`] for
//! production and [`InMemoryStockStore`] for dev/test wiring.

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryStockStore;
pub use postgres::PostgresStockStore;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use stockroom_core::{DomainError, PageInfo, PageRequest, ProductId, VariantId};
use stockroom_inventory::{
    AdjustStock, InventoryFilter, LowStockThresholds, StockItem, StockMovement,
};

/// Storage operation error.
///
/// These are **infrastructure errors** (missing rows, connectivity, driver
/// failures) plus domain failures surfaced from inside the store transaction.
/// Store failures are not retried; they surface directly to the caller.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The referenced product/variant does not exist, or the variant does not
    /// belong to the given product.
    #[error("stock item not found")]
    NotFound,

    /// A domain rule rejected the operation inside the store transaction
    /// (e.g. the adjustment would drive stock negative).
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The underlying store failed. Nothing was persisted.
    #[error("storage failure in {operation}: {message}")]
    Persistence {
        operation: &'static str,
        message: String,
    },
}

impl StoreError {
    pub fn persistence(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Persistence {
            operation,
            message: message.into(),
        }
    }

    /// Message safe to surface to the admin UI.
    ///
    /// Persistence details stay in the logs; the caller only learns that the
    /// adjustment failed.
    pub fn user_message(&self) -> String {
        match self {
            StoreError::NotFound => "stock item not found".to_string(),
            StoreError::Domain(e) => e.to_string(),
            StoreError::Persistence { .. } => "failed to adjust stock".to_string(),
        }
    }
}

/// Result of one accepted adjustment: the stock-keeping unit as persisted and
/// the ledger entry recorded alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedAdjustment {
    pub item: StockItem,
    pub movement: StockMovement,
}

/// One page of the admin inventory overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryPage {
    pub items: Vec<StockItem>,
    pub page_info: PageInfo,
}

/// Scope and size of a movement-history read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryQuery {
    /// Restrict to one product's movements (all its variants included).
    pub product_id: Option<ProductId>,
    /// Restrict to one variant's movements.
    pub variant_id: Option<VariantId>,
    /// Maximum number of movements to return; clamped to `1..=100`.
    pub limit: Option<u32>,
}

impl HistoryQuery {
    pub const DEFAULT_LIMIT: u32 = 50;

    pub fn effective_limit(&self) -> u32 {
        self.limit.unwrap_or(Self::DEFAULT_LIMIT).clamp(1, 100)
    }
}

/// Async storage interface for stock levels and the movement ledger.
#[async_trait]
pub trait StockStore: Send + Sync {
    /// Apply a validated adjustment as a single atomic unit.
    ///
    /// Loads the targeted stock-keeping unit, computes the resulting stock
    /// (rejecting anything that would go negative), persists the new level
    /// and inserts one ledger entry. Both writes commit together or not at
    /// all; concurrent adjustments to the same unit serialize on the store's
    /// own locking, never interleaving their read and write halves.
    async fn apply_adjustment(
        &self,
        adjustment: &AdjustStock,
    ) -> Result<AppliedAdjustment, StoreError>;

    /// Filtered, paginated overview of all stock-keeping units.
    ///
    /// Facets AND together; `page_info.total` reflects the full filtered
    /// count, not just the returned page.
    async fn fetch_overview(
        &self,
        filter: &InventoryFilter,
        page: PageRequest,
        thresholds: &LowStockThresholds,
    ) -> Result<InventoryPage, StoreError>;

    /// Most recent ledger entries, newest first, optionally scoped to one
    /// product or variant. Read-only.
    async fn fetch_history(&self, query: &HistoryQuery) -> Result<Vec<StockMovement>, StoreError>;
}

#[async_trait]
impl<S> StockStore for Arc<S>
where
    S: StockStore + ?Sized,
{
    async fn apply_adjustment(
        &self,
        adjustment: &AdjustStock,
    ) -> Result<AppliedAdjustment, StoreError> {
        (**self).apply_adjustment(adjustment).await
    }

    async fn fetch_overview(
        &self,
        filter: &InventoryFilter,
        page: PageRequest,
        thresholds: &LowStockThresholds,
    ) -> Result<InventoryPage, StoreError> {
        (**self).fetch_overview(filter, page, thresholds).await
    }

    async fn fetch_history(&self, query: &HistoryQuery) -> Result<Vec<StockMovement>, StoreError> {
        (**self).fetch_history(query).await
    }
}
