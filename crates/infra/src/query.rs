//! Inventory query service: read-only views for the admin inventory screen.

use tracing::instrument;

use stockroom_core::PageRequest;
use stockroom_inventory::{InventoryFilter, LowStockThresholds, StockLevel, StockMovement};

use crate::store::{HistoryQuery, InventoryPage, StockStore, StoreError};

/// Read side of the inventory back-office.
pub struct InventoryQueryService<S> {
    store: S,
    thresholds: LowStockThresholds,
}

impl<S> InventoryQueryService<S>
where
    S: StockStore,
{
    pub fn new(store: S, thresholds: LowStockThresholds) -> Self {
        Self { store, thresholds }
    }

    pub fn thresholds(&self) -> &LowStockThresholds {
        &self.thresholds
    }

    /// Classify one unit's stock for display.
    pub fn classify(&self, item: &stockroom_inventory::StockItem) -> StockLevel {
        item.stock_level(&self.thresholds)
    }

    /// Filtered, paginated overview of all stock-keeping units.
    #[instrument(skip(self, filter), fields(page = page.page(), limit = page.limit()), err)]
    pub async fn overview(
        &self,
        filter: &InventoryFilter,
        page: PageRequest,
    ) -> Result<InventoryPage, StoreError> {
        self.store
            .fetch_overview(filter, page, &self.thresholds)
            .await
    }

    /// Most recent stock movements, newest first.
    #[instrument(skip(self, query), err)]
    pub async fn history(&self, query: &HistoryQuery) -> Result<Vec<StockMovement>, StoreError> {
        self.store.fetch_history(query).await
    }
}
