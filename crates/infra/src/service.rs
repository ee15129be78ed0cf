//! Stock adjustment service.
//!
//! Validates raw adjustment requests, delegates the atomic read-modify-write
//! to the store, and signals cache revalidation through an explicit sink so
//! callers (and tests) can observe it instead of relying on a hidden side
//! effect.

use std::sync::Mutex;

use serde::Serialize;
use tracing::instrument;

use stockroom_core::ProductId;
use stockroom_inventory::{AdjustStockRequest, StockItem};

use crate::store::{AppliedAdjustment, StockStore, StoreError};

/// Observer notified after every successful adjustment, so whatever caches
/// the inventory listing can refresh before the next read.
pub trait RevalidationSink: Send + Sync {
    fn stock_changed(&self, item: &StockItem);
}

impl<S> RevalidationSink for std::sync::Arc<S>
where
    S: RevalidationSink + ?Sized,
{
    fn stock_changed(&self, item: &StockItem) {
        (**self).stock_changed(item)
    }
}

/// Sink that records which products changed. For tests and dev wiring.
#[derive(Debug, Default)]
pub struct RecordingRevalidationSink {
    inner: Mutex<Vec<ProductId>>,
}

impl RecordingRevalidationSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Products signalled so far, in signal order.
    pub fn invalidated(&self) -> Vec<ProductId> {
        self.inner.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl RevalidationSink for RecordingRevalidationSink {
    fn stock_changed(&self, item: &StockItem) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.push(item.product_id);
        }
    }
}

/// Sink that logs the signal; the rendering layer's cache watches the log
/// stream in dev deployments.
#[derive(Debug, Default)]
pub struct TracingRevalidationSink;

impl RevalidationSink for TracingRevalidationSink {
    fn stock_changed(&self, item: &StockItem) {
        tracing::debug!(
            product_id = %item.product_id,
            variant_id = ?item.variant_id,
            stock = ?item.stock,
            "inventory listing revalidation requested"
        );
    }
}

/// Outcome of a best-effort bulk adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkAdjustOutcome {
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<BulkAdjustFailure>,
}

/// One failed item of a bulk adjustment, by position in the request batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkAdjustFailure {
    pub index: usize,
    pub message: String,
}

/// Applies stock adjustments against a [`StockStore`].
pub struct StockAdjustmentService<S, R> {
    store: S,
    sink: R,
}

impl<S, R> StockAdjustmentService<S, R>
where
    S: StockStore,
    R: RevalidationSink,
{
    pub fn new(store: S, sink: R) -> Self {
        Self { store, sink }
    }

    /// Validate and apply one adjustment.
    ///
    /// Validation rejects before any store access; the store applies the
    /// stock update and the ledger insert atomically. On success the
    /// revalidation sink is signalled.
    #[instrument(skip(self, request), err)]
    pub async fn adjust_stock(
        &self,
        request: &AdjustStockRequest,
    ) -> Result<AppliedAdjustment, StoreError> {
        let adjustment = request.validate()?;
        let applied = self.store.apply_adjustment(&adjustment).await?;

        tracing::info!(
            product_id = %applied.item.product_id,
            variant_id = ?applied.item.variant_id,
            movement_type = %applied.movement.movement_type,
            quantity = applied.movement.quantity,
            stock = ?applied.item.stock,
            "stock adjusted"
        );
        self.sink.stock_changed(&applied.item);

        Ok(applied)
    }

    /// Apply a batch of adjustments, best-effort.
    ///
    /// Each item keeps the single-adjustment atomicity guarantee, but the
    /// batch as a whole does not: a later failure never rolls back earlier
    /// successes. Failures are reported per item by batch position.
    #[instrument(skip(self, requests), fields(batch = requests.len()))]
    pub async fn bulk_adjust_stock(&self, requests: &[AdjustStockRequest]) -> BulkAdjustOutcome {
        let mut outcome = BulkAdjustOutcome {
            succeeded: 0,
            failed: 0,
            failures: Vec::new(),
        };

        for (index, request) in requests.iter().enumerate() {
            match self.adjust_stock(request).await {
                Ok(_) => outcome.succeeded += 1,
                Err(err) => {
                    outcome.failed += 1;
                    outcome.failures.push(BulkAdjustFailure {
                        index,
                        message: err.user_message(),
                    });
                }
            }
        }

        outcome
    }
}
