//! Application wiring: services + router.

use std::sync::Arc;

use axum::{Extension, Router};
use sqlx::PgPool;
use tower::ServiceBuilder;

use stockroom_infra::{
    InMemoryStockStore, InventoryQueryService, PostgresStockStore, RevalidationSink,
    StockAdjustmentService, StockStore, TracingRevalidationSink,
};
use stockroom_inventory::LowStockThresholds;

pub mod dto;
pub mod errors;
pub mod routes;

/// Store-erased services shared by all request handlers.
pub struct AppServices {
    adjustments: StockAdjustmentService<Arc<dyn StockStore>, Arc<dyn RevalidationSink>>,
    queries: InventoryQueryService<Arc<dyn StockStore>>,
}

impl AppServices {
    pub fn new(
        store: Arc<dyn StockStore>,
        sink: Arc<dyn RevalidationSink>,
        thresholds: LowStockThresholds,
    ) -> Self {
        Self {
            adjustments: StockAdjustmentService::new(store.clone(), sink),
            queries: InventoryQueryService::new(store, thresholds),
        }
    }

    pub fn adjustments(
        &self,
    ) -> &StockAdjustmentService<Arc<dyn StockStore>, Arc<dyn RevalidationSink>> {
        &self.adjustments
    }

    pub fn queries(&self) -> &InventoryQueryService<Arc<dyn StockStore>> {
        &self.queries
    }
}

/// Build the application with env-driven storage.
///
/// With `DATABASE_URL` set, stock lives in Postgres; otherwise an in-memory
/// store backs the app (dev only; state dies with the process).
pub async fn build_app() -> Router {
    let store: Arc<dyn StockStore> = match std::env::var("DATABASE_URL") {
        Ok(database_url) => {
            let pool = PgPool::connect(&database_url)
                .await
                .expect("failed to connect to Postgres");
            Arc::new(PostgresStockStore::new(pool))
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set; using in-memory stock store");
            Arc::new(InMemoryStockStore::new())
        }
    };

    build_app_with_store(store, Arc::new(TracingRevalidationSink))
}

/// Build the application over an explicit store and revalidation sink.
///
/// This is the seam the black-box tests use to seed state.
pub fn build_app_with_store(
    store: Arc<dyn StockStore>,
    sink: Arc<dyn RevalidationSink>,
) -> Router {
    let services = Arc::new(AppServices::new(
        store,
        sink,
        LowStockThresholds::default(),
    ));

    routes::router().layer(ServiceBuilder::new().layer(Extension(services)))
}
