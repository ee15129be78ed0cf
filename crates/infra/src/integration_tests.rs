//! Integration tests for the full adjustment/query pipeline.
//!
//! Tests: request → validation → StockStore (atomic read-modify-write) →
//! movement ledger → revalidation sink → query service.
//!
//! Runs against the in-memory store, which mirrors the Postgres store's
//! semantics.

use std::sync::Arc;

use stockroom_core::{DomainError, PageRequest, ProductId, VariantId};
use stockroom_inventory::{
    AdjustStockRequest, InventoryFilter, LowStockThresholds, ProductTypeFilter, StockLevelFilter,
};

use crate::query::InventoryQueryService;
use crate::service::{RecordingRevalidationSink, StockAdjustmentService};
use crate::store::{HistoryQuery, InMemoryStockStore, StoreError};

struct Fixture {
    store: Arc<InMemoryStockStore>,
    sink: Arc<RecordingRevalidationSink>,
    adjustments: StockAdjustmentService<Arc<InMemoryStockStore>, Arc<RecordingRevalidationSink>>,
    queries: InventoryQueryService<Arc<InMemoryStockStore>>,
}

fn setup() -> Fixture {
    let store = Arc::new(InMemoryStockStore::new());
    let sink = Arc::new(RecordingRevalidationSink::new());
    let adjustments = StockAdjustmentService::new(store.clone(), sink.clone());
    let queries = InventoryQueryService::new(store.clone(), LowStockThresholds::default());
    Fixture {
        store,
        sink,
        adjustments,
        queries,
    }
}

fn request(product_id: ProductId, movement_type: &str, quantity: i64) -> AdjustStockRequest {
    AdjustStockRequest {
        product_id: product_id.to_string(),
        variant_id: None,
        movement_type: movement_type.to_string(),
        quantity,
        reason: None,
    }
}

#[tokio::test]
async fn inbound_adjustment_raises_stock_and_records_movement() {
    let fx = setup();
    let product_id = ProductId::new();
    fx.store.insert_product(product_id, "Mug", "MUG", Some(5), true);

    let applied = fx
        .adjustments
        .adjust_stock(&request(product_id, "in", 3))
        .await
        .unwrap();

    assert_eq!(applied.item.stock, Some(8));
    assert_eq!(applied.movement.quantity, 3);
    assert_eq!(applied.movement.movement_type.as_str(), "in");

    let history = fx
        .queries
        .history(&HistoryQuery {
            product_id: Some(product_id),
            ..HistoryQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, applied.movement.id);
}

#[tokio::test]
async fn outbound_beyond_stock_is_rejected_without_a_ledger_entry() {
    let fx = setup();
    let product_id = ProductId::new();
    fx.store.insert_product(product_id, "Mug", "MUG", Some(3), true);

    let err = fx
        .adjustments
        .adjust_stock(&request(product_id, "out", 7))
        .await
        .unwrap_err();
    match err {
        StoreError::Domain(DomainError::InsufficientStock {
            available,
            requested,
        }) => {
            assert_eq!(available, 3);
            assert_eq!(requested, 7);
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }

    // Stock unchanged, nothing in the ledger, no revalidation signal.
    let history = fx.queries.history(&HistoryQuery::default()).await.unwrap();
    assert!(history.is_empty());
    assert!(fx.sink.invalidated().is_empty());

    let page = fx
        .queries
        .overview(&InventoryFilter::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.items[0].stock, Some(3));
}

#[tokio::test]
async fn direct_correction_to_exactly_zero_succeeds() {
    let fx = setup();
    let product_id = ProductId::new();
    fx.store.insert_product(product_id, "Mug", "MUG", Some(3), true);

    let applied = fx
        .adjustments
        .adjust_stock(&request(product_id, "adjust", -3))
        .await
        .unwrap();
    assert_eq!(applied.item.stock, Some(0));
    assert_eq!(applied.movement.quantity, -3);
}

#[tokio::test]
async fn validation_failure_never_reaches_the_store() {
    let fx = setup();
    let product_id = ProductId::new();
    fx.store.insert_product(product_id, "Mug", "MUG", Some(3), true);

    let err = fx
        .adjustments
        .adjust_stock(&request(product_id, "in", 0))
        .await
        .unwrap_err();
    match err {
        StoreError::Domain(DomainError::Validation(msg)) => {
            assert!(msg.contains("quantity"));
        }
        other => panic!("expected Validation, got {other:?}"),
    }

    let history = fx.queries.history(&HistoryQuery::default()).await.unwrap();
    assert!(history.is_empty());
}

#[tokio::test]
async fn unknown_product_and_mismatched_variant_are_not_found() {
    let fx = setup();
    let product_id = ProductId::new();
    let other_product = ProductId::new();
    let variant_id = VariantId::new();
    fx.store.insert_product(product_id, "Shirt", "SH", Some(3), true);
    fx.store.insert_product(other_product, "Hat", "HT", None, true);
    fx.store
        .insert_variant(variant_id, product_id, "SH-M", Some(3), true)
        .unwrap();

    let err = fx
        .adjustments
        .adjust_stock(&request(ProductId::new(), "in", 1))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound));

    // Variant exists but belongs to a different product.
    let mismatched = AdjustStockRequest {
        product_id: other_product.to_string(),
        variant_id: Some(variant_id.to_string()),
        movement_type: "in".to_string(),
        quantity: 1,
        reason: None,
    };
    let err = fx.adjustments.adjust_stock(&mismatched).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound));
}

#[tokio::test]
async fn adjusting_untracked_stock_starts_tracking_at_zero() {
    let fx = setup();
    let product_id = ProductId::new();
    fx.store.insert_product(product_id, "Gift Card", "GC", None, true);

    let applied = fx
        .adjustments
        .adjust_stock(&request(product_id, "in", 4))
        .await
        .unwrap();
    assert_eq!(applied.item.stock, Some(4));
}

#[tokio::test]
async fn bulk_adjustment_is_best_effort() {
    let fx = setup();
    let first = ProductId::new();
    let second = ProductId::new();
    fx.store.insert_product(first, "Mug", "MUG", Some(5), true);
    fx.store.insert_product(second, "Plate", "PLT", Some(5), true);

    let batch = vec![
        request(first, "in", 2),
        request(second, "in", 0), // invalid: zero quantity
        request(second, "out", 1),
    ];
    let outcome = fx.adjustments.bulk_adjust_stock(&batch).await;

    assert_eq!(outcome.succeeded, 2);
    assert_eq!(outcome.failed, 1);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].index, 1);

    // Both valid changes persisted despite the failure between them.
    let page = fx
        .queries
        .overview(&InventoryFilter::default(), PageRequest::default())
        .await
        .unwrap();
    let stock_of = |id: ProductId| {
        page.items
            .iter()
            .find(|i| i.product_id == id)
            .and_then(|i| i.stock)
    };
    assert_eq!(stock_of(first), Some(7));
    assert_eq!(stock_of(second), Some(4));

    // One revalidation signal per successful item.
    assert_eq!(fx.sink.invalidated(), vec![first, second]);
}

#[tokio::test]
async fn overview_paginates_from_the_full_filtered_count() {
    let fx = setup();
    for i in 0..25 {
        fx.store.insert_product(
            ProductId::new(),
            &format!("Widget {i:02}"),
            &format!("W-{i:02}"),
            Some(20),
            true,
        );
    }

    let page = fx
        .queries
        .overview(&InventoryFilter::default(), PageRequest::new(2, 20))
        .await
        .unwrap();

    assert_eq!(page.items.len(), 5);
    assert_eq!(page.page_info.total, 25);
    assert_eq!(page.page_info.total_pages, 2);
    assert_eq!(page.page_info.page, 2);
}

#[tokio::test]
async fn overview_low_stock_facet_uses_per_kind_thresholds() {
    let fx = setup();
    let simple_low = ProductId::new();
    let simple_borderline = ProductId::new();
    let parent = ProductId::new();
    let variant_low = VariantId::new();
    let variant_fine = VariantId::new();

    fx.store
        .insert_product(simple_low, "Simple Low", "S-3", Some(3), true);
    fx.store
        .insert_product(simple_borderline, "Simple Borderline", "S-7", Some(7), true);
    fx.store.insert_product(parent, "Parent", "", Some(0), true);
    fx.store
        .insert_variant(variant_low, parent, "V-3", Some(3), true)
        .unwrap();
    fx.store
        .insert_variant(variant_fine, parent, "V-7", Some(7), true)
        .unwrap();

    let low = fx
        .queries
        .overview(
            &InventoryFilter {
                stock_level: StockLevelFilter::LowStock,
                ..InventoryFilter::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    let low_skus: Vec<&str> = low.items.iter().map(|i| i.sku.as_str()).collect();
    // Stock 7 is low for a simple product (threshold 10) but not for a
    // variant (threshold 5); stock 3 is low for both. Ordering is by
    // product name ("Parent" sorts before "Simple ...").
    assert_eq!(low_skus, vec!["V-3", "S-7", "S-3"]);

    let in_stock = fx
        .queries
        .overview(
            &InventoryFilter {
                stock_level: StockLevelFilter::InStock,
                product_type: ProductTypeFilter::Variant,
                ..InventoryFilter::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    let in_skus: Vec<&str> = in_stock.items.iter().map(|i| i.sku.as_str()).collect();
    assert_eq!(in_skus, vec!["V-7"]);
}

#[tokio::test]
async fn overview_search_and_facets_combine_with_and_semantics() {
    let fx = setup();
    let shirt = ProductId::new();
    let mug = ProductId::new();
    fx.store
        .insert_product(shirt, "Linen Shirt", "LS-1", Some(2), true);
    fx.store.insert_product(mug, "Mug", "MUG-1", Some(2), true);

    let page = fx
        .queries
        .overview(
            &InventoryFilter {
                search: Some("shirt".to_string()),
                stock_level: StockLevelFilter::LowStock,
                product_type: ProductTypeFilter::Simple,
            },
            PageRequest::default(),
        )
        .await
        .unwrap();

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].product_id, shirt);
}

#[tokio::test]
async fn history_is_newest_first_and_scopes_to_product_or_variant() {
    let fx = setup();
    let product_id = ProductId::new();
    let other = ProductId::new();
    let variant_id = VariantId::new();
    fx.store.insert_product(product_id, "Shirt", "SH", Some(0), true);
    fx.store.insert_product(other, "Mug", "MUG", Some(0), true);
    fx.store
        .insert_variant(variant_id, product_id, "SH-M", Some(0), true)
        .unwrap();

    fx.adjustments
        .adjust_stock(&request(other, "in", 1))
        .await
        .unwrap();
    let on_variant = AdjustStockRequest {
        product_id: product_id.to_string(),
        variant_id: Some(variant_id.to_string()),
        movement_type: "in".to_string(),
        quantity: 2,
        reason: Some("restock".to_string()),
    };
    fx.adjustments.adjust_stock(&on_variant).await.unwrap();
    fx.adjustments
        .adjust_stock(&request(other, "in", 3))
        .await
        .unwrap();

    let all = fx.queries.history(&HistoryQuery::default()).await.unwrap();
    let quantities: Vec<i64> = all.iter().map(|m| m.quantity).collect();
    assert_eq!(quantities, vec![3, 2, 1]);

    let scoped = fx
        .queries
        .history(&HistoryQuery {
            variant_id: Some(variant_id),
            ..HistoryQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(scoped.len(), 1);
    assert_eq!(scoped[0].quantity, 2);
    assert_eq!(scoped[0].reason.as_deref(), Some("restock"));

    let limited = fx
        .queries
        .history(&HistoryQuery {
            limit: Some(2),
            ..HistoryQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(limited.len(), 2);
}

#[tokio::test]
async fn product_with_variants_is_not_listed_as_a_simple_unit() {
    let fx = setup();
    let parent = ProductId::new();
    let variant_id = VariantId::new();
    fx.store.insert_product(parent, "Shirt", "SH", None, true);
    fx.store
        .insert_variant(variant_id, parent, "SH-M", Some(4), true)
        .unwrap();

    let page = fx
        .queries
        .overview(&InventoryFilter::default(), PageRequest::default())
        .await
        .unwrap();

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].variant_id, Some(variant_id));
}
