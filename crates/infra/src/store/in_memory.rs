//! In-memory stock store for tests/dev.
//!
//! Mirrors the Postgres store's semantics: the write lock is held across the
//! whole read-modify-write of an adjustment, so concurrent adjustments to the
//! same unit serialize and the non-negativity check never acts on a stale
//! read.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use stockroom_core::{MovementId, PageInfo, PageRequest, ProductId, VariantId};
use stockroom_inventory::{
    AdjustStock, InventoryFilter, LowStockThresholds, StockItem, StockMovement,
};

use super::{AppliedAdjustment, HistoryQuery, InventoryPage, StockStore, StoreError};

#[derive(Debug, Clone)]
struct ProductRecord {
    name: String,
    sku: String,
    stock: Option<i64>,
    is_active: bool,
}

#[derive(Debug, Clone)]
struct VariantRecord {
    product_id: ProductId,
    sku: String,
    stock: Option<i64>,
    is_active: bool,
}

#[derive(Debug, Default)]
struct Inner {
    products: HashMap<ProductId, ProductRecord>,
    variants: HashMap<VariantId, VariantRecord>,
    movements: Vec<StockMovement>,
}

/// In-memory stock store.
#[derive(Debug, Default)]
pub struct InMemoryStockStore {
    inner: RwLock<Inner>,
}

impl InMemoryStockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a product row. Overwrites any previous record with the same id.
    pub fn insert_product(
        &self,
        product_id: ProductId,
        name: &str,
        sku: &str,
        stock: Option<i64>,
        is_active: bool,
    ) {
        if let Ok(mut inner) = self.inner.write() {
            inner.products.insert(
                product_id,
                ProductRecord {
                    name: name.to_string(),
                    sku: sku.to_string(),
                    stock,
                    is_active,
                },
            );
        }
    }

    /// Seed a variant row. The owning product must already exist.
    pub fn insert_variant(
        &self,
        variant_id: VariantId,
        product_id: ProductId,
        sku: &str,
        stock: Option<i64>,
        is_active: bool,
    ) -> Result<(), StoreError> {
        let mut inner = lock_write(&self.inner)?;
        if !inner.products.contains_key(&product_id) {
            return Err(StoreError::NotFound);
        }
        inner.variants.insert(
            variant_id,
            VariantRecord {
                product_id,
                sku: sku.to_string(),
                stock,
                is_active,
            },
        );
        Ok(())
    }

    fn stock_units(inner: &Inner) -> Vec<StockItem> {
        let mut units: Vec<StockItem> = Vec::new();

        for (product_id, product) in &inner.products {
            let has_variants = inner
                .variants
                .values()
                .any(|v| v.product_id == *product_id);
            if has_variants {
                continue;
            }
            units.push(StockItem {
                product_id: *product_id,
                variant_id: None,
                name: product.name.clone(),
                sku: product.sku.clone(),
                stock: product.stock,
                is_active: product.is_active,
            });
        }

        for (variant_id, variant) in &inner.variants {
            let Some(product) = inner.products.get(&variant.product_id) else {
                continue;
            };
            units.push(StockItem {
                product_id: variant.product_id,
                variant_id: Some(*variant_id),
                name: product.name.clone(),
                sku: variant.sku.clone(),
                stock: variant.stock,
                is_active: variant.is_active,
            });
        }

        // Same ordering as the Postgres overview query.
        units.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then(a.product_id.cmp(&b.product_id))
                .then(a.variant_id.cmp(&b.variant_id))
        });
        units
    }
}

fn lock_write<'a>(
    lock: &'a RwLock<Inner>,
) -> Result<std::sync::RwLockWriteGuard<'a, Inner>, StoreError> {
    lock.write()
        .map_err(|_| StoreError::persistence("lock", "store lock poisoned"))
}

fn lock_read<'a>(
    lock: &'a RwLock<Inner>,
) -> Result<std::sync::RwLockReadGuard<'a, Inner>, StoreError> {
    lock.read()
        .map_err(|_| StoreError::persistence("lock", "store lock poisoned"))
}

#[async_trait]
impl StockStore for InMemoryStockStore {
    async fn apply_adjustment(
        &self,
        adjustment: &AdjustStock,
    ) -> Result<AppliedAdjustment, StoreError> {
        // Single write lock across load, compute, and both writes.
        let mut inner = lock_write(&self.inner)?;

        let item = match adjustment.variant_id {
            Some(variant_id) => {
                let variant = inner
                    .variants
                    .get(&variant_id)
                    .filter(|v| v.product_id == adjustment.product_id)
                    .ok_or(StoreError::NotFound)?;
                let product = inner
                    .products
                    .get(&variant.product_id)
                    .ok_or(StoreError::NotFound)?;
                StockItem {
                    product_id: adjustment.product_id,
                    variant_id: Some(variant_id),
                    name: product.name.clone(),
                    sku: variant.sku.clone(),
                    stock: variant.stock,
                    is_active: variant.is_active,
                }
            }
            None => {
                let product = inner
                    .products
                    .get(&adjustment.product_id)
                    .ok_or(StoreError::NotFound)?;
                StockItem {
                    product_id: adjustment.product_id,
                    variant_id: None,
                    name: product.name.clone(),
                    sku: product.sku.clone(),
                    stock: product.stock,
                    is_active: product.is_active,
                }
            }
        };

        let new_stock = adjustment.resulting_stock(item.stock)?;

        match adjustment.variant_id {
            Some(variant_id) => {
                if let Some(variant) = inner.variants.get_mut(&variant_id) {
                    variant.stock = Some(new_stock);
                }
            }
            None => {
                if let Some(product) = inner.products.get_mut(&adjustment.product_id) {
                    product.stock = Some(new_stock);
                }
            }
        }

        let movement = StockMovement {
            id: MovementId::new(),
            product_id: adjustment.product_id,
            variant_id: adjustment.variant_id,
            movement_type: adjustment.movement_type,
            quantity: adjustment.quantity,
            reason: adjustment.reason.clone(),
            created_at: Utc::now(),
        };
        inner.movements.push(movement.clone());

        let mut item = item;
        item.stock = Some(new_stock);
        Ok(AppliedAdjustment { item, movement })
    }

    async fn fetch_overview(
        &self,
        filter: &InventoryFilter,
        page: PageRequest,
        thresholds: &LowStockThresholds,
    ) -> Result<InventoryPage, StoreError> {
        let inner = lock_read(&self.inner)?;

        let matching: Vec<StockItem> = Self::stock_units(&inner)
            .into_iter()
            .filter(|item| filter.matches(item, thresholds))
            .collect();

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();

        Ok(InventoryPage {
            items,
            page_info: PageInfo::compute(page, total),
        })
    }

    async fn fetch_history(&self, query: &HistoryQuery) -> Result<Vec<StockMovement>, StoreError> {
        let inner = lock_read(&self.inner)?;

        // Movements are appended in chronological order; walk them backwards
        // for newest-first.
        let movements = inner
            .movements
            .iter()
            .rev()
            .filter(|m| {
                query
                    .product_id
                    .is_none_or(|product_id| m.product_id == product_id)
                    && query
                        .variant_id
                        .is_none_or(|variant_id| m.variant_id == Some(variant_id))
            })
            .take(query.effective_limit() as usize)
            .cloned()
            .collect();

        Ok(movements)
    }
}
