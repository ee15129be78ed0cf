//! Postgres-backed stock store implementation.
//!
//! This module persists stock levels on the `products` / `product_variants`
//! tables and the movement ledger in `stock_movements`. The adjustment path
//! is a single transaction: the targeted row is locked with
//! `SELECT ... FOR UPDATE`, the new level is computed, and the stock update
//! plus the ledger insert commit together. Two concurrent adjustments to the
//! same unit therefore serialize on the row lock and can never interleave
//! their read and write halves.
//!
//! ## Expected schema
//!
//! - `products(id uuid pk, name text, sku text, stock bigint null,
//!   is_active bool, updated_at timestamptz)`
//! - `product_variants(id uuid pk, product_id uuid fk, sku text,
//!   stock bigint null, is_active bool, updated_at timestamptz)`
//! - `stock_movements(id uuid pk, product_id uuid fk, variant_id uuid null,
//!   movement_type text, quantity bigint, reason text null,
//!   created_at timestamptz)`; append-only, never updated or deleted.
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to `StoreError` as follows:
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError | Scenario |
//! |------------|----------------------|------------|----------|
//! | Database (foreign key violation) | `23503` | `NotFound` | Product/variant deleted between lock and ledger insert |
//! | Database (check constraint violation) | `23514` | `Persistence` | Schema-level stock check rejected a write |
//! | Database (unique violation) | `23505` | `Persistence` | Duplicate movement id (should not occur; ids are UUIDv7) |
//! | Database (other) | Any other | `Persistence` | Other database errors |
//! | PoolClosed | N/A | `Persistence` | Connection pool was closed |
//! | RowNotFound | N/A | `Persistence` | Unexpected row not found (queries use fetch_optional/fetch_all) |
//! | Other | N/A | `Persistence` | Network errors, connection failures, etc. |
//!
//! ## Thread Safety
//!
//! `PostgresStockStore` is `Send + Sync` and can be shared across threads.
//! All operations use the SQLx connection pool which handles thread-safe
//! connection management.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Row, Transaction};
use tracing::instrument;

use stockroom_core::{MovementId, PageInfo, PageRequest, ProductId, VariantId};
use stockroom_inventory::{
    AdjustStock, InventoryFilter, LowStockThresholds, MovementType, StockItem, StockMovement,
};

use super::{AppliedAdjustment, HistoryQuery, InventoryPage, StockStore, StoreError};

/// Postgres-backed stock store.
#[derive(Debug, Clone)]
pub struct PostgresStockStore {
    pool: Arc<PgPool>,
}

impl PostgresStockStore {
    /// Create a new PostgresStockStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Lock and load the targeted stock-keeping unit inside `tx`.
    ///
    /// Returns `NotFound` if the product does not exist, or if a variant id
    /// is given that does not belong to the product.
    async fn lock_stock_item(
        tx: &mut Transaction<'_, Postgres>,
        product_id: ProductId,
        variant_id: Option<VariantId>,
    ) -> Result<StockItem, StoreError> {
        let row = match variant_id {
            Some(variant_id) => sqlx::query(
                r#"
                SELECT
                    v.product_id,
                    v.id AS variant_id,
                    p.name,
                    v.sku,
                    v.stock,
                    v.is_active
                FROM product_variants v
                JOIN products p ON p.id = v.product_id
                WHERE v.product_id = $1 AND v.id = $2
                FOR UPDATE OF v
                "#,
            )
            .bind(product_id.as_uuid())
            .bind(variant_id.as_uuid())
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error("lock_stock_item", e))?,
            None => sqlx::query(
                r#"
                SELECT
                    p.id AS product_id,
                    NULL::uuid AS variant_id,
                    p.name,
                    p.sku,
                    p.stock,
                    p.is_active
                FROM products p
                WHERE p.id = $1
                FOR UPDATE
                "#,
            )
            .bind(product_id.as_uuid())
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error("lock_stock_item", e))?,
        };

        let row = row.ok_or(StoreError::NotFound)?;
        let unit = StockUnitRow::from_row(&row).map_err(|e| {
            StoreError::persistence(
                "lock_stock_item",
                format!("failed to decode stock unit row: {e}"),
            )
        })?;
        Ok(unit.into())
    }
}

#[async_trait]
impl StockStore for PostgresStockStore {
    #[instrument(
        skip(self, adjustment),
        fields(
            product_id = %adjustment.product_id,
            variant_id = ?adjustment.variant_id,
            movement_type = %adjustment.movement_type,
            quantity = adjustment.quantity,
        ),
        err
    )]
    async fn apply_adjustment(
        &self,
        adjustment: &AdjustStock,
    ) -> Result<AppliedAdjustment, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let mut item =
            Self::lock_stock_item(&mut tx, adjustment.product_id, adjustment.variant_id).await?;

        let new_stock = match adjustment.resulting_stock(item.stock) {
            Ok(v) => v,
            Err(domain) => {
                tx.rollback()
                    .await
                    .map_err(|e| map_sqlx_error("rollback", e))?;
                return Err(StoreError::Domain(domain));
            }
        };

        match adjustment.variant_id {
            Some(variant_id) => {
                sqlx::query(
                    r#"
                    UPDATE product_variants
                    SET stock = $2, updated_at = NOW()
                    WHERE id = $1
                    "#,
                )
                .bind(variant_id.as_uuid())
                .bind(new_stock)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("update_variant_stock", e))?;
            }
            None => {
                sqlx::query(
                    r#"
                    UPDATE products
                    SET stock = $2, updated_at = NOW()
                    WHERE id = $1
                    "#,
                )
                .bind(adjustment.product_id.as_uuid())
                .bind(new_stock)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("update_product_stock", e))?;
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

        sqlx::query(
            r#"
            INSERT INTO stock_movements (
                id,
                product_id,
                variant_id,
                movement_type,
                quantity,
                reason,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(movement.id.as_uuid())
        .bind(movement.product_id.as_uuid())
        .bind(movement.variant_id.as_ref().map(|v| *v.as_uuid()))
        .bind(movement.movement_type.as_str())
        .bind(movement.quantity)
        .bind(&movement.reason)
        .bind(movement.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_movement", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        item.stock = Some(new_stock);
        Ok(AppliedAdjustment { item, movement })
    }

    #[instrument(skip(self, filter, thresholds), fields(page = page.page(), limit = page.limit()), err)]
    async fn fetch_overview(
        &self,
        filter: &InventoryFilter,
        page: PageRequest,
        thresholds: &LowStockThresholds,
    ) -> Result<InventoryPage, StoreError> {
        let search = filter.search.as_deref().unwrap_or("").trim().to_string();
        let stock_level = filter.stock_level.as_str();
        let product_type = filter.product_type.as_str();

        // Same unit set and predicates as the page query below; only the
        // projection differs. Keep the two in sync.
        let total: i64 = sqlx::query_scalar(
            r#"
            WITH stock_units AS (
                SELECT p.id AS product_id, NULL::uuid AS variant_id,
                       p.name, p.sku, p.stock, p.is_active, 'simple' AS kind
                FROM products p
                WHERE NOT EXISTS (
                    SELECT 1 FROM product_variants v WHERE v.product_id = p.id
                )
                UNION ALL
                SELECT v.product_id, v.id AS variant_id,
                       p.name, v.sku, v.stock, v.is_active, 'variant' AS kind
                FROM product_variants v
                JOIN products p ON p.id = v.product_id
            )
            SELECT COUNT(*)
            FROM stock_units
            WHERE ($1 = '' OR name ILIKE '%' || $1 || '%' OR sku ILIKE '%' || $1 || '%')
              AND ($2 = 'all' OR kind = $2)
              AND (
                  $3 = 'all'
                  OR ($3 = 'out-of-stock' AND stock = 0)
                  OR ($3 = 'low-stock' AND stock > 0
                      AND stock < CASE kind WHEN 'simple' THEN $4 ELSE $5 END)
                  OR ($3 = 'in-stock'
                      AND stock >= CASE kind WHEN 'simple' THEN $4 ELSE $5 END)
              )
            "#,
        )
        .bind(&search)
        .bind(product_type)
        .bind(stock_level)
        .bind(thresholds.simple)
        .bind(thresholds.variant)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("count_overview", e))?;

        let rows = sqlx::query(
            r#"
            WITH stock_units AS (
                SELECT p.id AS product_id, NULL::uuid AS variant_id,
                       p.name, p.sku, p.stock, p.is_active, 'simple' AS kind
                FROM products p
                WHERE NOT EXISTS (
                    SELECT 1 FROM product_variants v WHERE v.product_id = p.id
                )
                UNION ALL
                SELECT v.product_id, v.id AS variant_id,
                       p.name, v.sku, v.stock, v.is_active, 'variant' AS kind
                FROM product_variants v
                JOIN products p ON p.id = v.product_id
            )
            SELECT product_id, variant_id, name, sku, stock, is_active
            FROM stock_units
            WHERE ($1 = '' OR name ILIKE '%' || $1 || '%' OR sku ILIKE '%' || $1 || '%')
              AND ($2 = 'all' OR kind = $2)
              AND (
                  $3 = 'all'
                  OR ($3 = 'out-of-stock' AND stock = 0)
                  OR ($3 = 'low-stock' AND stock > 0
                      AND stock < CASE kind WHEN 'simple' THEN $4 ELSE $5 END)
                  OR ($3 = 'in-stock'
                      AND stock >= CASE kind WHEN 'simple' THEN $4 ELSE $5 END)
              )
            ORDER BY name ASC, product_id ASC, variant_id ASC NULLS FIRST
            LIMIT $6 OFFSET $7
            "#,
        )
        .bind(&search)
        .bind(product_type)
        .bind(stock_level)
        .bind(thresholds.simple)
        .bind(thresholds.variant)
        .bind(i64::from(page.limit()))
        .bind(page.offset() as i64)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("fetch_overview", e))?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let unit = StockUnitRow::from_row(&row).map_err(|e| {
                StoreError::persistence(
                    "fetch_overview",
                    format!("failed to decode stock unit row: {e}"),
                )
            })?;
            items.push(unit.into());
        }

        Ok(InventoryPage {
            items,
            page_info: PageInfo::compute(page, total.max(0) as u64),
        })
    }

    #[instrument(skip(self, query), fields(limit = query.effective_limit()), err)]
    async fn fetch_history(&self, query: &HistoryQuery) -> Result<Vec<StockMovement>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT
                id,
                product_id,
                variant_id,
                movement_type,
                quantity,
                reason,
                created_at
            FROM stock_movements
            WHERE ($1::uuid IS NULL OR product_id = $1)
              AND ($2::uuid IS NULL OR variant_id = $2)
            ORDER BY created_at DESC
            LIMIT $3
            "#,
        )
        .bind(query.product_id.as_ref().map(|p| *p.as_uuid()))
        .bind(query.variant_id.as_ref().map(|v| *v.as_uuid()))
        .bind(i64::from(query.effective_limit()))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("fetch_history", e))?;

        let mut movements = Vec::with_capacity(rows.len());
        for row in rows {
            let movement = MovementRow::from_row(&row).map_err(|e| {
                StoreError::persistence(
                    "fetch_history",
                    format!("failed to decode movement row: {e}"),
                )
            })?;
            movements.push(movement.try_into()?);
        }

        Ok(movements)
    }
}

/// Map SQLx errors to StoreError (see the table in the module docs).
fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let message = format!("database error: {}", db_err.message());
            match db_err.code().as_deref() {
                // Foreign key violation: the referenced product/variant
                // disappeared before the ledger insert landed.
                Some("23503") => StoreError::NotFound,
                _ => StoreError::persistence(operation, message),
            }
        }
        sqlx::Error::PoolClosed => StoreError::persistence(operation, "connection pool closed"),
        sqlx::Error::RowNotFound => StoreError::persistence(operation, "unexpected row not found"),
        other => StoreError::persistence(operation, other.to_string()),
    }
}

// SQLx row types

#[derive(Debug)]
struct StockUnitRow {
    product_id: uuid::Uuid,
    variant_id: Option<uuid::Uuid>,
    name: String,
    sku: String,
    stock: Option<i64>,
    is_active: bool,
}

impl<'r> FromRow<'r, sqlx::postgres::PgRow> for StockUnitRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(StockUnitRow {
            product_id: row.try_get("product_id")?,
            variant_id: row.try_get("variant_id")?,
            name: row.try_get("name")?,
            sku: row.try_get("sku")?,
            stock: row.try_get("stock")?,
            is_active: row.try_get("is_active")?,
        })
    }
}

impl From<StockUnitRow> for StockItem {
    fn from(row: StockUnitRow) -> Self {
        StockItem {
            product_id: ProductId::from_uuid(row.product_id),
            variant_id: row.variant_id.map(VariantId::from_uuid),
            name: row.name,
            sku: row.sku,
            stock: row.stock,
            is_active: row.is_active,
        }
    }
}

#[derive(Debug)]
struct MovementRow {
    id: uuid::Uuid,
    product_id: uuid::Uuid,
    variant_id: Option<uuid::Uuid>,
    movement_type: String,
    quantity: i64,
    reason: Option<String>,
    created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, sqlx::postgres::PgRow> for MovementRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(MovementRow {
            id: row.try_get("id")?,
            product_id: row.try_get("product_id")?,
            variant_id: row.try_get("variant_id")?,
            movement_type: row.try_get("movement_type")?,
            quantity: row.try_get("quantity")?,
            reason: row.try_get("reason")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl TryFrom<MovementRow> for StockMovement {
    type Error = StoreError;

    fn try_from(row: MovementRow) -> Result<Self, Self::Error> {
        let movement_type: MovementType = row.movement_type.parse().map_err(|_| {
            StoreError::persistence(
                "decode_movement",
                format!("unknown movement_type \"{}\" in ledger", row.movement_type),
            )
        })?;
        Ok(StockMovement {
            id: MovementId::from_uuid(row.id),
            product_id: ProductId::from_uuid(row.product_id),
            variant_id: row.variant_id.map(VariantId::from_uuid),
            movement_type,
            quantity: row.quantity,
            reason: row.reason,
            created_at: row.created_at,
        })
    }
}
