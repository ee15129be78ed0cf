use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;

use stockroom_core::{PageRequest, ProductId, VariantId};
use stockroom_infra::HistoryQuery;
use stockroom_inventory::InventoryFilter;

use crate::app::{AppServices, dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(get_overview))
        .route("/adjust", post(adjust_stock))
        .route("/adjust/bulk", post(bulk_adjust_stock))
        .route("/movements", get(get_movements))
}

pub async fn get_overview(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<dto::OverviewParams>,
) -> axum::response::Response {
    let stock_level = match params.stock_level.as_deref() {
        Some(raw) => match errors::parse_stock_level(raw) {
            Ok(v) => v,
            Err(resp) => return resp,
        },
        None => Default::default(),
    };
    let product_type = match params.product_type.as_deref() {
        Some(raw) => match errors::parse_product_type(raw) {
            Ok(v) => v,
            Err(resp) => return resp,
        },
        None => Default::default(),
    };

    let filter = InventoryFilter {
        search: params.search,
        stock_level,
        product_type,
    };
    let page = PageRequest::new(
        params.page.unwrap_or(1),
        params.limit.unwrap_or(stockroom_core::page::DEFAULT_PAGE_LIMIT),
    );

    let result = match services.queries().overview(&filter, page).await {
        Ok(page) => page,
        Err(e) => return errors::store_error_to_response(e),
    };

    let items: Vec<serde_json::Value> = result
        .items
        .iter()
        .map(|item| dto::stock_item_to_json(item, services.queries().classify(item)))
        .collect();

    (
        StatusCode::OK,
        Json(json!({
            "items": items,
            "pagination": result.page_info,
        })),
    )
        .into_response()
}

pub async fn adjust_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::AdjustStockBody>,
) -> axum::response::Response {
    let request = body.into_request();

    let applied = match services.adjustments().adjust_stock(&request).await {
        Ok(applied) => applied,
        Err(e) => return errors::store_error_to_response(e),
    };

    let level = services.queries().classify(&applied.item);
    (StatusCode::OK, Json(dto::applied_to_json(&applied, level))).into_response()
}

pub async fn bulk_adjust_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::BulkAdjustBody>,
) -> axum::response::Response {
    if body.adjustments.is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "adjustments must contain at least one item",
        );
    }

    let requests: Vec<_> = body
        .adjustments
        .into_iter()
        .map(dto::AdjustStockBody::into_request)
        .collect();

    let outcome = services.adjustments().bulk_adjust_stock(&requests).await;

    (StatusCode::OK, Json(json!(outcome))).into_response()
}

pub async fn get_movements(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<dto::HistoryParams>,
) -> axum::response::Response {
    let product_id = match params.product_id.as_deref() {
        Some(raw) => match raw.parse::<ProductId>() {
            Ok(id) => Some(id),
            Err(_) => {
                return errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_id",
                    "product_id must be a UUID",
                );
            }
        },
        None => None,
    };
    let variant_id = match params.variant_id.as_deref() {
        Some(raw) => match raw.parse::<VariantId>() {
            Ok(id) => Some(id),
            Err(_) => {
                return errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_id",
                    "variant_id must be a UUID",
                );
            }
        },
        None => None,
    };

    let query = HistoryQuery {
        product_id,
        variant_id,
        limit: params.limit,
    };

    let movements = match services.queries().history(&query).await {
        Ok(movements) => movements,
        Err(e) => return errors::store_error_to_response(e),
    };

    let movements: Vec<serde_json::Value> = movements.iter().map(dto::movement_to_json).collect();
    (StatusCode::OK, Json(json!({ "movements": movements }))).into_response()
}
