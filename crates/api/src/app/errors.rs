use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use stockroom_core::DomainError;
use stockroom_infra::StoreError;
use stockroom_inventory::{ProductTypeFilter, StockLevelFilter};

/// Convert a store/service error to the uniform JSON error shape.
///
/// Persistence details are logged, never surfaced; the caller gets the
/// generic user-displayable message.
pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    let message = err.user_message();
    match err {
        StoreError::NotFound | StoreError::Domain(DomainError::NotFound) => {
            json_error(StatusCode::NOT_FOUND, "not_found", message)
        }
        StoreError::Domain(DomainError::Validation(_)) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", message)
        }
        StoreError::Domain(DomainError::InvalidId(_)) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_id", message)
        }
        StoreError::Domain(DomainError::InsufficientStock { .. }) => {
            json_error(StatusCode::CONFLICT, "insufficient_stock", message)
        }
        StoreError::Persistence { .. } => {
            tracing::error!(error = %err, "store operation failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", message)
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn parse_stock_level(s: &str) -> Result<StockLevelFilter, axum::response::Response> {
    match s {
        "all" => Ok(StockLevelFilter::All),
        "in-stock" => Ok(StockLevelFilter::InStock),
        "low-stock" => Ok(StockLevelFilter::LowStock),
        "out-of-stock" => Ok(StockLevelFilter::OutOfStock),
        _ => Err(json_error(
            StatusCode::BAD_REQUEST,
            "invalid_stock_level",
            "stock_level must be one of: all, in-stock, low-stock, out-of-stock",
        )),
    }
}

pub fn parse_product_type(s: &str) -> Result<ProductTypeFilter, axum::response::Response> {
    match s {
        "all" => Ok(ProductTypeFilter::All),
        "simple" => Ok(ProductTypeFilter::Simple),
        "variant" => Ok(ProductTypeFilter::Variant),
        _ => Err(json_error(
            StatusCode::BAD_REQUEST,
            "invalid_product_type",
            "product_type must be one of: all, simple, variant",
        )),
    }
}
