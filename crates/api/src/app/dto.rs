use serde::Deserialize;
use serde_json::json;

use stockroom_infra::AppliedAdjustment;
use stockroom_inventory::{AdjustStockRequest, StockItem, StockLevel, StockMovement};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct AdjustStockBody {
    pub product_id: String,
    #[serde(default)]
    pub variant_id: Option<String>,
    #[serde(rename = "type")]
    pub movement_type: String,
    pub quantity: i64,
    #[serde(default)]
    pub reason: Option<String>,
}

impl AdjustStockBody {
    pub fn into_request(self) -> AdjustStockRequest {
        AdjustStockRequest {
            product_id: self.product_id,
            variant_id: self.variant_id,
            movement_type: self.movement_type,
            quantity: self.quantity,
            reason: self.reason,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BulkAdjustBody {
    pub adjustments: Vec<AdjustStockBody>,
}

#[derive(Debug, Deserialize)]
pub struct OverviewParams {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub stock_level: Option<String>,
    #[serde(default)]
    pub product_type: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub variant_id: Option<String>,
    #[serde(default)]
    pub limit: Option<u32>,
}

// -------------------------
// Response shaping
// -------------------------

pub fn stock_item_to_json(item: &StockItem, level: StockLevel) -> serde_json::Value {
    json!({
        "product_id": item.product_id,
        "variant_id": item.variant_id,
        "name": item.name,
        "sku": item.sku,
        "stock": item.stock,
        "is_active": item.is_active,
        "product_type": item.kind().as_str(),
        "stock_level": level.as_str(),
    })
}

pub fn movement_to_json(movement: &StockMovement) -> serde_json::Value {
    json!({
        "id": movement.id,
        "product_id": movement.product_id,
        "variant_id": movement.variant_id,
        "type": movement.movement_type.as_str(),
        "quantity": movement.quantity,
        "reason": movement.reason,
        "created_at": movement.created_at,
    })
}

pub fn applied_to_json(applied: &AppliedAdjustment, level: StockLevel) -> serde_json::Value {
    json!({
        "item": stock_item_to_json(&applied.item, level),
        "movement": movement_to_json(&applied.movement),
    })
}
