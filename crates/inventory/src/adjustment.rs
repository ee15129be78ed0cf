use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, ProductId, VariantId};

use crate::movement::MovementType;

/// Longest accepted free-text reason on an adjustment.
pub const MAX_REASON_LEN: usize = 100;

/// Raw adjustment input as received from the admin action layer.
///
/// Identifiers arrive as caller-supplied strings and are only validated as
/// UUID-shaped here; this layer does not mint them. Use [`validate`] to turn
/// the request into a typed [`AdjustStock`] command.
///
/// [`validate`]: AdjustStockRequest::validate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustStockRequest {
    pub product_id: String,
    pub variant_id: Option<String>,
    #[serde(rename = "type")]
    pub movement_type: String,
    pub quantity: i64,
    pub reason: Option<String>,
}

impl AdjustStockRequest {
    /// Validate the request shape.
    ///
    /// All offending fields are reported in one `Validation` error rather
    /// than failing on the first, so the admin form can surface every
    /// problem at once.
    pub fn validate(&self) -> DomainResult<AdjustStock> {
        let mut problems: Vec<String> = Vec::new();

        let product_id = match self.product_id.parse::<ProductId>() {
            Ok(id) => Some(id),
            Err(_) => {
                problems.push("product_id: must be a UUID".to_string());
                None
            }
        };

        let variant_id = match &self.variant_id {
            None => None,
            Some(raw) => match raw.parse::<VariantId>() {
                Ok(id) => Some(Some(id)),
                Err(_) => {
                    problems.push("variant_id: must be a UUID".to_string());
                    None
                }
            },
        };

        let movement_type = match self.movement_type.parse::<MovementType>() {
            Ok(t) => Some(t),
            Err(_) => {
                problems.push(format!(
                    "type: must be one of in, out, adjust (got \"{}\")",
                    self.movement_type
                ));
                None
            }
        };

        if self.quantity == 0 {
            problems.push("quantity: must be non-zero".to_string());
        }

        if let Some(reason) = &self.reason {
            if reason.chars().count() > MAX_REASON_LEN {
                problems.push(format!(
                    "reason: must be at most {MAX_REASON_LEN} characters"
                ));
            }
        }

        if !problems.is_empty() {
            return Err(DomainError::validation(problems.join("; ")));
        }

        let product_id =
            product_id.ok_or_else(|| DomainError::validation("product_id: must be a UUID"))?;
        let movement_type = movement_type
            .ok_or_else(|| DomainError::validation("type: must be one of in, out, adjust"))?;

        Ok(AdjustStock {
            product_id,
            variant_id: variant_id.flatten(),
            movement_type,
            quantity: self.quantity,
            reason: self.reason.clone(),
        })
    }
}

/// A validated stock adjustment command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustStock {
    pub product_id: ProductId,
    pub variant_id: Option<VariantId>,
    pub movement_type: MovementType,
    /// Non-zero. Sign semantics depend on `movement_type`: `in`/`out`
    /// normalize to their direction, `adjust` applies the signed value.
    pub quantity: i64,
    pub reason: Option<String>,
}

impl AdjustStock {
    /// Compute the stock level after applying this adjustment.
    ///
    /// Untracked stock (`None`) is treated as zero and becomes tracked. The
    /// result must never be negative; an adjustment that would drive it below
    /// zero is rejected before anything is persisted.
    pub fn resulting_stock(&self, current: Option<i64>) -> DomainResult<i64> {
        let current = current.unwrap_or(0);
        let next = match self.movement_type {
            MovementType::In => current + self.quantity.abs(),
            MovementType::Out => current - self.quantity.abs(),
            MovementType::Adjust => current + self.quantity,
        };

        if next < 0 {
            return Err(DomainError::insufficient_stock(current, self.quantity));
        }

        Ok(next)
    }
}
