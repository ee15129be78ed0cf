use chrono::{DateTime, Utc};
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, MovementId, ProductId, VariantId};

/// Direction of a stock change.
///
/// `In`/`Out` are directional receipts and removals; `Adjust` is a direct
/// correction whose signed quantity is applied as-is.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    In,
    Out,
    Adjust,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::In => "in",
            MovementType::Out => "out",
            MovementType::Adjust => "adjust",
        }
    }
}

impl FromStr for MovementType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" => Ok(MovementType::In),
            "out" => Ok(MovementType::Out),
            "adjust" => Ok(MovementType::Adjust),
            other => Err(DomainError::validation(format!(
                "type: must be one of in, out, adjust (got \"{other}\")"
            ))),
        }
    }
}

impl core::fmt::Display for MovementType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One append-only ledger entry: the audit trail of a single accepted stock
/// change. Never updated or deleted after insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: MovementId,
    pub product_id: ProductId,
    pub variant_id: Option<VariantId>,
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    /// Quantity exactly as requested (signed; not normalized).
    pub quantity: i64,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}
