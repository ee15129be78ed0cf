use serde::{Deserialize, Serialize};

use stockroom_core::{ProductId, VariantId};

/// Whether a stock-keeping unit is a product sold as-is or one of its
/// variants.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    Simple,
    Variant,
}

impl ProductKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductKind::Simple => "simple",
            ProductKind::Variant => "variant",
        }
    }
}

/// One stock-keeping unit: a product without variants, or one specific
/// variant of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockItem {
    pub product_id: ProductId,
    /// `None` means the product itself is the stock-keeping unit.
    pub variant_id: Option<VariantId>,
    pub name: String,
    /// May be empty.
    pub sku: String,
    /// `None` means stock is not tracked for this unit.
    pub stock: Option<i64>,
    pub is_active: bool,
}

impl StockItem {
    pub fn kind(&self) -> ProductKind {
        if self.variant_id.is_some() {
            ProductKind::Variant
        } else {
            ProductKind::Simple
        }
    }

    pub fn stock_level(&self, thresholds: &LowStockThresholds) -> StockLevel {
        StockLevel::classify(self.stock, self.kind(), thresholds)
    }
}

/// Stock counts below which a unit is flagged for restocking attention.
///
/// The defaults mirror the alerting thresholds used elsewhere in the admin
/// console: simple products restock earlier than individual variants.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowStockThresholds {
    pub simple: i64,
    pub variant: i64,
}

impl LowStockThresholds {
    pub fn for_kind(&self, kind: ProductKind) -> i64 {
        match kind {
            ProductKind::Simple => self.simple,
            ProductKind::Variant => self.variant,
        }
    }
}

impl Default for LowStockThresholds {
    fn default() -> Self {
        Self {
            simple: 10,
            variant: 5,
        }
    }
}

/// Classification of a unit's current stock against its restock threshold.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StockLevel {
    InStock,
    LowStock,
    OutOfStock,
    /// Stock is not tracked for this unit; it belongs to no stock bucket.
    Untracked,
}

impl StockLevel {
    pub fn classify(
        stock: Option<i64>,
        kind: ProductKind,
        thresholds: &LowStockThresholds,
    ) -> StockLevel {
        let Some(stock) = stock else {
            return StockLevel::Untracked;
        };
        if stock <= 0 {
            return StockLevel::OutOfStock;
        }
        if stock < thresholds.for_kind(kind) {
            StockLevel::LowStock
        } else {
            StockLevel::InStock
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StockLevel::InStock => "in-stock",
            StockLevel::LowStock => "low-stock",
            StockLevel::OutOfStock => "out-of-stock",
            StockLevel::Untracked => "untracked",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> LowStockThresholds {
        LowStockThresholds::default()
    }

    #[test]
    fn zero_stock_is_out_of_stock_for_both_kinds() {
        for kind in [ProductKind::Simple, ProductKind::Variant] {
            assert_eq!(
                StockLevel::classify(Some(0), kind, &thresholds()),
                StockLevel::OutOfStock
            );
        }
    }

    #[test]
    fn untracked_stock_is_never_bucketed() {
        for kind in [ProductKind::Simple, ProductKind::Variant] {
            assert_eq!(
                StockLevel::classify(None, kind, &thresholds()),
                StockLevel::Untracked
            );
        }
    }

    #[test]
    fn low_stock_threshold_differs_by_kind() {
        // Stock of 3 is low for both kinds.
        assert_eq!(
            StockLevel::classify(Some(3), ProductKind::Simple, &thresholds()),
            StockLevel::LowStock
        );
        assert_eq!(
            StockLevel::classify(Some(3), ProductKind::Variant, &thresholds()),
            StockLevel::LowStock
        );

        // Stock of 7 is low for a simple product (threshold 10) but fine for a
        // variant (threshold 5).
        assert_eq!(
            StockLevel::classify(Some(7), ProductKind::Simple, &thresholds()),
            StockLevel::LowStock
        );
        assert_eq!(
            StockLevel::classify(Some(7), ProductKind::Variant, &thresholds()),
            StockLevel::InStock
        );
    }

    #[test]
    fn stock_at_threshold_is_in_stock() {
        assert_eq!(
            StockLevel::classify(Some(10), ProductKind::Simple, &thresholds()),
            StockLevel::InStock
        );
        assert_eq!(
            StockLevel::classify(Some(5), ProductKind::Variant, &thresholds()),
            StockLevel::InStock
        );
    }

    #[test]
    fn custom_thresholds_are_respected() {
        let custom = LowStockThresholds {
            simple: 3,
            variant: 2,
        };
        assert_eq!(
            StockLevel::classify(Some(7), ProductKind::Simple, &custom),
            StockLevel::InStock
        );
        assert_eq!(
            StockLevel::classify(Some(1), ProductKind::Variant, &custom),
            StockLevel::LowStock
        );
    }
}
