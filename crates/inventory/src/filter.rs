use serde::{Deserialize, Serialize};

use crate::stock::{LowStockThresholds, StockItem, StockLevel};

/// Stock-level facet of the admin overview filter.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StockLevelFilter {
    #[default]
    All,
    InStock,
    LowStock,
    OutOfStock,
}

impl StockLevelFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockLevelFilter::All => "all",
            StockLevelFilter::InStock => "in-stock",
            StockLevelFilter::LowStock => "low-stock",
            StockLevelFilter::OutOfStock => "out-of-stock",
        }
    }
}

/// Product-type facet of the admin overview filter.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductTypeFilter {
    #[default]
    All,
    Simple,
    Variant,
}

impl ProductTypeFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductTypeFilter::All => "all",
            ProductTypeFilter::Simple => "simple",
            ProductTypeFilter::Variant => "variant",
        }
    }
}

/// Admin inventory overview filter. Facets combine with AND semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryFilter {
    /// Case-insensitive substring match on product name or SKU.
    pub search: Option<String>,
    pub stock_level: StockLevelFilter,
    pub product_type: ProductTypeFilter,
}

impl InventoryFilter {
    /// Whether one stock-keeping unit passes every facet of this filter.
    ///
    /// This is the reference predicate; the Postgres overview query encodes
    /// the same conditions in SQL.
    pub fn matches(&self, item: &StockItem, thresholds: &LowStockThresholds) -> bool {
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            if !needle.is_empty()
                && !item.name.to_lowercase().contains(&needle)
                && !item.sku.to_lowercase().contains(&needle)
            {
                return false;
            }
        }

        match self.product_type {
            ProductTypeFilter::All => {}
            ProductTypeFilter::Simple => {
                if item.variant_id.is_some() {
                    return false;
                }
            }
            ProductTypeFilter::Variant => {
                if item.variant_id.is_none() {
                    return false;
                }
            }
        }

        let level = item.stock_level(thresholds);
        match self.stock_level {
            StockLevelFilter::All => true,
            // Untracked units belong to no stock bucket.
            StockLevelFilter::InStock => level == StockLevel::InStock,
            StockLevelFilter::LowStock => level == StockLevel::LowStock,
            StockLevelFilter::OutOfStock => level == StockLevel::OutOfStock,
        }
    }
}
