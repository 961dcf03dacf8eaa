//! Aggregate inventory figures.

use serde::Serialize;

use stockline_products::{Product, ProductKind};

/// Counts by kind and the total value of stock on hand.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct InventoryStatistics {
    pub total_products: usize,
    pub physical_products: usize,
    pub digital_products: usize,
    pub total_units: i64,
    /// Σ(price × stock) over all products.
    pub total_value: f64,
}

impl InventoryStatistics {
    pub fn from_products<'a, I>(products: I) -> Self
    where
        I: IntoIterator<Item = &'a Product>,
    {
        products
            .into_iter()
            .fold(Self::default(), |mut stats, product| {
                stats.total_products += 1;
                match product.kind() {
                    ProductKind::Physical => stats.physical_products += 1,
                    ProductKind::Digital => stats.digital_products += 1,
                }
                stats.total_units = stats.total_units.saturating_add(product.stock());
                stats.total_value += product.inventory_value();
                stats
            })
    }
}
