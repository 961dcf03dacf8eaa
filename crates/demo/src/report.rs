//! Text and JSON rendering of inventory snapshots.

use std::fmt::Write as _;

use serde::Serialize;
use stockline_inventory::InventoryStatistics;
use stockline_products::{ProductDescription, ProductDetails};

/// Everything a report shows: product snapshots plus aggregate figures.
#[derive(Debug, Clone, Serialize)]
pub struct InventoryReport {
    pub products: Vec<ProductDescription>,
    pub statistics: InventoryStatistics,
}

impl InventoryReport {
    pub fn new(products: Vec<ProductDescription>, statistics: InventoryStatistics) -> Self {
        Self {
            products,
            statistics,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for product in &self.products {
            out.push_str(&product_line(product));
            out.push('\n');
        }

        let stats = &self.statistics;
        let _ = writeln!(
            out,
            "{} products ({} physical, {} digital), {} units, value {:.2}",
            stats.total_products,
            stats.physical_products,
            stats.digital_products,
            stats.total_units,
            stats.total_value,
        );
        out
    }
}

/// One-line summary of a product.
pub fn product_line(product: &ProductDescription) -> String {
    let details = match &product.details {
        ProductDetails::Physical {
            weight_kg,
            dimensions,
            ..
        } => format!("{weight_kg} kg, {dimensions}"),
        ProductDetails::Digital {
            file_size_mb,
            format,
            active_licenses,
            licensed_users,
        } => {
            let mut line = format!("{format}, {file_size_mb} MB, {active_licenses} license(s)");
            if !licensed_users.is_empty() {
                let holders: Vec<&str> = licensed_users.iter().map(|u| u.as_str()).collect();
                let _ = write!(line, ": {}", holders.join(", "));
            }
            line
        }
    };

    format!(
        "[{}] {} ({}) {:.2} x {} | {}",
        product.id, product.name, product.kind, product.price, product.stock, details
    )
}
