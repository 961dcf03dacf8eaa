//! Product construction from configuration plus raw attributes.

use serde::{Deserialize, Serialize};

use stockline_core::{DomainError, DomainResult, InventoryConfig};

use crate::digital::DigitalProduct;
use crate::physical::{PhysicalProduct, ShippingRates};
use crate::product::{Product, ProductCore, ProductKind};

/// Command: register a new physical product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPhysicalProduct {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub stock: i64,
    pub weight_kg: f64,
    pub dimensions: String,
}

/// Command: register a new digital product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDigitalProduct {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub stock: i64,
    pub file_size_mb: f64,
    pub format: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NewProduct {
    Physical(NewPhysicalProduct),
    Digital(NewDigitalProduct),
}

impl NewProduct {
    pub fn kind(&self) -> ProductKind {
        match self {
            NewProduct::Physical(_) => ProductKind::Physical,
            NewProduct::Digital(_) => ProductKind::Digital,
        }
    }
}

/// Builds products with the configured shipping rates, download base URL and
/// format allow-list.
#[derive(Debug, Clone)]
pub struct ProductFactory {
    config: InventoryConfig,
    rates: ShippingRates,
}

impl ProductFactory {
    pub fn new(config: InventoryConfig) -> DomainResult<Self> {
        config.validate()?;
        let rates = ShippingRates::from_config(&config);
        Ok(Self { config, rates })
    }

    pub fn config(&self) -> &InventoryConfig {
        &self.config
    }

    pub fn physical(&self, cmd: NewPhysicalProduct) -> DomainResult<PhysicalProduct> {
        let core = ProductCore::new(cmd.id, cmd.name, cmd.price, cmd.stock)?;
        PhysicalProduct::new(core, cmd.weight_kg, cmd.dimensions, self.rates)
    }

    pub fn digital(&self, cmd: NewDigitalProduct) -> DomainResult<DigitalProduct> {
        if !cmd.format.trim().is_empty() && !self.config.is_format_allowed(&cmd.format) {
            return Err(DomainError::validation(format!(
                "format '{}' is not allowed",
                cmd.format
            )));
        }
        let core = ProductCore::new(cmd.id, cmd.name, cmd.price, cmd.stock)?;
        DigitalProduct::new(
            core,
            cmd.file_size_mb,
            cmd.format,
            self.config.download_base_url.clone(),
        )
    }

    pub fn build(&self, cmd: NewProduct) -> DomainResult<Product> {
        match cmd {
            NewProduct::Physical(cmd) => self.physical(cmd).map(Product::from),
            NewProduct::Digital(cmd) => self.digital(cmd).map(Product::from),
        }
    }
}
