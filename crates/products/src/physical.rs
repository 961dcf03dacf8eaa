use serde::{Deserialize, Serialize};

use stockline_core::{DomainError, DomainResult, InventoryConfig, ProductId, ValueObject};

use crate::capability::{DistanceResolver, Shippable};
use crate::product::ProductCore;

/// Per-kilometre rate plus the weight-tier table used for shipping estimates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShippingRates {
    pub cost_per_km: f64,
    pub medium_threshold_kg: f64,
    pub heavy_threshold_kg: f64,
    pub medium_multiplier: f64,
    pub heavy_multiplier: f64,
}

impl ValueObject for ShippingRates {}

impl ShippingRates {
    /// Rates with the standard tiers: ×1.2 above 5 kg, ×1.5 above 10 kg.
    pub fn flat(cost_per_km: f64) -> Self {
        Self {
            cost_per_km,
            medium_threshold_kg: 5.0,
            heavy_threshold_kg: 10.0,
            medium_multiplier: 1.2,
            heavy_multiplier: 1.5,
        }
    }

    pub fn from_config(config: &InventoryConfig) -> Self {
        Self {
            cost_per_km: config.cost_per_km,
            medium_threshold_kg: config.medium_weight_threshold_kg,
            heavy_threshold_kg: config.heavy_weight_threshold_kg,
            medium_multiplier: config.medium_weight_multiplier,
            heavy_multiplier: config.heavy_weight_multiplier,
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        if !self.cost_per_km.is_finite() || self.cost_per_km < 0.0 {
            return Err(DomainError::validation("cost per km cannot be negative"));
        }
        if !(self.medium_threshold_kg.is_finite()
            && self.heavy_threshold_kg.is_finite()
            && self.medium_threshold_kg <= self.heavy_threshold_kg)
        {
            return Err(DomainError::validation("weight thresholds are out of order"));
        }
        if !(self.medium_multiplier.is_finite()
            && self.heavy_multiplier.is_finite()
            && 1.0 <= self.medium_multiplier
            && self.medium_multiplier <= self.heavy_multiplier)
        {
            return Err(DomainError::validation("weight multipliers are out of order"));
        }
        Ok(())
    }

    /// Multiplier for a given weight: heavy above the heavy threshold, medium
    /// above the medium threshold, otherwise 1.0.
    pub fn multiplier_for(&self, weight_kg: f64) -> f64 {
        if weight_kg > self.heavy_threshold_kg {
            self.heavy_multiplier
        } else if weight_kg > self.medium_threshold_kg {
            self.medium_multiplier
        } else {
            1.0
        }
    }
}

/// A product that must be shipped.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalProduct {
    core: ProductCore,
    weight_kg: f64,
    dimensions: String,
    rates: ShippingRates,
}

impl PhysicalProduct {
    pub fn new(
        core: ProductCore,
        weight_kg: f64,
        dimensions: impl Into<String>,
        rates: ShippingRates,
    ) -> DomainResult<Self> {
        let dimensions = dimensions.into();

        if !weight_kg.is_finite() || weight_kg <= 0.0 {
            return Err(DomainError::validation("weight must be greater than zero"));
        }
        if dimensions.trim().is_empty() {
            return Err(DomainError::validation("dimensions cannot be empty"));
        }
        rates.validate()?;

        Ok(Self {
            core,
            weight_kg,
            dimensions,
            rates,
        })
    }

    pub(crate) fn core(&self) -> &ProductCore {
        &self.core
    }

    pub(crate) fn core_mut(&mut self) -> &mut ProductCore {
        &mut self.core
    }

    pub fn id(&self) -> &ProductId {
        self.core.id()
    }

    pub fn name(&self) -> &str {
        self.core.name()
    }

    pub fn rates(&self) -> &ShippingRates {
        &self.rates
    }

    pub fn cost_per_km(&self) -> f64 {
        self.rates.cost_per_km
    }

    fn quote(&self, destination: &str, distances: &dyn DistanceResolver) -> (u32, f64, f64) {
        let distance_km = distances.distance_km(destination);
        let multiplier = self.rates.multiplier_for(self.weight_kg);
        let cost = f64::from(distance_km) * self.rates.cost_per_km * multiplier;
        (distance_km, multiplier, cost)
    }
}

impl Shippable for PhysicalProduct {
    fn weight_kg(&self) -> f64 {
        self.weight_kg
    }

    fn dimensions(&self) -> &str {
        &self.dimensions
    }

    fn estimate_shipping_cost_with(
        &self,
        destination: &str,
        distances: &dyn DistanceResolver,
    ) -> f64 {
        self.quote(destination, distances).2
    }

    fn prepare_shipment_with(
        &self,
        destination_address: &str,
        distances: &dyn DistanceResolver,
    ) -> DomainResult<ShipmentSummary> {
        if destination_address.trim().is_empty() {
            return Err(DomainError::validation("destination address cannot be empty"));
        }

        let (distance_km, weight_multiplier, cost) = self.quote(destination_address, distances);

        Ok(ShipmentSummary {
            product_id: self.id().clone(),
            product_name: self.name().to_string(),
            address: destination_address.to_string(),
            weight_kg: self.weight_kg,
            dimensions: self.dimensions.clone(),
            distance_km,
            weight_multiplier,
            cost,
        })
    }
}

/// Everything a packer needs to ship one order line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShipmentSummary {
    pub product_id: ProductId,
    pub product_name: String,
    pub address: String,
    pub weight_kg: f64,
    pub dimensions: String,
    pub distance_km: u32,
    pub weight_multiplier: f64,
    pub cost: f64,
}

impl ValueObject for ShipmentSummary {}

impl core::fmt::Display for ShipmentSummary {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "ship {} ({}) to {}: {} kg, {}, {} km, cost ${:.2}",
            self.product_name,
            self.product_id,
            self.address,
            self.weight_kg,
            self.dimensions,
            self.distance_km,
            self.cost
        )
    }
}
