use serde::{Deserialize, Serialize};

use stockline_core::{DomainError, DomainResult, Entity, ProductId, UserId};

use crate::capability::{Downloadable, Shippable};
use crate::digital::DigitalProduct;
use crate::physical::PhysicalProduct;

/// Variant discriminant: which mutually exclusive product shape an entity is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    Physical,
    Digital,
}

impl ProductKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProductKind::Physical => "physical",
            ProductKind::Digital => "digital",
        }
    }
}

impl core::fmt::Display for ProductKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for ProductKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "physical" => Ok(ProductKind::Physical),
            "digital" => Ok(ProductKind::Digital),
            other => Err(DomainError::validation(format!("unknown product kind: {other}"))),
        }
    }
}

/// State shared by every product variant.
///
/// `id`, `name` and `price` are fixed at construction. `stock` only moves
/// through [`ProductCore::adjust_stock`], which refuses to go below zero.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductCore {
    id: ProductId,
    name: String,
    price: f64,
    stock: i64,
}

impl ProductCore {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        price: f64,
        stock: i64,
    ) -> DomainResult<Self> {
        let id = ProductId::new(id)?;
        let name = name.into();

        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if !price.is_finite() {
            return Err(DomainError::validation("price must be a finite number"));
        }
        if price < 0.0 {
            return Err(DomainError::validation("price cannot be negative"));
        }
        if stock < 0 {
            return Err(DomainError::validation("stock cannot be negative"));
        }

        Ok(Self {
            id,
            name,
            price,
            stock,
        })
    }

    pub fn id(&self) -> &ProductId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn stock(&self) -> i64 {
        self.stock
    }

    /// Apply a signed stock change and return the new stock level.
    ///
    /// Positive deltas restock, negative deltas consume. On error the stock
    /// is left untouched.
    pub fn adjust_stock(&mut self, delta: i64) -> DomainResult<i64> {
        let new_stock = self
            .stock
            .checked_add(delta)
            .ok_or_else(|| DomainError::validation("stock adjustment overflows"))?;

        if new_stock < 0 {
            return Err(DomainError::InsufficientStock {
                product_id: self.id.clone(),
                requested: delta.saturating_neg(),
                available: self.stock,
            });
        }

        self.stock = new_stock;
        Ok(new_stock)
    }
}

/// A sellable item: exactly one of the two variants.
#[derive(Debug, Clone, PartialEq)]
pub enum Product {
    Physical(PhysicalProduct),
    Digital(DigitalProduct),
}

impl Product {
    fn core(&self) -> &ProductCore {
        match self {
            Product::Physical(p) => p.core(),
            Product::Digital(d) => d.core(),
        }
    }

    fn core_mut(&mut self) -> &mut ProductCore {
        match self {
            Product::Physical(p) => p.core_mut(),
            Product::Digital(d) => d.core_mut(),
        }
    }

    pub fn id(&self) -> &ProductId {
        self.core().id()
    }

    pub fn name(&self) -> &str {
        self.core().name()
    }

    pub fn price(&self) -> f64 {
        self.core().price()
    }

    pub fn stock(&self) -> i64 {
        self.core().stock()
    }

    pub fn kind(&self) -> ProductKind {
        match self {
            Product::Physical(_) => ProductKind::Physical,
            Product::Digital(_) => ProductKind::Digital,
        }
    }

    /// Value of the units on hand: `price × stock`.
    pub fn inventory_value(&self) -> f64 {
        self.price() * self.stock() as f64
    }

    pub fn adjust_stock(&mut self, delta: i64) -> DomainResult<i64> {
        self.core_mut().adjust_stock(delta)
    }

    pub fn as_physical(&self) -> Option<&PhysicalProduct> {
        match self {
            Product::Physical(p) => Some(p),
            Product::Digital(_) => None,
        }
    }

    pub fn as_digital(&self) -> Option<&DigitalProduct> {
        match self {
            Product::Digital(d) => Some(d),
            Product::Physical(_) => None,
        }
    }

    pub fn as_digital_mut(&mut self) -> Option<&mut DigitalProduct> {
        match self {
            Product::Digital(d) => Some(d),
            Product::Physical(_) => None,
        }
    }

    /// Structured snapshot of the current attributes.
    pub fn describe(&self) -> ProductDescription {
        let details = match self {
            Product::Physical(p) => ProductDetails::Physical {
                weight_kg: p.weight_kg(),
                dimensions: p.dimensions().to_string(),
                cost_per_km: p.rates().cost_per_km,
            },
            Product::Digital(d) => ProductDetails::Digital {
                file_size_mb: d.file_size_mb(),
                format: d.format().to_string(),
                active_licenses: d.license_count(),
                licensed_users: d.licensed_users().cloned().collect(),
            },
        };

        ProductDescription {
            id: self.id().clone(),
            name: self.name().to_string(),
            kind: self.kind(),
            price: self.price(),
            stock: self.stock(),
            inventory_value: self.inventory_value(),
            details,
        }
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        Product::id(self)
    }
}

impl From<PhysicalProduct> for Product {
    fn from(value: PhysicalProduct) -> Self {
        Product::Physical(value)
    }
}

impl From<DigitalProduct> for Product {
    fn from(value: DigitalProduct) -> Self {
        Product::Digital(value)
    }
}

/// Read-only snapshot produced by [`Product::describe`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductDescription {
    pub id: ProductId,
    pub name: String,
    pub kind: ProductKind,
    pub price: f64,
    pub stock: i64,
    pub inventory_value: f64,
    pub details: ProductDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductDetails {
    Physical {
        weight_kg: f64,
        dimensions: String,
        cost_per_km: f64,
    },
    Digital {
        file_size_mb: f64,
        format: String,
        active_licenses: usize,
        /// License holders in identifier order.
        licensed_users: Vec<UserId>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physical::ShippingRates;

    fn laptop() -> Product {
        let core = ProductCore::new("F01", "Gaming Laptop", 1500.0, 10).unwrap();
        PhysicalProduct::new(core, 2.5, "40x30x5 cm", ShippingRates::flat(0.5))
            .unwrap()
            .into()
    }

    fn ebook() -> Product {
        let core = ProductCore::new("D01", "Clean Code eBook", 30.0, 100).unwrap();
        DigitalProduct::new(core, 5.0, "PDF", "https://dl.example/v1")
            .unwrap()
            .into()
    }

    #[test]
    fn construction_rejects_invalid_shared_fields() {
        assert!(matches!(
            ProductCore::new("", "name", 1.0, 1),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            ProductCore::new("P1", "  ", 1.0, 1),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            ProductCore::new("P1", "name", -0.01, 1),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            ProductCore::new("P1", "name", f64::NAN, 1),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            ProductCore::new("P1", "name", 1.0, -1),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn zero_price_and_stock_are_valid() {
        let core = ProductCore::new("P0", "Freebie", 0.0, 0).unwrap();
        assert_eq!(core.price(), 0.0);
        assert_eq!(core.stock(), 0);
    }

    #[test]
    fn adjust_stock_rejects_going_negative_without_mutation() {
        let mut product = laptop();
        let err = product.adjust_stock(-11).unwrap_err();
        assert_eq!(
            err,
            DomainError::InsufficientStock {
                product_id: ProductId::new("F01").unwrap(),
                requested: 11,
                available: 10,
            }
        );
        assert_eq!(product.stock(), 10);
    }

    #[test]
    fn adjust_stock_can_drain_to_zero_and_restock() {
        let mut product = laptop();
        assert_eq!(product.adjust_stock(-10).unwrap(), 0);
        assert_eq!(product.adjust_stock(4).unwrap(), 4);
    }

    #[test]
    fn adjust_stock_overflow_is_a_validation_error() {
        let mut core = ProductCore::new("P1", "name", 1.0, 1).unwrap();
        assert!(matches!(
            core.adjust_stock(i64::MAX),
            Err(DomainError::Validation(_))
        ));
        assert_eq!(core.stock(), 1);
    }

    #[test]
    fn kind_matches_variant_and_capabilities_are_exclusive() {
        let physical = laptop();
        let digital = ebook();

        assert_eq!(physical.kind(), ProductKind::Physical);
        assert!(physical.as_physical().is_some());
        assert!(physical.as_digital().is_none());

        assert_eq!(digital.kind(), ProductKind::Digital);
        assert!(digital.as_digital().is_some());
        assert!(digital.as_physical().is_none());
    }

    #[test]
    fn kind_parses_case_insensitively() {
        assert_eq!("Physical".parse::<ProductKind>().unwrap(), ProductKind::Physical);
        assert_eq!(" DIGITAL ".parse::<ProductKind>().unwrap(), ProductKind::Digital);
        assert!("service".parse::<ProductKind>().is_err());
    }

    #[test]
    fn describe_is_a_pure_snapshot() {
        let product = laptop();
        let before = product.clone();

        let description = product.describe();
        assert_eq!(product, before);
        assert_eq!(description.id.as_str(), "F01");
        assert_eq!(description.kind, ProductKind::Physical);
        assert_eq!(description.stock, 10);
        assert_eq!(description.inventory_value, 15000.0);
        assert_eq!(
            description.details,
            ProductDetails::Physical {
                weight_kg: 2.5,
                dimensions: "40x30x5 cm".to_string(),
                cost_per_km: 0.5,
            }
        );
    }

    #[test]
    fn describe_serializes_with_kind_specific_details() {
        let json = serde_json::to_value(ebook().describe()).unwrap();
        assert_eq!(json["kind"], "digital");
        assert_eq!(json["details"]["digital"]["format"], "PDF");
        assert_eq!(json["details"]["digital"]["active_licenses"], 0);
        assert_eq!(json["details"]["digital"]["licensed_users"], serde_json::json!([]));
    }

    #[test]
    fn describe_lists_license_holders_in_order() {
        let mut product = ebook();
        if let Product::Digital(d) = &mut product {
            d.activate_license("U2").unwrap();
            d.activate_license("U1").unwrap();
        }

        match product.describe().details {
            ProductDetails::Digital {
                active_licenses,
                licensed_users,
                ..
            } => {
                assert_eq!(active_licenses, 2);
                let users: Vec<&str> = licensed_users.iter().map(UserId::as_str).collect();
                assert_eq!(users, vec!["U1", "U2"]);
            }
            other => panic!("expected digital details, got {other:?}"),
        }
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 500,
                ..ProptestConfig::default()
            })]

            /// Property: stock and price stay non-negative across any adjustment sequence.
            #[test]
            fn stock_never_goes_negative(
                price in 0.0f64..1_000_000.0,
                initial in 0i64..10_000,
                deltas in proptest::collection::vec(-20_000i64..20_000, 0..50)
            ) {
                let mut core = ProductCore::new("P1", "Widget", price, initial).unwrap();
                for delta in deltas {
                    let before = core.stock();
                    match core.adjust_stock(delta) {
                        Ok(after) => prop_assert_eq!(after, before + delta),
                        Err(_) => prop_assert_eq!(core.stock(), before),
                    }
                    prop_assert!(core.stock() >= 0);
                    prop_assert!(core.price() >= 0.0);
                }
            }

            /// Property: adjust(d) then adjust(-d) restores the original stock.
            #[test]
            fn adjustment_round_trip_restores_stock(
                initial in 0i64..10_000,
                delta in -10_000i64..10_000
            ) {
                let mut core = ProductCore::new("P1", "Widget", 1.0, initial).unwrap();
                prop_assume!(initial + delta >= 0);

                core.adjust_stock(delta).unwrap();
                core.adjust_stock(-delta).unwrap();
                prop_assert_eq!(core.stock(), initial);
            }
        }
    }
}
