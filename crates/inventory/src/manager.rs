//! Inventory orchestration (application-level workflows).
//!
//! [`InventoryManager`] is the only component with multi-step business logic.
//! It composes a [`ProductRepository`] with the product capabilities and turns
//! commands into outcomes.
//!
//! ## Sale flow
//!
//! ```text
//! SaleRequest
//!   ↓
//! 1. Look up the product                  (absent → NotFound, terminal)
//!   ↓
//! 2. Check 0 < quantity ≤ stock           (else Validation/InsufficientStock, terminal, no mutation)
//!   ↓
//! 3. Decrement stock, compute total       (2 + 3 run under one repository lock)
//!   ↓
//! 4. Dispatch fulfillment by variant      (Physical → shipment, Digital → licensed link)
//!   ↓
//! 5. Return confirmation + fulfillment
//! ```
//!
//! Fulfillment failures never undo the decrement: a digital sale without a
//! verified license still completes, and the outcome reports the fulfillment
//! as skipped with a `License` error.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use stockline_core::{DomainError, DomainResult, InventoryConfig, ProductId, UserId};
use stockline_products::{
    DigitalProduct, DistanceResolver, DownloadLink, Downloadable, PhysicalProduct, Product,
    ProductKind, Shippable, ShipmentSummary, SimulatedDistance,
};

use crate::repository::ProductRepository;
use crate::sale::{Fulfillment, SaleConfirmation, SaleOutcome, SaleRequest, SaleStage};
use crate::statistics::InventoryStatistics;

const SHIPPING: &str = "shipping";
const DOWNLOAD: &str = "download";

/// Coordinates registration, stock changes, sales and fulfillment.
///
/// Generic over the repository so tests and production can plug different
/// stores. All methods take `&self`; concurrency control lives in the
/// repository.
pub struct InventoryManager<R> {
    repository: R,
    config: InventoryConfig,
    distances: Arc<dyn DistanceResolver>,
}

impl<R: ProductRepository> InventoryManager<R> {
    pub fn new(repository: R, config: InventoryConfig) -> DomainResult<Self> {
        config.validate()?;
        Ok(Self {
            repository,
            config,
            distances: Arc::new(SimulatedDistance),
        })
    }

    /// Replace the simulated distance lookup used for shipping.
    pub fn with_distance_resolver(mut self, distances: Arc<dyn DistanceResolver>) -> Self {
        self.distances = distances;
        self
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn config(&self) -> &InventoryConfig {
        &self.config
    }

    /// Store a new product. A duplicate id is reported, never fatal.
    #[tracing::instrument(skip_all, fields(product_id = %product.id()))]
    pub fn register(&self, product: Product) -> DomainResult<()> {
        let product_id = product.id().clone();
        let kind = product.kind();

        match self.repository.add(product) {
            Ok(()) => {
                info!(%product_id, %kind, "product registered");
                Ok(())
            }
            Err(err) => {
                warn!(%product_id, error = %err, "product registration rejected");
                Err(err)
            }
        }
    }

    pub fn remove(&self, product_id: &ProductId) -> DomainResult<Product> {
        let removed = self.repository.remove(product_id).inspect_err(|err| {
            warn!(%product_id, error = %err, "product removal rejected");
        })?;
        info!(%product_id, "product removed");
        Ok(removed)
    }

    pub fn find(&self, product_id: &ProductId) -> Option<Product> {
        self.repository.find_by_id(product_id)
    }

    pub fn search(&self, name_fragment: &str) -> Vec<Product> {
        self.repository.find_by_name_contains(name_fragment)
    }

    pub fn list(&self) -> Vec<Product> {
        self.repository.all_products()
    }

    pub fn list_by_kind(&self, kind: ProductKind) -> Vec<Product> {
        self.repository.by_kind(kind)
    }

    /// Sell units of a product and dispatch its fulfillment.
    ///
    /// Returns `Err` only when the sale itself is rejected (not found,
    /// invalid quantity, insufficient stock). Once stock is decremented the
    /// call returns `Ok`, and any fulfillment problem is reported inside the
    /// outcome.
    #[tracing::instrument(
        skip_all,
        fields(product_id = %request.product_id, quantity = request.quantity)
    )]
    pub fn process_sale(&self, request: SaleRequest) -> DomainResult<SaleOutcome> {
        debug!(stage = %SaleStage::Requested, "sale requested");

        let quantity = request.quantity;
        let sold = self
            .repository
            .update(&request.product_id, &mut |product| {
                if quantity <= 0 {
                    return Err(DomainError::validation("sale quantity must be positive"));
                }
                let available = product.stock();
                if quantity > available {
                    return Err(DomainError::InsufficientStock {
                        product_id: product.id().clone(),
                        requested: quantity,
                        available,
                    });
                }
                debug!(stage = %SaleStage::StockChecked, available, "stock checked");
                product.adjust_stock(-quantity).map(|_| ())
            })
            .inspect_err(|err| {
                warn!(stage = %SaleStage::Rejected, error = %err, "sale rejected");
            })?;

        let unit_price = sold.price();
        let confirmation = SaleConfirmation {
            product_id: sold.id().clone(),
            product_name: sold.name().to_string(),
            quantity,
            unit_price,
            total: unit_price * quantity as f64,
            remaining_stock: sold.stock(),
            occurred_at: Utc::now(),
        };
        debug!(
            stage = %SaleStage::Decremented,
            remaining_stock = confirmation.remaining_stock,
            "stock decremented"
        );

        let fulfillment = self.dispatch_fulfillment(&sold, &request);
        match &fulfillment {
            Fulfillment::Skipped { reason } => {
                warn!(stage = %fulfillment.stage(), reason = %reason, "fulfillment skipped");
            }
            _ => debug!(stage = %fulfillment.stage(), "fulfillment dispatched"),
        }

        info!(
            total = confirmation.total,
            remaining_stock = confirmation.remaining_stock,
            "sale processed"
        );

        Ok(SaleOutcome {
            confirmation,
            fulfillment,
        })
    }

    fn dispatch_fulfillment(&self, product: &Product, request: &SaleRequest) -> Fulfillment {
        let dispatched = match product {
            Product::Physical(physical) => {
                let destination = request
                    .destination
                    .as_deref()
                    .unwrap_or(&self.config.default_destination);
                physical
                    .prepare_shipment_with(destination, self.distances.as_ref())
                    .map(Fulfillment::Shipment)
            }
            Product::Digital(digital) => {
                licensed_link(digital, request.user_id.as_ref()).map(Fulfillment::Download)
            }
        };

        dispatched.unwrap_or_else(|reason| Fulfillment::Skipped { reason })
    }

    /// Add units to a product. `quantity` must be positive.
    #[tracing::instrument(skip(self))]
    pub fn restock(&self, product_id: &ProductId, quantity: i64) -> DomainResult<i64> {
        if quantity <= 0 {
            return Err(DomainError::validation("restock quantity must be positive"));
        }
        let stock = self.adjust_stock(product_id, quantity)?;
        info!(%product_id, quantity, stock, "product restocked");
        Ok(stock)
    }

    /// Apply a signed stock change and return the new stock level.
    pub fn adjust_stock(&self, product_id: &ProductId, delta: i64) -> DomainResult<i64> {
        self.repository
            .update(product_id, &mut |product| product.adjust_stock(delta).map(|_| ()))
            .map(|product| product.stock())
            .inspect_err(|err| {
                warn!(%product_id, delta, error = %err, "stock adjustment rejected");
            })
    }

    pub fn estimate_shipping(&self, product_id: &ProductId, destination: &str) -> DomainResult<f64> {
        let product = self.lookup(product_id)?;
        let physical = require_physical(&product)?;
        Ok(physical.estimate_shipping_cost_with(destination, self.distances.as_ref()))
    }

    pub fn prepare_shipment(
        &self,
        product_id: &ProductId,
        address: &str,
    ) -> DomainResult<ShipmentSummary> {
        let product = self.lookup(product_id)?;
        require_physical(&product)?.prepare_shipment_with(address, self.distances.as_ref())
    }

    #[tracing::instrument(skip(self))]
    pub fn activate_license(&self, product_id: &ProductId, user_id: &str) -> DomainResult<()> {
        self.repository.update(product_id, &mut |product| {
            require_digital_mut(product)?.activate_license(user_id)
        })?;
        info!(%product_id, user_id, "license activated");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub fn revoke_license(&self, product_id: &ProductId, user_id: &str) -> DomainResult<()> {
        self.repository.update(product_id, &mut |product| {
            require_digital_mut(product)?.revoke_license(user_id);
            Ok(())
        })?;
        info!(%product_id, user_id, "license revoked");
        Ok(())
    }

    pub fn verify_license(&self, product_id: &ProductId, user_id: &str) -> DomainResult<bool> {
        let product = self.lookup(product_id)?;
        Ok(require_digital(&product)?.verify_license(user_id))
    }

    /// Issue a download link for a licensed user, outside of any sale.
    #[tracing::instrument(skip(self))]
    pub fn generate_download(
        &self,
        product_id: &ProductId,
        user_id: &str,
    ) -> DomainResult<DownloadLink> {
        let product = self.lookup(product_id)?;
        let digital = require_digital(&product)?;
        let user = UserId::new(user_id).ok();
        licensed_link(digital, user.as_ref())
    }

    /// Counts by kind and total value of stock on hand.
    pub fn statistics(&self) -> InventoryStatistics {
        InventoryStatistics::from_products(&self.repository.all_products())
    }

    /// Products at or below the configured low-stock threshold, ordered by id.
    pub fn low_stock(&self) -> Vec<Product> {
        let threshold = self.config.low_stock_threshold;
        self.repository
            .all_products()
            .into_iter()
            .filter(|p| p.stock() <= threshold)
            .collect()
    }

    fn lookup(&self, product_id: &ProductId) -> DomainResult<Product> {
        self.repository
            .find_by_id(product_id)
            .ok_or_else(|| DomainError::not_found(product_id))
    }
}

fn licensed_link(digital: &DigitalProduct, user: Option<&UserId>) -> DomainResult<DownloadLink> {
    match user {
        Some(user) if digital.verify_license(user.as_str()) => Ok(digital.generate_download_link()),
        _ => Err(DomainError::License {
            product_id: digital.id().clone(),
            user_id: user.cloned(),
        }),
    }
}

fn unavailable(product: &Product, capability: &'static str) -> DomainError {
    DomainError::CapabilityUnavailable {
        product_id: product.id().clone(),
        capability,
    }
}

fn require_physical(product: &Product) -> DomainResult<&PhysicalProduct> {
    product
        .as_physical()
        .ok_or_else(|| unavailable(product, SHIPPING))
}

fn require_digital(product: &Product) -> DomainResult<&DigitalProduct> {
    product
        .as_digital()
        .ok_or_else(|| unavailable(product, DOWNLOAD))
}

fn require_digital_mut(product: &mut Product) -> DomainResult<&mut DigitalProduct> {
    let product_id = product.id().clone();
    product
        .as_digital_mut()
        .ok_or_else(|| DomainError::CapabilityUnavailable {
            product_id,
            capability: DOWNLOAD,
        })
}
