//! Sale requests, confirmations and fulfillment outcomes.

use chrono::{DateTime, Utc};
use serde::Serialize;

use stockline_core::{DomainError, ProductId, UserId};
use stockline_products::{DownloadLink, ShipmentSummary};

/// Command: sell `quantity` units of a product.
///
/// `destination` is used for physical products (the configured default
/// applies when absent); `user_id` must hold a license for digital products
/// to receive a download link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleRequest {
    pub product_id: ProductId,
    pub quantity: i64,
    pub destination: Option<String>,
    pub user_id: Option<UserId>,
}

impl SaleRequest {
    pub fn new(product_id: ProductId, quantity: i64) -> Self {
        Self {
            product_id,
            quantity,
            destination: None,
            user_id: None,
        }
    }

    pub fn ship_to(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    pub fn for_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }
}

/// Stages a sale request moves through.
///
/// ```text
/// Requested → StockChecked → Decremented → FulfillmentDispatched
///                  │               └──────→ FulfillmentSkipped
///                  └→ Rejected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleStage {
    Requested,
    StockChecked,
    Decremented,
    Rejected,
    FulfillmentDispatched,
    FulfillmentSkipped,
}

impl SaleStage {
    pub fn as_str(self) -> &'static str {
        match self {
            SaleStage::Requested => "requested",
            SaleStage::StockChecked => "stock_checked",
            SaleStage::Decremented => "decremented",
            SaleStage::Rejected => "rejected",
            SaleStage::FulfillmentDispatched => "fulfillment_dispatched",
            SaleStage::FulfillmentSkipped => "fulfillment_skipped",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SaleStage::Rejected | SaleStage::FulfillmentDispatched | SaleStage::FulfillmentSkipped
        )
    }
}

impl core::fmt::Display for SaleStage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record of a completed stock decrement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleConfirmation {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub total: f64,
    pub remaining_stock: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Post-sale action taken for the product's variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Fulfillment {
    Shipment(ShipmentSummary),
    Download(DownloadLink),
    /// The sale stands but nothing was dispatched.
    Skipped { reason: DomainError },
}

impl Fulfillment {
    pub fn stage(&self) -> SaleStage {
        match self {
            Fulfillment::Shipment(_) | Fulfillment::Download(_) => SaleStage::FulfillmentDispatched,
            Fulfillment::Skipped { .. } => SaleStage::FulfillmentSkipped,
        }
    }

    pub fn shipment(&self) -> Option<&ShipmentSummary> {
        match self {
            Fulfillment::Shipment(s) => Some(s),
            _ => None,
        }
    }

    pub fn download(&self) -> Option<&DownloadLink> {
        match self {
            Fulfillment::Download(link) => Some(link),
            _ => None,
        }
    }

    pub fn skip_reason(&self) -> Option<&DomainError> {
        match self {
            Fulfillment::Skipped { reason } => Some(reason),
            _ => None,
        }
    }
}

/// Result of a sale that passed the stock check.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleOutcome {
    pub confirmation: SaleConfirmation,
    pub fulfillment: Fulfillment,
}

impl SaleOutcome {
    pub fn final_stage(&self) -> SaleStage {
        self.fulfillment.stage()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_optional_fields() {
        let request = SaleRequest::new(ProductId::new("F01").unwrap(), 2)
            .ship_to("Calle 1")
            .for_user(UserId::new("U1").unwrap());
        assert_eq!(request.destination.as_deref(), Some("Calle 1"));
        assert_eq!(request.user_id.unwrap().as_str(), "U1");
    }

    #[test]
    fn skipped_fulfillment_is_terminal_and_carries_reason() {
        let fulfillment = Fulfillment::Skipped {
            reason: DomainError::License {
                product_id: ProductId::new("D01").unwrap(),
                user_id: None,
            },
        };
        assert_eq!(fulfillment.stage(), SaleStage::FulfillmentSkipped);
        assert!(fulfillment.stage().is_terminal());
        assert!(matches!(fulfillment.skip_reason(), Some(DomainError::License { .. })));
        assert!(fulfillment.download().is_none());
    }

    #[test]
    fn intermediate_stages_are_not_terminal() {
        assert!(!SaleStage::Requested.is_terminal());
        assert!(!SaleStage::StockChecked.is_terminal());
        assert!(!SaleStage::Decremented.is_terminal());
        assert!(SaleStage::Rejected.is_terminal());
    }
}
