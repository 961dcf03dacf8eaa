//! Domain error model.

use thiserror::Error;

use crate::id::{ProductId, UserId};

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every failure the inventory core can report. Construction and repository
/// violations are returned straight to the caller; fulfillment failures are
/// folded into the sale outcome by the manager instead of aborting the sale.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed construction or command input. The object was never created.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A product with the same identifier is already stored.
    #[error("duplicate product id: {0}")]
    DuplicateKey(ProductId),

    /// No product is stored under the identifier.
    #[error("product not found: {0}")]
    NotFound(ProductId),

    /// A stock change would take the stock below zero. Nothing was mutated.
    #[error("insufficient stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: i64,
        available: i64,
    },

    /// No active license backs a download of the digital product.
    #[error("no active license for {product_id}{}", license_holder(.user_id))]
    License {
        product_id: ProductId,
        user_id: Option<UserId>,
    },

    /// The operation targets a capability the product's variant does not have.
    #[error("product {product_id} does not support {capability}")]
    CapabilityUnavailable {
        product_id: ProductId,
        capability: &'static str,
    },

    /// The backing store failed (e.g. a poisoned lock).
    #[error("storage failure: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn not_found(product_id: &ProductId) -> Self {
        Self::NotFound(product_id.clone())
    }

    pub fn duplicate(product_id: &ProductId) -> Self {
        Self::DuplicateKey(product_id.clone())
    }

    /// True for rejections the caller can fix and re-issue (everything except storage).
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }
}

fn license_holder(user_id: &Option<UserId>) -> String {
    match user_id {
        Some(user) => format!(" held by user {user}"),
        None => " (no user given)".to_string(),
    }
}
