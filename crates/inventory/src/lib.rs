//! Inventory domain module.
//!
//! Product storage, stock control and the sale workflow. The repository is
//! the single gateway for mutations; [`InventoryManager`] composes it with
//! product capabilities to run multi-step operations.

pub mod manager;
pub mod repository;
pub mod sale;
pub mod statistics;

pub use manager::InventoryManager;
pub use repository::{InMemoryProductRepository, ProductMutation, ProductRepository};
pub use sale::{Fulfillment, SaleConfirmation, SaleOutcome, SaleRequest, SaleStage};
pub use statistics::InventoryStatistics;
