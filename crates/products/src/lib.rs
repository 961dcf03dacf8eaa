//! Products domain module.
//!
//! Sellable items as a tagged union: a [`Product`] is either a
//! [`PhysicalProduct`] (shippable) or a [`DigitalProduct`] (downloadable).
//! Pure domain logic; no IO, no storage.

pub mod capability;
pub mod digital;
pub mod factory;
pub mod physical;
pub mod product;

pub use capability::{DistanceResolver, Downloadable, Shippable, SimulatedDistance};
pub use digital::{DigitalProduct, DownloadLink};
pub use factory::{NewDigitalProduct, NewPhysicalProduct, NewProduct, ProductFactory};
pub use physical::{PhysicalProduct, ShipmentSummary, ShippingRates};
pub use product::{Product, ProductCore, ProductDescription, ProductDetails, ProductKind};
