//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects carry no identity and never change after construction:
/// shipping rates, shipment summaries and download links are all values.
/// To "modify" one, build a new one.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq)]
/// struct ShippingRates {
///     cost_per_km: f64,
/// }
///
/// impl ValueObject for ShippingRates {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
