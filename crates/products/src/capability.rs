//! Capability extensions: behaviour sets attached to exactly one variant.
//!
//! [`Shippable`] is implemented only by [`PhysicalProduct`](crate::PhysicalProduct)
//! and [`Downloadable`] only by [`DigitalProduct`](crate::DigitalProduct). Because
//! [`Product`](crate::Product) is an enum, callers pick the capability by matching
//! on the variant; there is no runtime probing for an interface.

use stockline_core::DomainResult;

use crate::digital::DownloadLink;
use crate::physical::ShipmentSummary;

/// Resolves a destination into a distance in kilometres.
pub trait DistanceResolver: Send + Sync {
    fn distance_km(&self, destination: &str) -> u32;
}

/// Deterministic stand-in for a real distance lookup.
///
/// Hashes the destination text onto the range `50..=549` km, so the same
/// destination always yields the same distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedDistance;

impl DistanceResolver for SimulatedDistance {
    fn distance_km(&self, destination: &str) -> u32 {
        let hash = destination
            .chars()
            .fold(0i32, |acc, c| acc.wrapping_mul(31).wrapping_add(c as i32));
        (hash % 500).unsigned_abs() + 50
    }
}

/// Physical fulfillment: shipping estimates and shipment preparation.
pub trait Shippable {
    fn weight_kg(&self) -> f64;

    fn dimensions(&self) -> &str;

    /// Cost of shipping to `destination` using the given distance source.
    fn estimate_shipping_cost_with(
        &self,
        destination: &str,
        distances: &dyn DistanceResolver,
    ) -> f64;

    /// Cost of shipping to `destination` using [`SimulatedDistance`].
    fn estimate_shipping_cost(&self, destination: &str) -> f64 {
        self.estimate_shipping_cost_with(destination, &SimulatedDistance)
    }

    /// Fulfillment summary for a shipment. Fails only on a blank address.
    fn prepare_shipment_with(
        &self,
        destination_address: &str,
        distances: &dyn DistanceResolver,
    ) -> DomainResult<ShipmentSummary>;

    fn prepare_shipment(&self, destination_address: &str) -> DomainResult<ShipmentSummary> {
        self.prepare_shipment_with(destination_address, &SimulatedDistance)
    }
}

/// Digital fulfillment: licensing and download links.
pub trait Downloadable {
    fn file_size_mb(&self) -> f64;

    fn format(&self) -> &str;

    /// True iff `user_id` is non-blank and holds an active license. Never fails.
    fn verify_license(&self, user_id: &str) -> bool;

    /// Grant a license. Idempotent; a blank `user_id` is a validation error.
    fn activate_license(&mut self, user_id: &str) -> DomainResult<()>;

    /// Withdraw a license. Idempotent; unknown users are ignored.
    fn revoke_license(&mut self, user_id: &str);

    /// Build a fresh link; every call carries a distinct token.
    fn generate_download_link(&self) -> DownloadLink;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_distance_is_deterministic_and_bounded() {
        let resolver = SimulatedDistance;
        for destination in ["Bogotá", "Medellín", "", "Calle 123 #45-67", "international"] {
            let first = resolver.distance_km(destination);
            assert_eq!(first, resolver.distance_km(destination));
            assert!((50..=549).contains(&first), "{destination}: {first}");
        }
    }

    #[test]
    fn empty_destination_maps_to_minimum_distance() {
        assert_eq!(SimulatedDistance.distance_km(""), 50);
    }
}
