//! Inventory configuration values.
//!
//! The domain never reads files or the environment itself; callers build an
//! [`InventoryConfig`] however they like and hand over a validated value.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Tunables consumed by product construction, shipping and reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// Base URL download links are built from.
    pub download_base_url: String,
    /// Shipping cost per kilometre before the weight multiplier.
    pub cost_per_km: f64,
    /// Weights strictly above this use the medium multiplier.
    pub medium_weight_threshold_kg: f64,
    /// Weights strictly above this use the heavy multiplier.
    pub heavy_weight_threshold_kg: f64,
    pub medium_weight_multiplier: f64,
    pub heavy_weight_multiplier: f64,
    /// Accepted digital formats (case-insensitive). Empty disables the check.
    pub allowed_formats: Vec<String>,
    /// Shipping destination used when a sale names none.
    pub default_destination: String,
    /// Products at or below this stock level are reported as low.
    pub low_stock_threshold: i64,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            download_base_url: "https://downloads.stockline.example/v1".to_string(),
            cost_per_km: 0.50,
            medium_weight_threshold_kg: 5.0,
            heavy_weight_threshold_kg: 10.0,
            medium_weight_multiplier: 1.2,
            heavy_weight_multiplier: 1.5,
            allowed_formats: ["PDF", "MP4", "MP3", "ZIP", "EXE", "APK"]
                .into_iter()
                .map(String::from)
                .collect(),
            default_destination: "Customer address on file".to_string(),
            low_stock_threshold: 5,
        }
    }
}

impl InventoryConfig {
    /// Parse a (possibly partial) JSON document; missing keys take defaults.
    pub fn from_json_str(raw: &str) -> DomainResult<Self> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|e| DomainError::validation(format!("invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.download_base_url.trim().is_empty() {
            return Err(DomainError::validation("download_base_url cannot be empty"));
        }
        if self.default_destination.trim().is_empty() {
            return Err(DomainError::validation("default_destination cannot be empty"));
        }
        ensure_non_negative("cost_per_km", self.cost_per_km)?;
        ensure_non_negative("medium_weight_threshold_kg", self.medium_weight_threshold_kg)?;
        ensure_non_negative("heavy_weight_threshold_kg", self.heavy_weight_threshold_kg)?;
        if self.medium_weight_threshold_kg > self.heavy_weight_threshold_kg {
            return Err(DomainError::validation(
                "medium_weight_threshold_kg cannot exceed heavy_weight_threshold_kg",
            ));
        }
        if !(self.medium_weight_multiplier.is_finite() && self.medium_weight_multiplier >= 1.0) {
            return Err(DomainError::validation("medium_weight_multiplier must be >= 1.0"));
        }
        if !(self.heavy_weight_multiplier.is_finite()
            && self.heavy_weight_multiplier >= self.medium_weight_multiplier)
        {
            return Err(DomainError::validation(
                "heavy_weight_multiplier must be >= medium_weight_multiplier",
            ));
        }
        if self.low_stock_threshold < 0 {
            return Err(DomainError::validation("low_stock_threshold cannot be negative"));
        }
        Ok(())
    }

    pub fn is_format_allowed(&self, format: &str) -> bool {
        self.allowed_formats.is_empty()
            || self
                .allowed_formats
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(format.trim()))
    }
}

fn ensure_non_negative(field: &str, value: f64) -> DomainResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(DomainError::validation(format!(
            "{field} must be a non-negative number"
        )));
    }
    Ok(())
}
