//! Demo configuration: optional JSON file plus environment overrides.

use anyhow::Context;
use stockline_core::InventoryConfig;

pub const CONFIG_PATH_ENV: &str = "STOCKLINE_CONFIG";
pub const DOWNLOAD_BASE_URL_ENV: &str = "STOCKLINE_DOWNLOAD_BASE_URL";
pub const COST_PER_KM_ENV: &str = "STOCKLINE_COST_PER_KM";

/// Load configuration from the process environment.
pub fn load() -> anyhow::Result<InventoryConfig> {
    load_with(|key| std::env::var(key).ok())
}

/// Load configuration through `lookup` (an environment stand-in).
pub fn load_with<F>(lookup: F) -> anyhow::Result<InventoryConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match lookup(CONFIG_PATH_ENV) {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config file {path}"))?;
            InventoryConfig::from_json_str(&raw)
                .with_context(|| format!("invalid config file {path}"))?
        }
        None => {
            tracing::warn!("{CONFIG_PATH_ENV} not set; using built-in defaults");
            InventoryConfig::default()
        }
    };

    if let Some(url) = lookup(DOWNLOAD_BASE_URL_ENV) {
        config.download_base_url = url;
    }

    if let Some(raw) = lookup(COST_PER_KM_ENV) {
        match raw.trim().parse::<f64>() {
            Ok(cost_per_km) => config.cost_per_km = cost_per_km,
            Err(_) => tracing::warn!(
                value = %raw,
                fallback = config.cost_per_km,
                "{COST_PER_KM_ENV} is not a number; keeping configured value"
            ),
        }
    }

    config.validate().context("configuration rejected")?;
    Ok(config)
}
