use std::collections::BTreeSet;

use serde::Serialize;
use uuid::Uuid;

use stockline_core::{DomainError, DomainResult, ProductId, UserId, ValueObject};

use crate::capability::Downloadable;
use crate::product::ProductCore;

/// A product delivered as a licensed download.
#[derive(Debug, Clone, PartialEq)]
pub struct DigitalProduct {
    core: ProductCore,
    file_size_mb: f64,
    format: String,
    download_base_url: String,
    licenses: BTreeSet<UserId>,
}

impl DigitalProduct {
    pub fn new(
        core: ProductCore,
        file_size_mb: f64,
        format: impl Into<String>,
        download_base_url: impl Into<String>,
    ) -> DomainResult<Self> {
        let format = format.into();
        let download_base_url = download_base_url.into();

        if !file_size_mb.is_finite() || file_size_mb <= 0.0 {
            return Err(DomainError::validation("file size must be greater than zero"));
        }
        if format.trim().is_empty() {
            return Err(DomainError::validation("format cannot be empty"));
        }
        if download_base_url.trim().is_empty() {
            return Err(DomainError::validation("download base URL cannot be empty"));
        }

        Ok(Self {
            core,
            file_size_mb,
            format,
            download_base_url,
            licenses: BTreeSet::new(),
        })
    }

    pub(crate) fn core(&self) -> &ProductCore {
        &self.core
    }

    pub(crate) fn core_mut(&mut self) -> &mut ProductCore {
        &mut self.core
    }

    pub fn id(&self) -> &ProductId {
        self.core.id()
    }

    pub fn download_base_url(&self) -> &str {
        &self.download_base_url
    }

    pub fn license_count(&self) -> usize {
        self.licenses.len()
    }

    /// License holders in identifier order.
    pub fn licensed_users(&self) -> impl Iterator<Item = &UserId> {
        self.licenses.iter()
    }
}

impl Downloadable for DigitalProduct {
    fn file_size_mb(&self) -> f64 {
        self.file_size_mb
    }

    fn format(&self) -> &str {
        &self.format
    }

    fn verify_license(&self, user_id: &str) -> bool {
        UserId::new(user_id)
            .map(|user| self.licenses.contains(&user))
            .unwrap_or(false)
    }

    fn activate_license(&mut self, user_id: &str) -> DomainResult<()> {
        let user = UserId::new(user_id)?;
        self.licenses.insert(user);
        Ok(())
    }

    fn revoke_license(&mut self, user_id: &str) {
        if let Ok(user) = UserId::new(user_id) {
            self.licenses.remove(&user);
        }
    }

    fn generate_download_link(&self) -> DownloadLink {
        let token = Uuid::new_v4().simple().to_string();
        let base = self.download_base_url.trim_end_matches('/');
        let url = format!("{base}/{}?token={token}", self.id());

        DownloadLink {
            product_id: self.id().clone(),
            url,
            token,
        }
    }
}

/// A single-use download URL for a digital product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadLink {
    pub product_id: ProductId,
    pub url: String,
    pub token: String,
}

impl ValueObject for DownloadLink {}

impl core::fmt::Display for DownloadLink {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.url)
    }
}
