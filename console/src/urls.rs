//! Viewer-facing playback URLs for a live input.

use crate::config::DEFAULT_DELIVERY_DOMAIN;
use crate::error::{OperationError, OperationResult};
use serde::{Deserialize, Serialize};

/// The four URLs a browser needs to watch a live input.
///
/// Derived purely from the input id and the customer code; nothing here checks that the
/// input actually exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamUrls {
    /// Embeddable Stream Player page.
    pub player_url: String,
    /// HLS manifest.
    pub hls_url: String,
    /// DASH manifest.
    pub dash_url: String,
    /// Standalone watch page.
    pub watch_url: String,
}

impl StreamUrls {
    /// Builds the URLs on the default delivery domain.
    pub fn generate(input_id: &str, customer_code: &str) -> OperationResult<Self> {
        Self::generate_on(DEFAULT_DELIVERY_DOMAIN, input_id, customer_code)
    }

    pub(crate) fn generate_on(
        domain: &str,
        input_id: &str,
        customer_code: &str,
    ) -> OperationResult<Self> {
        let origin = customer_origin(domain, customer_code)?;
        Ok(Self {
            player_url: format!("{origin}/{input_id}/iframe"),
            hls_url: format!("{origin}/{input_id}/manifest/video.m3u8"),
            dash_url: format!("{origin}/{input_id}/manifest/video.mpd"),
            watch_url: format!("{origin}/{input_id}/watch"),
        })
    }
}

/// `https://customer-{code}.{domain}`, the per-customer playback host.
pub(crate) fn customer_origin(domain: &str, customer_code: &str) -> OperationResult<String> {
    let code = customer_code.trim();
    if code.is_empty() {
        return Err(OperationError::invalid_input("Customer code not configured"));
    }
    Ok(format!("https://customer-{code}.{domain}"))
}
