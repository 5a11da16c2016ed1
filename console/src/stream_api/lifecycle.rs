//! Live status of an input, as reported by the public per-customer lifecycle endpoint.

use serde::{Deserialize, Serialize};

/// Response of `GET https://customer-{code}.cloudflarestream.com/{id}/lifecycle`.
///
/// This endpoint is publicly queryable and is not wrapped in the v4 API envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleStatus {
    /// Whether the id named a live input (as opposed to a video).
    #[serde(default)]
    pub is_input: bool,
    /// Whether a broadcast is currently being received.
    #[serde(default)]
    pub live: bool,
    /// The video currently recording the broadcast, if any.
    #[serde(default, rename = "videoUID", skip_serializing_if = "Option::is_none")]
    pub video_uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}
