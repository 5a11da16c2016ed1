//! The response envelope shared by every Cloudflare v4 API endpoint.

use serde::{Deserialize, Serialize};

/// Wrapper around every Cloudflare v4 API response body.
///
/// On success `result` carries the payload; on failure `errors` describes what went wrong.
///
/// See: <https://developers.cloudflare.com/fundamentals/api/how-to/make-api-calls/>
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    /// The payload. `null` for endpoints that return nothing, such as deletes.
    pub result: Option<T>,
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<ApiMessage>,
    #[serde(default)]
    pub messages: Vec<ApiMessage>,
}

/// One entry of the envelope's `errors` or `messages` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u32>,
    pub message: String,
}

/// Envelope used only to dig an error message out of a failed response.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    #[serde(default)]
    pub errors: Vec<ApiMessage>,
}

impl ErrorEnvelope {
    /// The first error message of a response body, if the body has one.
    pub(crate) fn first_message(body: &str) -> Option<String> {
        let envelope: Self = serde_json::from_str(body).ok()?;
        envelope
            .errors
            .into_iter()
            .next()
            .map(|e| e.message)
            .filter(|m| !m.is_empty())
    }
}
