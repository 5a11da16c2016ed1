//! Cloudflare Stream live input types.
//!
//! A live input is an ingest endpoint owned by the remote service: streaming software pushes
//! video to it over RTMPS, SRT or WebRTC, and the service republishes it for playback. This
//! crate never holds an authoritative copy; every value here is a point-in-time snapshot.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name given to live inputs created without one.
pub const DEFAULT_LIVE_INPUT_NAME: &str = "Live Stream";

/// A `live_input` resource.
///
/// Only `uid` is guaranteed; list responses in particular omit most connection details.
///
/// See: <https://developers.cloudflare.com/api/resources/stream/subresources/live_inputs/>
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveInput {
    /// Unique identifier of the live input.
    pub uid: String,
    #[serde(default)]
    pub meta: LiveInputMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recording: Option<RecordingSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefer_low_latency: Option<bool>,
    /// Days after which recordings are deleted. `None` keeps them indefinitely.
    #[serde(default)]
    pub delete_recording_after_days: Option<u32>,
    /// Credentials for pushing a stream over RTMPS.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rtmps: Option<RtmpsEndpoint>,
    /// Credentials for pulling the stream back out over RTMPS.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rtmps_playback: Option<RtmpsEndpoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub srt: Option<SrtEndpoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub srt_playback: Option<SrtEndpoint>,
    #[serde(default, rename = "webRTC", skip_serializing_if = "Option::is_none")]
    pub web_rtc: Option<WebRtcEndpoint>,
    #[serde(default, rename = "webRTCPlayback", skip_serializing_if = "Option::is_none")]
    pub web_rtc_playback: Option<WebRtcEndpoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<Timestamp>,
    /// Connection status as reported by the service.
    ///
    /// Kept loosely typed: the service reports either `null` or an object whose shape
    /// depends on the ingest protocol. See [`LiveInput::state`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<serde_json::Value>,
}

impl LiveInput {
    pub fn name(&self) -> Option<&str> {
        self.meta.name.as_deref().filter(|n| !n.is_empty())
    }

    pub fn recording_mode(&self) -> RecordingMode {
        self.recording
            .as_ref()
            .map(|r| r.mode)
            .unwrap_or(RecordingMode::Off)
    }

    pub fn requires_signed_urls(&self) -> bool {
        self.recording
            .as_ref()
            .is_some_and(|r| r.require_signed_urls)
    }

    /// The current connection state, e.g. `connected` or `disconnected`.
    pub fn state(&self) -> Option<&str> {
        match self.status.as_ref()? {
            serde_json::Value::String(s) => Some(s.as_str()),
            serde_json::Value::Object(o) => o
                .get("current")
                .and_then(|c| c.get("state"))
                .and_then(|s| s.as_str()),
            _ => None,
        }
    }
}

/// User-defined metadata attached to a live input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveInputMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Whether broadcasts to a live input are recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingMode {
    /// Every broadcast is recorded and becomes a video.
    #[default]
    Automatic,
    /// Nothing is recorded.
    Off,
}

impl fmt::Display for RecordingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Automatic => write!(f, "automatic"),
            Self::Off => write!(f, "off"),
        }
    }
}

impl std::str::FromStr for RecordingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "automatic" => Ok(Self::Automatic),
            "off" => Ok(Self::Off),
            other => Err(format!(
                "unknown recording mode '{other}' (expected 'automatic' or 'off')"
            )),
        }
    }
}

/// Recording configuration of a live input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingSettings {
    pub mode: RecordingMode,
    /// Whether recordings can only be played back through signed URLs.
    #[serde(default, rename = "requireSignedURLs")]
    pub require_signed_urls: bool,
    /// Origins allowed to embed recordings. `None` allows any.
    #[serde(default)]
    pub allowed_origins: Option<Vec<String>>,
    /// Seconds to wait after a disconnect before the recording is finalized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u32>,
}

/// An RTMPS server URL and its secret stream key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RtmpsEndpoint {
    pub url: String,
    pub stream_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SrtEndpoint {
    pub url: String,
    pub stream_id: String,
    pub passphrase: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebRtcEndpoint {
    pub url: String,
}

/// Parameters for creating a live input.
///
/// Every field is optional; [`CreateLiveInputRequest::from`] fills in the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateLiveInput {
    /// Defaults to [`DEFAULT_LIVE_INPUT_NAME`]. An empty name also gets the default.
    pub name: Option<String>,
    /// Defaults to [`RecordingMode::Automatic`].
    pub recording_mode: Option<RecordingMode>,
    pub require_signed_urls: Option<bool>,
    pub prefer_low_latency: Option<bool>,
    /// Retention in days. The service accepts 30 to 1096; that bound is not checked here.
    /// `Some(0)` is treated like `None`.
    pub delete_recording_after_days: Option<u32>,
    pub allowed_origins: Option<Vec<String>>,
}

/// Body of `POST /live_inputs`, with all defaults applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLiveInputRequest {
    pub meta: LiveInputMeta,
    pub recording: RecordingSettings,
    pub delete_recording_after_days: Option<u32>,
    pub prefer_low_latency: bool,
}

impl From<&CreateLiveInput> for CreateLiveInputRequest {
    fn from(input: &CreateLiveInput) -> Self {
        let name = input
            .name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_LIVE_INPUT_NAME);

        Self {
            meta: LiveInputMeta {
                name: Some(name.to_string()),
            },
            recording: RecordingSettings {
                mode: input.recording_mode.unwrap_or_default(),
                require_signed_urls: input.require_signed_urls.unwrap_or(false),
                allowed_origins: input.allowed_origins.clone(),
                timeout_seconds: None,
            },
            delete_recording_after_days: input.delete_recording_after_days.filter(|d| *d != 0),
            prefer_low_latency: input.prefer_low_latency.unwrap_or(false),
        }
    }
}
