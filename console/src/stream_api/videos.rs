//! Cloudflare Stream video types.
//!
//! With automatic recording on, each broadcast to a live input becomes a video.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// State the service reports for a video that is still being broadcast.
pub const LIVE_IN_PROGRESS: &str = "live-inprogress";

/// A `video` resource, as returned by `GET /live_inputs/{id}/videos`.
///
/// See: <https://developers.cloudflare.com/api/resources/stream/methods/get/>
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub uid: String,
    #[serde(default)]
    pub meta: VideoMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<VideoStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<Timestamp>,
    /// Length in seconds. Negative while a live recording is still in progress.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Watch page for this video.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub ready_to_stream: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playback: Option<VideoPlayback>,
}

impl Video {
    pub fn name(&self) -> Option<&str> {
        self.meta.name.as_deref().filter(|n| !n.is_empty())
    }

    pub fn state(&self) -> Option<&str> {
        self.status.as_ref().and_then(|s| s.state.as_deref())
    }

    /// Whether this recording is still receiving a broadcast.
    pub fn is_live(&self) -> bool {
        self.state() == Some(LIVE_IN_PROGRESS)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Processing state of a video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatus {
    /// e.g. `queued`, `inprogress`, `ready`, `error`, `live-inprogress`.
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_reason_text: Option<String>,
}

/// Manifest URLs of a recorded video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoPlayback {
    pub hls: String,
    pub dash: String,
}
