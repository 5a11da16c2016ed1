//! Cloudflare Stream live input API client.
//!
//! # Core Concepts: Live Inputs vs Videos
//!
//! ## [`live_inputs::LiveInput`] - Ingest Endpoints
//! - **What encoders see**: RTMPS, SRT and WebRTC URLs plus the secret keys to push to them
//! - **Settings**: Recording mode, signed-URL requirement, retention period
//! - **Use for**: Setting up streaming software, managing endpoints
//! - **Relationship**: One live input produces many videos over time
//!
//! ## [`videos::Video`] - Recordings
//! - **What viewers see**: One video per broadcast when recording is automatic
//! - **State**: `live-inprogress` while the broadcast runs, then processed like an upload
//! - **Use for**: Listing past and current broadcasts of an input
//!
//! The [`lifecycle::LifecycleStatus`] endpoint answers the one question the authenticated API
//! does not: is this input live right now?
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use live_input_console::{Config, StreamClient};
//!
//! # async fn example() -> eyre::Result<()> {
//! let client = StreamClient::new(Config::from_env())?;
//! for input in client.list_live_inputs().await? {
//!     println!("{}: {}", input.uid, input.name().unwrap_or("Untitled Stream"));
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod lifecycle;
pub mod live_inputs;
pub mod types;
pub mod videos;

pub use client::StreamClient;
pub use types::{ApiEnvelope, ApiMessage};

pub use lifecycle::LifecycleStatus;

pub use live_inputs::{
    CreateLiveInput, CreateLiveInputRequest, DEFAULT_LIVE_INPUT_NAME, LiveInput, LiveInputMeta,
    RecordingMode, RecordingSettings, RtmpsEndpoint, SrtEndpoint, WebRtcEndpoint,
};

pub use videos::{Video, VideoMeta, VideoPlayback, VideoStatus};
