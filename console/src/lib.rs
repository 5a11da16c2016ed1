//! Manage Cloudflare Stream live inputs: create, list, inspect and delete ingest endpoints,
//! and derive the URLs viewers use to watch them.
//!
//! The pieces are deliberately independent. [`Config`] is built once and handed to
//! [`StreamClient`]; [`StreamUrls`] is a pure function of an input id and a customer code.

pub mod config;
pub mod error;
pub mod stream_api;
pub mod urls;

pub use config::Config;
pub use error::{ConfigError, ErrorKind, OperationError, OperationResult};
pub use stream_api::StreamClient;
pub use urls::StreamUrls;
