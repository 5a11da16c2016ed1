//! Account configuration for the Cloudflare Stream API.
//!
//! The configuration is read once at startup and passed by value to whatever needs it;
//! nothing in this crate reads the process environment behind the caller's back.

use crate::error::{ConfigError, OperationResult};
use crate::urls::StreamUrls;
use secrecy::{ExposeSecret, SecretString};

/// Root of the Cloudflare v4 REST API.
pub const DEFAULT_API_BASE_URL: &str = "https://api.cloudflare.com/client/v4";

/// Domain under which per-customer playback hosts live.
pub const DEFAULT_DELIVERY_DOMAIN: &str = "cloudflarestream.com";

pub const ACCOUNT_ID_VAR: &str = "CLOUDFLARE_ACCOUNT_ID";
pub const API_TOKEN_VAR: &str = "CLOUDFLARE_API_TOKEN";
pub const CUSTOMER_CODE_VAR: &str = "CLOUDFLARE_CUSTOMER_CODE";
pub const API_BASE_URL_VAR: &str = "CLOUDFLARE_API_BASE_URL";
pub const DELIVERY_DOMAIN_VAR: &str = "CLOUDFLARE_STREAM_DOMAIN";

/// Credentials and endpoints for one Cloudflare account.
///
/// Empty strings stand for "not configured". Use [`Config::validate`] before handing the
/// configuration to [`crate::StreamClient`].
#[derive(Debug, Clone)]
pub struct Config {
    account_id: String,
    api_token: SecretString,
    customer_code: String,
    api_base_url: String,
    delivery_domain: String,
}

impl Config {
    pub fn new(
        account_id: impl Into<String>,
        api_token: impl Into<String>,
        customer_code: impl Into<String>,
    ) -> Self {
        Self {
            account_id: account_id.into().trim().to_string(),
            api_token: SecretString::new(api_token.into().trim().to_string()),
            customer_code: customer_code.into().trim().to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            delivery_domain: DEFAULT_DELIVERY_DOMAIN.to_string(),
        }
    }

    /// Reads the configuration from the process environment.
    ///
    /// Missing variables are not an error here; they surface through [`Config::validate`].
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).unwrap_or_default();
        let mut config = Self::new(get(ACCOUNT_ID_VAR), get(API_TOKEN_VAR), get(CUSTOMER_CODE_VAR));
        if let Some(base) = lookup(API_BASE_URL_VAR).filter(|v| !v.trim().is_empty()) {
            config = config.with_api_base_url(base);
        }
        if let Some(domain) = lookup(DELIVERY_DOMAIN_VAR).filter(|v| !v.trim().is_empty()) {
            config = config.with_delivery_domain(domain);
        }
        config
    }

    /// Points the client at a different API root, e.g. a local mock server.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim().trim_end_matches('/').to_string();
        self
    }

    pub fn with_delivery_domain(mut self, domain: impl Into<String>) -> Self {
        self.delivery_domain = domain.into().trim().to_string();
        self
    }

    /// Checks that the credentials every API call needs are present.
    ///
    /// The customer code is not checked here: only URL generation and status checks need it,
    /// and those report its absence themselves.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut missing = Vec::new();
        if self.account_id.is_empty() {
            missing.push(ACCOUNT_ID_VAR);
        }
        if self.api_token.expose_secret().is_empty() {
            missing.push(API_TOKEN_VAR);
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError { missing })
        }
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn api_token(&self) -> &SecretString {
        &self.api_token
    }

    /// The configured customer code, if any.
    pub fn customer_code(&self) -> Option<&str> {
        Some(self.customer_code.as_str()).filter(|c| !c.is_empty())
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    pub fn delivery_domain(&self) -> &str {
        &self.delivery_domain
    }

    /// `{api_base_url}/accounts/{account_id}/stream`
    pub fn stream_api_base(&self) -> String {
        format!("{}/accounts/{}/stream", self.api_base_url, self.account_id)
    }

    /// Viewer URLs for `input_id`.
    ///
    /// An explicit, non-empty `customer_code` wins over the configured one.
    pub fn stream_urls(
        &self,
        input_id: &str,
        customer_code: Option<&str>,
    ) -> OperationResult<StreamUrls> {
        let code = customer_code
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .or(self.customer_code())
            .unwrap_or_default();
        StreamUrls::generate_on(&self.delivery_domain, input_id, code)
    }
}
