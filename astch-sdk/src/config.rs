//! Client configuration types.
//!
//! Both clients are configured from plain serde structs so an application can
//! load them from its own settings file. Every field that has a sensible
//! production default carries one.

use serde::{Deserialize, Serialize};
use url::Url;

/// Configuration for the payment gateway client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Root URL of the payment provider. Must end with a trailing slash.
    #[serde(default = "default_gateway_base_url")]
    pub base_url: Url,
    /// Merchant path segment embedded in the initiation URL, assigned by the
    /// provider when the merchant account is created.
    pub merchant_path: String,
    /// Where the provider redirects the user after the payment attempt.
    pub return_url: Url,
    /// Optional server-to-server notification URL.
    #[serde(default)]
    pub webhook_url: Option<Url>,
    /// Request timeout in seconds.
    #[serde(default = "default_gateway_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_gateway_base_url() -> Url {
    "https://www.pay.moneyfusion.net/"
        .parse()
        .expect("valid default gateway url")
}

fn default_gateway_timeout_secs() -> u64 {
    30
}

/// Configuration for the internal REST backend client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Root URL of the backend, up to and including `/api/v1/`.
    pub base_url: Url,
    /// Request timeout in seconds.
    #[serde(default = "default_backend_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_backend_timeout_secs() -> u64 {
    15
}
