//! HTTP clients for the payment gateway and the internal backend.
//!
//! Gated behind the `client` cargo feature so downstream crates that only
//! need the shared types do not pull in `reqwest`.

mod backend;
mod gateway;

pub use backend::BackendClient;
pub use gateway::GatewayClient;

use reqwest::StatusCode;

use crate::objects::payment::InvalidPaymentRequest;

/// Errors produced by the SDK HTTP clients.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level failure (DNS, TLS, connection reset, …).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The provider answered with a structured failure payload.
    #[error("gateway error: {message}")]
    Gateway { message: String },

    /// The requested token or resource is unknown to the remote side.
    #[error("not found: {resource}")]
    NotFound { resource: String },

    /// The server returned a non-2xx status code other than 404.
    #[error("api error: status {status}, body: {body}")]
    Api { status: StatusCode, body: String },

    /// Response body could not be deserialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The base URL could not be joined with the endpoint path.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    /// The request failed local validation before anything was sent.
    #[error("invalid payment request: {0}")]
    InvalidRequest(#[from] InvalidPaymentRequest),
}

async fn parse_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ClientError> {
    let status = resp.status();
    if status == StatusCode::NOT_FOUND {
        return Err(ClientError::NotFound {
            resource: resp.url().path().to_string(),
        });
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::Api { status, body });
    }
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(ClientError::Json)
}
