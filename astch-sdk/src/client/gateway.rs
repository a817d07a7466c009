//! Payment gateway client (MoneyFusion-style provider).
//!
//! Pure I/O wrapper: every call is a single outbound HTTPS request and no
//! local state is mutated. The asynchronous payment lifecycle lives in
//! `astch-flow`, not here.

use reqwest::Client;

use super::{ClientError, parse_response};
use crate::config::GatewayConfig;
use crate::objects::payment::{
    InitiatePaymentConfig, InitiatePaymentResult, InitiateRaw, InitiateRequest, VerifyPaymentResult,
    VerifyRaw,
};

/// Typed HTTP client for the third-party payment provider.
///
/// The initiation endpoint lives under a merchant-specific path segment
/// (`{base}/{merchant_path}/pay/`); verification is keyed by the payment
/// token issued at initiation.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: Client,
    config: GatewayConfig,
}

impl GatewayClient {
    /// Create a new `GatewayClient` from its configuration.
    pub fn new(config: GatewayConfig) -> Self {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { http, config }
    }

    /// Replace the default `reqwest::Client` with a custom one.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// `POST {base}/{merchant_path}/pay/` – start a payment attempt.
    ///
    /// Validates the config locally first, then maps the provider's response:
    /// a `statut: false` payload becomes [`ClientError::Gateway`], and an
    /// acceptance missing either the token or the redirect URL is treated the
    /// same way. A returned `Ok` therefore always carries both.
    pub async fn initiate_payment(
        &self,
        config: &InitiatePaymentConfig,
    ) -> Result<InitiatePaymentResult, ClientError> {
        config.validate()?;

        let url = self
            .config
            .base_url
            .join(&format!("{}/pay/", self.config.merchant_path))?;

        let body = InitiateRequest::new(
            config,
            self.config.return_url.clone(),
            self.config.webhook_url.clone(),
        );

        let resp = self.http.post(url).json(&body).send().await?;

        let raw: InitiateRaw = parse_response(resp).await?;
        raw.into_result()
            .map_err(|e| ClientError::Gateway {
                message: e.to_string(),
            })
    }

    /// `GET {base}/paiementNotif/{token}` – current status of a payment
    /// attempt.
    ///
    /// An HTTP 404 means the token is unknown to the gateway and surfaces as
    /// [`ClientError::NotFound`].
    pub async fn verify_payment(&self, token: &str) -> Result<VerifyPaymentResult, ClientError> {
        let url = self
            .config
            .base_url
            .join(&format!("paiementNotif/{token}"))?;

        let resp = self.http.get(url).send().await?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound {
                resource: format!("payment token {token}"),
            });
        }

        let raw: VerifyRaw = parse_response(resp).await?;
        if !raw.statut {
            return Err(ClientError::Gateway {
                message: raw
                    .message
                    .unwrap_or_else(|| "verification rejected by the gateway".to_string()),
            });
        }
        let details = raw.data.ok_or_else(|| ClientError::Gateway {
            message: "verification payload missing payment data".to_string(),
        })?;

        Ok(VerifyPaymentResult {
            status: details.status,
            details,
        })
    }
}
