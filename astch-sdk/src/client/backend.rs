//! Internal REST backend client.
//!
//! All endpoints live under `/api/v1/` and require a bearer token issued at
//! login. The client re-sends the token on every request; session lifecycle
//! is handled by the caller.

use compact_str::CompactString;
use reqwest::Client;
use uuid::Uuid;

use super::{ClientError, parse_response};
use crate::config::BackendConfig;
use crate::objects::account::{Offering, UserProfile};
use crate::objects::consultation::{Consultation, ConsultationChoiceStatus};

/// Typed HTTP client for the platform backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    config: BackendConfig,
    auth_token: CompactString,
}

impl BackendClient {
    /// Create a new `BackendClient` authenticated as one user.
    pub fn new(config: BackendConfig, auth_token: impl Into<CompactString>) -> Self {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            http,
            config,
            auth_token: auth_token.into(),
        }
    }

    /// Replace the default `reqwest::Client` with a custom one.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, ClientError> {
        let url = self.config.base_url.join(path)?;
        let resp = self
            .http
            .get(url)
            .bearer_auth(self.auth_token.as_str())
            .send()
            .await?;
        parse_response(resp).await
    }

    /// `GET /api/v1/consultation-choice-status/{user_id}/{choice_id}` –
    /// current button status for one user+choice pair.
    pub async fn consultation_choice_status(
        &self,
        user_id: Uuid,
        choice_id: Uuid,
    ) -> Result<ConsultationChoiceStatus, ClientError> {
        self.get_json(&format!(
            "consultation-choice-status/{user_id}/{choice_id}"
        ))
        .await
    }

    /// `GET /api/v1/consultations/{id}` – fetch a consultation record.
    pub async fn consultation(&self, id: Uuid) -> Result<Consultation, ClientError> {
        self.get_json(&format!("consultations/{id}")).await
    }

    /// `GET /api/v1/offerings` – list purchasable offerings.
    pub async fn offerings(&self) -> Result<Vec<Offering>, ClientError> {
        self.get_json("offerings").await
    }

    /// `GET /api/v1/users/me` – the authenticated user's profile.
    pub async fn me(&self) -> Result<UserProfile, ClientError> {
        self.get_json("users/me").await
    }
}
