//! Payment gateway request and response types.
//!
//! The provider's wire format uses French field names and a boolean `statut`
//! discriminator on every payload. The types here translate between that
//! format and the typed results the rest of the workspace consumes.

use std::collections::BTreeMap;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use url::Url;

/// A single purchasable line item in a payment request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    /// Price in currency minor units (integral CFA francs).
    pub price: u64,
}

/// Everything needed to start a payment attempt.
///
/// Amounts are integral minor units. The phone number must already be in the
/// provider's expected local format (10 ASCII digits); [`validate`] rejects
/// anything else before a request is built.
///
/// [`validate`]: InitiatePaymentConfig::validate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitiatePaymentConfig {
    pub amount: u64,
    pub customer_phone: CompactString,
    pub customer_name: String,
    pub items: Vec<LineItem>,
}

/// A locally-detected problem with an [`InitiatePaymentConfig`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidPaymentRequest {
    /// The amount was zero.
    #[error("amount must be a positive number of francs")]
    ZeroAmount,

    /// The phone number is not 10 ASCII digits.
    #[error("phone number must be 10 digits, got {got:?}")]
    MalformedPhone { got: String },

    /// The customer name was empty or whitespace.
    #[error("customer name must not be empty")]
    EmptyName,

    /// No line items were provided.
    #[error("at least one line item is required")]
    NoItems,
}

impl InitiatePaymentConfig {
    /// Check the config against the provider's input constraints.
    pub fn validate(&self) -> Result<(), InvalidPaymentRequest> {
        if self.amount == 0 {
            return Err(InvalidPaymentRequest::ZeroAmount);
        }
        if self.customer_phone.len() != 10
            || !self.customer_phone.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(InvalidPaymentRequest::MalformedPhone {
                got: self.customer_phone.to_string(),
            });
        }
        if self.customer_name.trim().is_empty() {
            return Err(InvalidPaymentRequest::EmptyName);
        }
        if self.items.is_empty() {
            return Err(InvalidPaymentRequest::NoItems);
        }
        Ok(())
    }
}

/// Initiation request in the provider's wire format.
#[derive(Debug, Clone, Serialize)]
pub struct InitiateRequest {
    #[serde(rename = "totalPrice")]
    pub total_price: u64,
    /// One `{name: price}` object per line item.
    pub article: Vec<BTreeMap<String, u64>>,
    #[serde(rename = "numeroSend")]
    pub numero_send: CompactString,
    #[serde(rename = "nomclient")]
    pub nom_client: String,
    pub return_url: Url,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<Url>,
}

impl InitiateRequest {
    /// Build the wire body from a validated config and the merchant URLs.
    pub fn new(
        config: &InitiatePaymentConfig,
        return_url: Url,
        webhook_url: Option<Url>,
    ) -> Self {
        let article = config
            .items
            .iter()
            .map(|item| BTreeMap::from([(item.name.clone(), item.price)]))
            .collect();
        Self {
            total_price: config.amount,
            article,
            numero_send: config.customer_phone.clone(),
            nom_client: config.customer_name.clone(),
            return_url,
            webhook_url,
        }
    }
}

/// Raw initiation response as sent by the provider.
///
/// On rejection `statut` is `false` and only `message` is populated; on
/// acceptance both `token` and `url` must be present.
#[derive(Debug, Clone, Deserialize)]
pub struct InitiateRaw {
    pub statut: bool,
    #[serde(default)]
    pub token: Option<CompactString>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub url: Option<Url>,
}

/// A provider rejection or malformed acceptance payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InitiateRejected {
    /// The provider declined the payment outright.
    #[error("gateway declined payment: {message}")]
    Declined { message: String },

    /// `statut` was `true` but a required field was missing.
    #[error("gateway acceptance payload missing {field}")]
    Incomplete { field: &'static str },
}

/// A fully-populated successful initiation: token plus redirect URL.
///
/// Constructed only through [`InitiateRaw::into_result`], so a success value
/// can never be missing either field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitiatePaymentResult {
    pub token: CompactString,
    pub payment_url: Url,
}

impl InitiateRaw {
    /// Turn the raw payload into a complete result or a rejection.
    pub fn into_result(self) -> Result<InitiatePaymentResult, InitiateRejected> {
        if !self.statut {
            let message = self
                .message
                .unwrap_or_else(|| "payment was rejected by the gateway".to_string());
            return Err(InitiateRejected::Declined { message });
        }
        let token = self
            .token
            .ok_or(InitiateRejected::Incomplete { field: "token" })?;
        let payment_url = self
            .url
            .ok_or(InitiateRejected::Incomplete { field: "url" })?;
        Ok(InitiatePaymentResult { token, payment_url })
    }
}

/// Payment attempt status as reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderStatus {
    Pending,
    #[serde(rename = "paid")]
    Success,
    #[serde(alias = "failed", alias = "no paid")]
    Failure,
}

impl std::fmt::Display for ProviderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderStatus::Pending => write!(f, "pending"),
            ProviderStatus::Success => write!(f, "paid"),
            ProviderStatus::Failure => write!(f, "failure"),
        }
    }
}

/// Details of one payment attempt, as echoed back by the verification
/// endpoint. Fields the flow does not care about are preserved in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentDetails {
    #[serde(rename = "tokenPay")]
    pub token: CompactString,
    #[serde(rename = "montant")]
    pub amount: u64,
    #[serde(rename = "numeroSend")]
    pub customer_phone: CompactString,
    #[serde(rename = "nomclient")]
    pub customer_name: String,
    #[serde(rename = "statut")]
    pub status: ProviderStatus,
    /// Payment method label ("orange", "mtn", ...), absent for pending attempts.
    #[serde(rename = "moyen", default)]
    pub method: Option<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<time::OffsetDateTime>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Raw verification response.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyRaw {
    pub statut: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<PaymentDetails>,
}

/// Outcome of a verification call: the attempt's current status plus the
/// full provider-side record.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifyPaymentResult {
    pub status: ProviderStatus,
    pub details: PaymentDetails,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> InitiatePaymentConfig {
        InitiatePaymentConfig {
            amount: 5000,
            customer_phone: "0758385387".into(),
            customer_name: "Awa Koné".to_string(),
            items: vec![LineItem {
                name: "Consultation numérologie".to_string(),
                price: 5000,
            }],
        }
    }

    #[test]
    fn valid_config_passes_validation() {
        assert_eq!(sample_config().validate(), Ok(()));
    }

    #[test]
    fn validation_rejects_bad_inputs() {
        let mut config = sample_config();
        config.amount = 0;
        assert_eq!(config.validate(), Err(InvalidPaymentRequest::ZeroAmount));

        let mut config = sample_config();
        config.customer_phone = "+22507583853".into();
        assert!(matches!(
            config.validate(),
            Err(InvalidPaymentRequest::MalformedPhone { .. })
        ));

        let mut config = sample_config();
        config.customer_name = "   ".to_string();
        assert_eq!(config.validate(), Err(InvalidPaymentRequest::EmptyName));

        let mut config = sample_config();
        config.items.clear();
        assert_eq!(config.validate(), Err(InvalidPaymentRequest::NoItems));
    }

    #[test]
    fn initiate_request_uses_provider_field_names() {
        let request = InitiateRequest::new(
            &sample_config(),
            "https://app.example.com/paiement/retour".parse().unwrap(),
            None,
        );
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["totalPrice"], 5000);
        assert_eq!(json["numeroSend"], "0758385387");
        assert_eq!(json["nomclient"], "Awa Koné");
        assert_eq!(json["article"][0]["Consultation numérologie"], 5000);
        assert!(json.get("webhook_url").is_none());
    }

    #[test]
    fn accepted_initiation_requires_token_and_url() {
        let raw: InitiateRaw = serde_json::from_str(
            r#"{"statut": true, "token": "abc123", "url": "https://pay.example.com/abc123"}"#,
        )
        .unwrap();
        let result = raw.into_result().unwrap();
        assert_eq!(result.token, "abc123");
        assert_eq!(result.payment_url.as_str(), "https://pay.example.com/abc123");

        let missing_url: InitiateRaw =
            serde_json::from_str(r#"{"statut": true, "token": "abc123"}"#).unwrap();
        assert_eq!(
            missing_url.into_result(),
            Err(InitiateRejected::Incomplete { field: "url" })
        );
    }

    #[test]
    fn declined_initiation_carries_provider_message() {
        let raw: InitiateRaw =
            serde_json::from_str(r#"{"statut": false, "message": "solde insuffisant"}"#).unwrap();
        assert_eq!(
            raw.into_result(),
            Err(InitiateRejected::Declined {
                message: "solde insuffisant".to_string()
            })
        );
    }

    #[test]
    fn verify_payload_parses_provider_statuses() {
        let raw: VerifyRaw = serde_json::from_str(
            r#"{
                "statut": true,
                "data": {
                    "tokenPay": "abc123",
                    "montant": 5000,
                    "numeroSend": "0758385387",
                    "nomclient": "Awa Koné",
                    "statut": "paid",
                    "moyen": "orange",
                    "personal_Info": [{"userId": "u-1"}]
                }
            }"#,
        )
        .unwrap();
        let details = raw.data.unwrap();
        assert_eq!(details.status, ProviderStatus::Success);
        assert_eq!(details.amount, 5000);
        assert!(details.extra.contains_key("personal_Info"));

        for wire in ["\"failure\"", "\"failed\"", "\"no paid\""] {
            let status: ProviderStatus = serde_json::from_str(wire).unwrap();
            assert_eq!(status, ProviderStatus::Failure);
        }
    }
}
