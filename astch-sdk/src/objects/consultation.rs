//! Consultation and rubrique-choice types.
//!
//! These are read-only views of the backend's consultation pipeline. The
//! client never mutates a choice status; it only observes the backend-driven
//! transitions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The action currently offered to the user for one rubrique choice.
///
/// Serialized as the exact display strings the platform uses. The backend
/// only ever moves a choice forward, so the derived ordering
/// (`Consulter < ReponseEnAttente < VoirLAnalyse`) matches the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ButtonStatus {
    /// The user can request a new consultation.
    #[serde(rename = "CONSULTER")]
    Consulter,
    /// A consultation is in flight; the analysis is not ready yet.
    #[serde(rename = "RÉPONSE EN ATTENTE")]
    ReponseEnAttente,
    /// The analysis is ready to view.
    #[serde(rename = "VOIR L'ANALYSE")]
    VoirLAnalyse,
}

impl std::fmt::Display for ButtonStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ButtonStatus::Consulter => write!(f, "CONSULTER"),
            ButtonStatus::ReponseEnAttente => write!(f, "RÉPONSE EN ATTENTE"),
            ButtonStatus::VoirLAnalyse => write!(f, "VOIR L'ANALYSE"),
        }
    }
}

/// Current state of one user+choice pair, as served by
/// `GET /api/v1/consultation-choice-status/{user_id}/{choice_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsultationChoiceStatus {
    #[serde(rename = "choiceId")]
    pub choice_id: Uuid,
    #[serde(rename = "choiceTitle")]
    pub choice_title: String,
    #[serde(rename = "buttonStatus")]
    pub button_status: ButtonStatus,
    #[serde(rename = "hasActiveConsultation")]
    pub has_active_consultation: bool,
    #[serde(rename = "consultationId")]
    pub consultation_id: Option<Uuid>,
}

/// Processing status of a purchased consultation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsultationStatus {
    Processing,
    Completed,
    Failed,
}

/// A purchased unit of analysis work.
///
/// The flow only reads `status`; the remainder of the record (themes,
/// generated analysis text, timestamps) stays opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consultation {
    pub id: Uuid,
    pub status: ConsultationStatus,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_status_round_trips_display_strings() {
        let json = r#""RÉPONSE EN ATTENTE""#;
        let status: ButtonStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status, ButtonStatus::ReponseEnAttente);
        assert_eq!(serde_json::to_string(&status).unwrap(), json);
        assert_eq!(status.to_string(), "RÉPONSE EN ATTENTE");
    }

    #[test]
    fn button_status_ordering_follows_lifecycle() {
        assert!(ButtonStatus::Consulter < ButtonStatus::ReponseEnAttente);
        assert!(ButtonStatus::ReponseEnAttente < ButtonStatus::VoirLAnalyse);
    }

    #[test]
    fn choice_status_parses_backend_payload() {
        let json = r#"{
            "choiceId": "9b2d74f0-9a88-4c3e-a6f5-11b5b42e2a01",
            "choiceTitle": "Chemin de vie",
            "buttonStatus": "VOIR L'ANALYSE",
            "hasActiveConsultation": true,
            "consultationId": "3f1c2b9e-8f47-43e2-9a65-0d3af0a4c7b2"
        }"#;
        let status: ConsultationChoiceStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status.button_status, ButtonStatus::VoirLAnalyse);
        assert!(status.has_active_consultation);
        assert!(status.consultation_id.is_some());
    }

    #[test]
    fn consultation_keeps_unknown_fields() {
        let json = r#"{
            "id": "3f1c2b9e-8f47-43e2-9a65-0d3af0a4c7b2",
            "status": "processing",
            "theme": "numérologie",
            "requestedAt": "2026-02-10T09:30:00Z"
        }"#;
        let consultation: Consultation = serde_json::from_str(json).unwrap();
        assert_eq!(consultation.status, ConsultationStatus::Processing);
        assert!(consultation.extra.contains_key("theme"));
    }
}
