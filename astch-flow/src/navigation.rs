//! Pure mapping from terminal flow states to navigation targets.
//!
//! No business logic lives here; the functions only translate what the
//! payment machine and the unlock poller already decided.

use astch_sdk::objects::consultation::ConsultationChoiceStatus;
use uuid::Uuid;

use crate::error::FlowError;
use crate::payment::state::{PaymentState, PaymentStatus};

/// Where to send the user next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Payment confirmed.
    PaymentSuccess,
    /// Payment failed; the page must offer a retry affordance.
    PaymentFailure,
    /// The analysis is ready to view.
    Analysis { consultation_id: Uuid },
    /// Still processing server-side; "check back later", not a failure.
    AnalysisPending,
    /// The consultation pipeline itself failed.
    AnalysisFailed,
}

impl Route {
    /// The application path for this target.
    pub fn path(&self) -> String {
        match self {
            Route::PaymentSuccess => "/paiement/succes".to_string(),
            Route::PaymentFailure => "/paiement/echec".to_string(),
            Route::Analysis { consultation_id } => format!("/analyse/{consultation_id}"),
            Route::AnalysisPending => "/analyse/en-attente".to_string(),
            Route::AnalysisFailed => "/analyse/echec".to_string(),
        }
    }
}

/// Route for a payment state, `None` while the machine is not terminal.
pub fn route_for_payment(state: &PaymentState) -> Option<Route> {
    match state.status {
        PaymentStatus::Success => Some(Route::PaymentSuccess),
        PaymentStatus::Failure => Some(Route::PaymentFailure),
        PaymentStatus::Pending | PaymentStatus::Processing => None,
    }
}

/// Route for an unlock poll outcome.
///
/// A timeout is deliberately routed to the "still processing" page rather
/// than a failure page; only a failed pipeline is a failure. Cancellation
/// maps to no route at all: the observer is gone.
pub fn route_for_unlock(
    outcome: &Result<ConsultationChoiceStatus, FlowError>,
) -> Option<Route> {
    match outcome {
        Ok(status) => match status.consultation_id {
            Some(consultation_id) => Some(Route::Analysis { consultation_id }),
            None => Some(Route::AnalysisPending),
        },
        Err(FlowError::Timeout { .. }) => Some(Route::AnalysisPending),
        Err(FlowError::AnalysisFailed { .. }) => Some(Route::AnalysisFailed),
        Err(FlowError::Cancelled) => None,
        Err(FlowError::Client(_)) => Some(Route::AnalysisPending),
    }
}
