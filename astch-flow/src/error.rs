//! Flow-level error taxonomy.

use astch_sdk::client::ClientError;
use uuid::Uuid;

/// Errors surfaced by the orchestration flow.
///
/// Payment-side client errors never escape [`PaymentFlow`]; they are folded
/// into the state's `error` string. This enum covers the unlock poller,
/// which does return its outcome to the caller.
///
/// [`PaymentFlow`]: crate::payment::driver::PaymentFlow
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    /// An SDK client call failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The analysis was still not ready after the configured poll budget.
    #[error("analysis not ready after {attempts} polls")]
    Timeout { attempts: u32 },

    /// The backend pipeline marked the consultation as failed.
    #[error("consultation {consultation_id} failed processing")]
    AnalysisFailed { consultation_id: Uuid },

    /// The poll task was cancelled before reaching a terminal state.
    #[error("unlock polling was cancelled")]
    Cancelled,
}
