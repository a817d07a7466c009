//! Pure payment state machine.
//!
//! [`PaymentState::apply`] is the single transition function; the async
//! driver translates gateway calls into [`PaymentEvent`]s and dispatches
//! them here. Keeping the transitions pure makes every invariant testable
//! without any I/O:
//!
//! - `loading` is true exactly between a `*Started` event and its settling
//!   event, on success and failure alike.
//! - `token` is only ever set by `InitiateSucceeded`.
//! - A `*Started` event while `loading` is already true is ignored, which is
//!   what prevents duplicate gateway requests.

use astch_sdk::objects::payment::PaymentDetails;
use compact_str::CompactString;
use url::Url;

/// Where the payment attempt currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PaymentStatus {
    /// No attempt started yet.
    #[default]
    Pending,
    /// Initiation or verification is under way, or the user is at the
    /// provider's payment page.
    Processing,
    /// The provider confirmed the payment. Terminal.
    Success,
    /// The attempt failed; `error` says why. Terminal until a retry.
    Failure,
}

/// The single state object exposed to observers of the flow.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PaymentState {
    pub status: PaymentStatus,
    /// Gateway token, set only after a successful initiation response.
    pub token: Option<CompactString>,
    /// Provider page to redirect the user to, set together with `token`.
    pub payment_url: Option<Url>,
    /// Provider-side record, set on verified success.
    pub details: Option<PaymentDetails>,
    /// True only while an initiation or verification call is outstanding.
    pub loading: bool,
    /// Human-readable failure description.
    pub error: Option<String>,
}

/// Events dispatched by the driver.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentEvent {
    InitiateStarted,
    InitiateSucceeded {
        token: CompactString,
        payment_url: Url,
    },
    InitiateFailed {
        message: String,
    },
    VerifyStarted,
    /// The provider still reports the attempt as pending.
    VerifyPending,
    VerifySucceeded {
        details: PaymentDetails,
    },
    VerifyFailed {
        message: String,
    },
    RetryRequested,
}

impl PaymentState {
    /// Apply one event. Returns `false` when the event was ignored, which
    /// happens only for `*Started` events racing an in-flight call and for
    /// `RetryRequested` outside of `Failure`.
    pub fn apply(&mut self, event: PaymentEvent) -> bool {
        match event {
            PaymentEvent::InitiateStarted => {
                if self.loading {
                    return false;
                }
                *self = PaymentState {
                    status: PaymentStatus::Processing,
                    loading: true,
                    ..PaymentState::default()
                };
                true
            }
            PaymentEvent::InitiateSucceeded { token, payment_url } => {
                self.loading = false;
                self.status = PaymentStatus::Processing;
                self.token = Some(token);
                self.payment_url = Some(payment_url);
                true
            }
            PaymentEvent::InitiateFailed { message } => {
                self.loading = false;
                self.status = PaymentStatus::Failure;
                self.error = Some(message);
                true
            }
            PaymentEvent::VerifyStarted => {
                if self.loading {
                    return false;
                }
                self.loading = true;
                self.error = None;
                true
            }
            PaymentEvent::VerifyPending => {
                self.loading = false;
                self.status = PaymentStatus::Processing;
                true
            }
            PaymentEvent::VerifySucceeded { details } => {
                self.loading = false;
                self.status = PaymentStatus::Success;
                self.details = Some(details);
                true
            }
            PaymentEvent::VerifyFailed { message } => {
                self.loading = false;
                self.status = PaymentStatus::Failure;
                self.error = Some(message);
                true
            }
            PaymentEvent::RetryRequested => {
                if self.status != PaymentStatus::Failure {
                    return false;
                }
                if self.token.is_some() {
                    // Same-token retry: go back to Processing and let the
                    // driver re-verify.
                    self.status = PaymentStatus::Processing;
                    self.error = None;
                } else {
                    *self = PaymentState::default();
                }
                true
            }
        }
    }

    /// Whether the machine reached a UI-terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self.status, PaymentStatus::Success | PaymentStatus::Failure)
    }
}
