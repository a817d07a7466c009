//! Async driver owning the payment state machine.
//!
//! `PaymentFlow` sequences initiate → await-user-action → verify against the
//! gateway and publishes every state change through a `watch` channel, so
//! observers always see the latest snapshot and late readers never miss the
//! terminal state. Gateway errors are folded into the state's `error` string;
//! nothing here returns a `Result`.

use astch_sdk::client::{ClientError, GatewayClient};
use astch_sdk::objects::payment::{
    InitiatePaymentConfig, InitiatePaymentResult, ProviderStatus, VerifyPaymentResult,
};
use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::state::{PaymentEvent, PaymentState, PaymentStatus};

/// Seam over the payment gateway so the driver can be exercised against
/// scripted fakes.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn initiate_payment(
        &self,
        config: &InitiatePaymentConfig,
    ) -> Result<InitiatePaymentResult, ClientError>;

    async fn verify_payment(&self, token: &str) -> Result<VerifyPaymentResult, ClientError>;
}

#[async_trait]
impl PaymentGateway for GatewayClient {
    async fn initiate_payment(
        &self,
        config: &InitiatePaymentConfig,
    ) -> Result<InitiatePaymentResult, ClientError> {
        GatewayClient::initiate_payment(self, config).await
    }

    async fn verify_payment(&self, token: &str) -> Result<VerifyPaymentResult, ClientError> {
        GatewayClient::verify_payment(self, token).await
    }
}

/// Owns one payment attempt's state and the gateway used to advance it.
///
/// One instance per flow; nothing is shared across flows. The `watch`
/// sender is the single owner of the state, so concurrent observers read a
/// consistent snapshot and `send_if_modified` gives last-write-wins updates.
pub struct PaymentFlow<G> {
    gateway: G,
    state_tx: watch::Sender<PaymentState>,
}

impl<G: PaymentGateway> PaymentFlow<G> {
    /// Create a new flow in the `Pending` state.
    pub fn new(gateway: G) -> Self {
        let (state_tx, _) = watch::channel(PaymentState::default());
        Self { gateway, state_tx }
    }

    /// Current state snapshot.
    pub fn state(&self) -> PaymentState {
        self.state_tx.borrow().clone()
    }

    /// Subscribe to state changes (the UI-observer side).
    pub fn subscribe(&self) -> watch::Receiver<PaymentState> {
        self.state_tx.subscribe()
    }

    fn dispatch(&self, event: PaymentEvent) -> bool {
        self.state_tx.send_if_modified(|state| state.apply(event))
    }

    /// Start a payment attempt.
    ///
    /// A no-op while a call is already in flight (the duplicate-initiation
    /// guard). On gateway acceptance the state holds the token and the
    /// redirect URL; the caller is expected to send the user to
    /// `payment_url` and call [`verify`](Self::verify) once they return.
    pub async fn initiate(&self, config: &InitiatePaymentConfig) -> PaymentState {
        if !self.dispatch(PaymentEvent::InitiateStarted) {
            debug!("initiate ignored, a call is already in flight");
            return self.state();
        }

        match self.gateway.initiate_payment(config).await {
            Ok(result) => {
                info!(token = %result.token, "payment initiated");
                self.dispatch(PaymentEvent::InitiateSucceeded {
                    token: result.token,
                    payment_url: result.payment_url,
                });
            }
            Err(e) => {
                warn!(error = %e, "payment initiation failed");
                self.dispatch(PaymentEvent::InitiateFailed {
                    message: e.to_string(),
                });
            }
        }
        self.state()
    }

    /// Verify the attempt using the token stored at initiation.
    pub async fn verify(&self) -> PaymentState {
        let Some(token) = self.state().token else {
            self.dispatch(PaymentEvent::VerifyFailed {
                message: "no payment token to verify".to_string(),
            });
            return self.state();
        };
        self.verify_with(token.as_str()).await
    }

    /// Verify an explicit token (callback pages carry it in the URL).
    ///
    /// Provider `pending` keeps the machine in `Processing`; `paid` and
    /// `failure` settle it.
    pub async fn verify_with(&self, token: &str) -> PaymentState {
        if !self.dispatch(PaymentEvent::VerifyStarted) {
            debug!("verify ignored, a call is already in flight");
            return self.state();
        }

        match self.gateway.verify_payment(token).await {
            Ok(result) => match result.status {
                ProviderStatus::Success => {
                    info!(token, "payment verified");
                    self.dispatch(PaymentEvent::VerifySucceeded {
                        details: result.details,
                    });
                }
                ProviderStatus::Pending => {
                    debug!(token, "payment still pending at the provider");
                    self.dispatch(PaymentEvent::VerifyPending);
                }
                ProviderStatus::Failure => {
                    warn!(token, "provider reported the payment as failed");
                    self.dispatch(PaymentEvent::VerifyFailed {
                        message: format!("payment {token} was reported as failed"),
                    });
                }
            },
            Err(e) => {
                warn!(token, error = %e, "payment verification failed");
                self.dispatch(PaymentEvent::VerifyFailed {
                    message: e.to_string(),
                });
            }
        }
        self.state()
    }

    /// Retry after a failure: re-verifies when a token exists, otherwise
    /// resets the machine so the caller can re-initiate.
    pub async fn retry(&self) -> PaymentState {
        if !self.dispatch(PaymentEvent::RetryRequested) {
            return self.state();
        }
        if self.state().token.is_some() {
            return self.verify().await;
        }
        self.state()
    }

    /// Convenience predicate for UI triggers.
    pub fn is_loading(&self) -> bool {
        self.state_tx.borrow().loading
    }

    /// Whether the attempt reached `Success`.
    pub fn is_success(&self) -> bool {
        self.state_tx.borrow().status == PaymentStatus::Success
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use astch_sdk::objects::payment::{LineItem, PaymentDetails};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sample_config() -> InitiatePaymentConfig {
        InitiatePaymentConfig {
            amount: 5000,
            customer_phone: "0758385387".into(),
            customer_name: "Awa Koné".to_string(),
            items: vec![LineItem {
                name: "Consultation".to_string(),
                price: 5000,
            }],
        }
    }

    fn details(status: ProviderStatus) -> PaymentDetails {
        PaymentDetails {
            token: "abc123".into(),
            amount: 5000,
            customer_phone: "0758385387".into(),
            customer_name: "Awa Koné".to_string(),
            status,
            method: Some("orange".to_string()),
            created_at: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Scripted gateway fake with call counters.
    #[derive(Default)]
    struct FakeGateway {
        initiate_calls: AtomicUsize,
        verify_calls: AtomicUsize,
        initiate_results: Mutex<VecDeque<Result<InitiatePaymentResult, ClientError>>>,
        verify_results: Mutex<VecDeque<Result<VerifyPaymentResult, ClientError>>>,
    }

    impl FakeGateway {
        fn push_initiate(&self, result: Result<InitiatePaymentResult, ClientError>) {
            self.initiate_results.lock().unwrap().push_back(result);
        }

        fn push_verify(&self, result: Result<VerifyPaymentResult, ClientError>) {
            self.verify_results.lock().unwrap().push_back(result);
        }

        fn accepted() -> InitiatePaymentResult {
            InitiatePaymentResult {
                token: "abc123".into(),
                payment_url: "https://pay.example.com/abc123".parse().unwrap(),
            }
        }
    }

    #[async_trait]
    impl PaymentGateway for &FakeGateway {
        async fn initiate_payment(
            &self,
            _config: &InitiatePaymentConfig,
        ) -> Result<InitiatePaymentResult, ClientError> {
            // Yield once so concurrently-started calls overlap in flight.
            tokio::task::yield_now().await;
            self.initiate_calls.fetch_add(1, Ordering::SeqCst);
            self.initiate_results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(FakeGateway::accepted()))
        }

        async fn verify_payment(
            &self,
            _token: &str,
        ) -> Result<VerifyPaymentResult, ClientError> {
            self.verify_calls.fetch_add(1, Ordering::SeqCst);
            self.verify_results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| {
                    Ok(VerifyPaymentResult {
                        status: ProviderStatus::Pending,
                        details: details(ProviderStatus::Pending),
                    })
                })
        }
    }

    #[tokio::test]
    async fn initiate_success_holds_token_and_url() {
        let gateway = FakeGateway::default();
        gateway.push_initiate(Ok(FakeGateway::accepted()));
        let flow = PaymentFlow::new(&gateway);

        let state = flow.initiate(&sample_config()).await;

        assert_eq!(state.status, PaymentStatus::Processing);
        assert_eq!(state.token.as_deref(), Some("abc123"));
        assert!(state.payment_url.is_some());
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn verify_failure_sets_failure_state() {
        let gateway = FakeGateway::default();
        gateway.push_initiate(Ok(FakeGateway::accepted()));
        gateway.push_verify(Ok(VerifyPaymentResult {
            status: ProviderStatus::Failure,
            details: details(ProviderStatus::Failure),
        }));
        let flow = PaymentFlow::new(&gateway);

        flow.initiate(&sample_config()).await;
        let state = flow.verify().await;

        assert_eq!(state.status, PaymentStatus::Failure);
        assert!(state.error.is_some());
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn verify_success_stores_details() {
        let gateway = FakeGateway::default();
        gateway.push_initiate(Ok(FakeGateway::accepted()));
        gateway.push_verify(Ok(VerifyPaymentResult {
            status: ProviderStatus::Success,
            details: details(ProviderStatus::Success),
        }));
        let flow = PaymentFlow::new(&gateway);

        flow.initiate(&sample_config()).await;
        let state = flow.verify().await;

        assert_eq!(state.status, PaymentStatus::Success);
        assert_eq!(
            state.details.as_ref().map(|d| d.amount),
            Some(5000)
        );
        assert!(flow.is_success());
    }

    #[tokio::test]
    async fn gateway_errors_never_escape() {
        let gateway = FakeGateway::default();
        gateway.push_initiate(Err(ClientError::Gateway {
            message: "solde insuffisant".to_string(),
        }));
        let flow = PaymentFlow::new(&gateway);

        let state = flow.initiate(&sample_config()).await;

        assert_eq!(state.status, PaymentStatus::Failure);
        assert_eq!(state.error.as_deref(), Some("gateway error: solde insuffisant"));
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn verify_without_token_fails_cleanly() {
        let gateway = FakeGateway::default();
        let flow = PaymentFlow::new(&gateway);

        let state = flow.verify().await;

        assert_eq!(state.status, PaymentStatus::Failure);
        assert_eq!(gateway.verify_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn retry_reverifies_with_same_token() {
        let gateway = FakeGateway::default();
        gateway.push_initiate(Ok(FakeGateway::accepted()));
        gateway.push_verify(Ok(VerifyPaymentResult {
            status: ProviderStatus::Failure,
            details: details(ProviderStatus::Failure),
        }));
        gateway.push_verify(Ok(VerifyPaymentResult {
            status: ProviderStatus::Success,
            details: details(ProviderStatus::Success),
        }));
        let flow = PaymentFlow::new(&gateway);

        flow.initiate(&sample_config()).await;
        flow.verify().await;
        let state = flow.retry().await;

        assert_eq!(state.status, PaymentStatus::Success);
        assert_eq!(gateway.verify_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn concurrent_initiation_hits_gateway_once() {
        let gateway = FakeGateway::default();
        let flow = PaymentFlow::new(&gateway);
        let config = sample_config();

        tokio::join!(flow.initiate(&config), flow.initiate(&config));

        assert_eq!(gateway.initiate_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn observers_see_terminal_state() {
        let gateway = FakeGateway::default();
        gateway.push_initiate(Ok(FakeGateway::accepted()));
        let flow = PaymentFlow::new(&gateway);
        let rx = flow.subscribe();

        flow.initiate(&sample_config()).await;

        assert_eq!(rx.borrow().token.as_deref(), Some("abc123"));
    }
}
