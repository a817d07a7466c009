//! Consultation unlock poller.
//!
//! After a verified payment the backend pipeline still has to produce the
//! analysis. The poller is responsible for:
//! - Polling `consultation-choice-status` on a stepped backoff schedule
//! - Publishing each observed status through a `watch` channel
//! - Terminating when the button reaches `VOIR L'ANALYSE`, when the
//!   consultation pipeline reports failure, or when the poll budget runs out
//! - Stopping immediately (no further requests or snapshots) when the
//!   handle is cancelled or dropped

pub mod interval;

use std::sync::Arc;

use astch_sdk::client::{BackendClient, ClientError};
use astch_sdk::objects::consultation::{
    ButtonStatus, Consultation, ConsultationChoiceStatus, ConsultationStatus,
};
use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::PollConfig;
use crate::error::FlowError;
use interval::{poll_backoff, with_jitter};

/// Seam over the backend endpoints the poller needs.
#[async_trait]
pub trait ConsultationApi: Send + Sync + 'static {
    async fn consultation_choice_status(
        &self,
        user_id: Uuid,
        choice_id: Uuid,
    ) -> Result<ConsultationChoiceStatus, ClientError>;

    async fn consultation(&self, id: Uuid) -> Result<Consultation, ClientError>;
}

#[async_trait]
impl ConsultationApi for BackendClient {
    async fn consultation_choice_status(
        &self,
        user_id: Uuid,
        choice_id: Uuid,
    ) -> Result<ConsultationChoiceStatus, ClientError> {
        BackendClient::consultation_choice_status(self, user_id, choice_id).await
    }

    async fn consultation(&self, id: Uuid) -> Result<Consultation, ClientError> {
        BackendClient::consultation(self, id).await
    }
}

/// What an observer currently knows about the unlock progress.
///
/// Right after a successful payment the client optimistically assumes the
/// backend has registered the consultation before any poll confirms it. The
/// tag keeps that assumption distinguishable from authoritative data, so a
/// later server response reconciles or rolls it back without ambiguity.
#[derive(Debug, Clone, PartialEq)]
pub enum UnlockState {
    /// Local assumption, not yet confirmed by the backend.
    PendingConfirmation { expected: ButtonStatus },
    /// Authoritative status from the last poll.
    Observed(ConsultationChoiceStatus),
}

impl UnlockState {
    /// The optimistic state to publish right after payment success.
    pub fn pending_after_payment() -> Self {
        UnlockState::PendingConfirmation {
            expected: ButtonStatus::ReponseEnAttente,
        }
    }

    /// The button status an observer should render.
    pub fn button_status(&self) -> ButtonStatus {
        match self {
            UnlockState::PendingConfirmation { expected } => *expected,
            UnlockState::Observed(status) => status.button_status,
        }
    }

    /// Whether the value is still the optimistic assumption.
    pub fn is_confirmed(&self) -> bool {
        matches!(self, UnlockState::Observed(_))
    }
}

/// Polls the consultation pipeline until the analysis is ready.
pub struct UnlockPoller<B> {
    backend: Arc<B>,
    config: PollConfig,
}

impl<B: ConsultationApi> UnlockPoller<B> {
    pub fn new(backend: Arc<B>, config: PollConfig) -> Self {
        Self { backend, config }
    }

    /// Run the poll loop until a terminal condition.
    ///
    /// Each observed status is published through `state_tx`. Transport
    /// errors and the `has_active_consultation == false` inconsistency (the
    /// backend may not have registered the consultation yet) are transient:
    /// they consume an attempt and the loop goes on.
    pub async fn run(
        &self,
        user_id: Uuid,
        choice_id: Uuid,
        mut shutdown_rx: watch::Receiver<bool>,
        state_tx: watch::Sender<UnlockState>,
    ) -> Result<ConsultationChoiceStatus, FlowError> {
        info!(%user_id, %choice_id, max_attempts = self.config.max_attempts, "unlock polling started");

        for attempt in 0..self.config.max_attempts {
            if *shutdown_rx.borrow() {
                info!(%user_id, %choice_id, "unlock polling cancelled");
                return Err(FlowError::Cancelled);
            }

            match self
                .backend
                .consultation_choice_status(user_id, choice_id)
                .await
            {
                Ok(status) => {
                    let _ = state_tx.send(UnlockState::Observed(status.clone()));

                    if status.button_status == ButtonStatus::VoirLAnalyse {
                        info!(%user_id, %choice_id, attempt, "analysis ready");
                        return Ok(status);
                    }

                    if !status.has_active_consultation {
                        // Payment went through but the consultation is not
                        // registered yet; treat as transient and retry.
                        debug!(%user_id, %choice_id, attempt, "no active consultation yet");
                    } else if let Some(consultation_id) = status.consultation_id {
                        if let Some(err) = self.check_pipeline(consultation_id).await {
                            return Err(err);
                        }
                    }
                }
                Err(e) => {
                    warn!(%user_id, %choice_id, attempt, error = %e, "status poll failed, will retry");
                }
            }

            let mut delay = poll_backoff(attempt);
            if self.config.jitter {
                delay = with_jitter(delay);
            }

            tokio::select! {
                biased;

                changed = shutdown_rx.changed() => {
                    // A dropped sender means the handle is gone; stop either way.
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!(%user_id, %choice_id, "unlock polling cancelled");
                        return Err(FlowError::Cancelled);
                    }
                }

                _ = tokio::time::sleep(delay) => {}
            }
        }

        warn!(%user_id, %choice_id, attempts = self.config.max_attempts, "unlock polling timed out");
        Err(FlowError::Timeout {
            attempts: self.config.max_attempts,
        })
    }

    /// Look at the consultation record itself; a `failed` pipeline status is
    /// terminal, anything else keeps the loop going.
    async fn check_pipeline(&self, consultation_id: Uuid) -> Option<FlowError> {
        match self.backend.consultation(consultation_id).await {
            Ok(consultation) if consultation.status == ConsultationStatus::Failed => {
                warn!(%consultation_id, "consultation pipeline failed");
                Some(FlowError::AnalysisFailed { consultation_id })
            }
            Ok(consultation) => {
                debug!(%consultation_id, status = ?consultation.status, "pipeline still working");
                None
            }
            Err(e) => {
                warn!(%consultation_id, error = %e, "consultation fetch failed, will retry");
                None
            }
        }
    }

    /// Spawn the poll loop as an owned task.
    ///
    /// Returns the handle plus the receiver for state snapshots. The
    /// receiver starts at the optimistic post-payment state. Dropping the
    /// handle aborts the task, so no snapshot or HTTP call can happen after
    /// the observer goes away.
    pub fn spawn(
        self,
        user_id: Uuid,
        choice_id: Uuid,
    ) -> (UnlockHandle, watch::Receiver<UnlockState>) {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (state_tx, state_rx) = watch::channel(UnlockState::pending_after_payment());

        let task = tokio::spawn(async move {
            self.run(user_id, choice_id, shutdown_rx, state_tx).await
        });

        (
            UnlockHandle {
                shutdown_tx,
                task: Some(task),
            },
            state_rx,
        )
    }
}

/// Owning handle for a spawned unlock poll task.
pub struct UnlockHandle {
    shutdown_tx: watch::Sender<bool>,
    task: Option<JoinHandle<Result<ConsultationChoiceStatus, FlowError>>>,
}

impl UnlockHandle {
    /// Ask the task to stop after the current poll settles.
    pub fn cancel(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Wait for the poll loop to finish and return its outcome.
    pub async fn join(mut self) -> Result<ConsultationChoiceStatus, FlowError> {
        let Some(task) = self.task.take() else {
            return Err(FlowError::Cancelled);
        };
        match task.await {
            Ok(outcome) => outcome,
            Err(_) => Err(FlowError::Cancelled),
        }
    }
}

impl Drop for UnlockHandle {
    fn drop(&mut self) {
        if let Some(task) = &self.task {
            task.abort();
        }
    }
}
