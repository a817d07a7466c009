#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

//! Orchestration core for the astro-checkout purchase flow.
//!
//! Drives the payment lifecycle (initiate → redirect → verify) as an
//! explicit state machine, polls the consultation pipeline until an analysis
//! is ready, and maps terminal states to navigation targets. All remote I/O
//! goes through the `astch-sdk` clients behind small trait seams.

pub mod config;
pub mod error;
pub mod navigation;
pub mod payment;
pub mod session;
pub mod unlock;

pub use config::PollConfig;
pub use error::FlowError;
pub use navigation::Route;
pub use payment::driver::PaymentFlow;
pub use payment::state::{PaymentState, PaymentStatus};
pub use unlock::{UnlockHandle, UnlockPoller, UnlockState};
