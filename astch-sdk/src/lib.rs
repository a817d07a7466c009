//! SDK for the astro-checkout consultation platform.
//!
//! Contains the wire objects exchanged with the MoneyFusion payment gateway
//! and the internal REST backend, plus typed HTTP clients for both.

#[cfg(feature = "client")]
pub mod client;
pub mod config;
pub mod objects;
