//! Payment lifecycle: pure state machine plus the async driver that owns it.

pub mod driver;
pub mod state;
