pub mod account;
pub mod consultation;
pub mod payment;
