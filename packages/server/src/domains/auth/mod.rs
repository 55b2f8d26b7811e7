//! Auth domain - phone number ownership proof via SMS one-time passcodes
//!
//! Responsibilities:
//! - Generating and delivering 6-digit codes (via the injected notifier)
//! - Holding at most one pending code per phone number, with a TTL
//! - Single-use verification, expiry and invalidation

pub mod errors;
pub mod models;
pub mod otp_store;
pub mod service;

pub use errors::OtpError;
pub use models::PendingCode;
pub use otp_store::{ConsumeOutcome, OtpStore};
pub use service::{IssuedCode, OtpService, OtpSettings};
