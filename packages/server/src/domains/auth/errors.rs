use thiserror::Error;

/// Failures surfaced by the OTP lifecycle. None are retried internally.
#[derive(Error, Debug)]
pub enum OtpError {
    /// Caller error: a required field was missing or blank
    #[error("{0}")]
    Validation(String),

    /// No pending challenge; caller should request a new code
    #[error("No code was requested for this number")]
    NotFound,

    /// Challenge lapsed; caller should request a new code
    #[error("Code expired. Request a new one")]
    Expired,

    /// Wrong code; caller may retry verification
    #[error("Invalid code")]
    InvalidCode,

    /// Attempt limit reached; the challenge was discarded
    #[error("Too many invalid attempts. Request a new code")]
    TooManyAttempts,

    /// Notifier failed; caller should retry issuing
    #[error("Failed to send SMS: {0}")]
    Delivery(#[source] anyhow::Error),
}

impl OtpError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
