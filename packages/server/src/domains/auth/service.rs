//! OTP lifecycle: issue a code and deliver it, verify and consume it.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::errors::OtpError;
use super::models::PendingCode;
use super::otp_store::{ConsumeOutcome, OtpStore};
use crate::kernel::{BaseClock, BaseNotifier};

/// Tunables for the OTP lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OtpSettings {
    /// How long an issued code is accepted
    pub ttl: Duration,
    /// Wrong guesses allowed per code before it is discarded. `None` = unlimited.
    pub max_attempts: Option<u32>,
}

impl Default for OtpSettings {
    fn default() -> Self {
        Self {
            ttl: Duration::minutes(5),
            max_attempts: None,
        }
    }
}

/// What the caller gets back from a successful issue
#[derive(Debug, Clone)]
pub struct IssuedCode {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

/// OTP Store & Lifecycle Manager
///
/// Owns the store; the notifier and clock are injected.
pub struct OtpService {
    store: OtpStore,
    notifier: Arc<dyn BaseNotifier>,
    clock: Arc<dyn BaseClock>,
    settings: OtpSettings,
}

impl OtpService {
    pub fn new(
        notifier: Arc<dyn BaseNotifier>,
        clock: Arc<dyn BaseClock>,
        settings: OtpSettings,
    ) -> Self {
        Self {
            store: OtpStore::new(),
            notifier,
            clock,
            settings,
        }
    }

    /// Generate, store and deliver a new code for `identifier`.
    ///
    /// Any previous code for the identifier stops working immediately. The
    /// notifier runs after the store lock is released. If delivery fails the
    /// record written here is removed again (unless a newer issue already
    /// replaced it) and `OtpError::Delivery` is returned.
    pub async fn issue(&self, identifier: &str) -> Result<IssuedCode, OtpError> {
        let identifier = required(identifier, "Phone number is required")?;

        let record = PendingCode::issue(identifier, self.clock.now(), self.settings.ttl);
        let issued = IssuedCode {
            code: record.code.clone(),
            expires_at: record.expires_at,
        };

        let (generation, replaced) = self.store.insert(record).await;
        if replaced {
            debug!(identifier, "Replaced previous pending code");
        }

        let message = format_message(&issued.code, self.settings.ttl);
        if let Err(e) = self.notifier.send(identifier, &message).await {
            let rolled_back = self.store.remove_if_current(identifier, generation).await;
            error!(identifier, rolled_back, error = %e, "Failed to send OTP");
            return Err(OtpError::Delivery(e));
        }

        info!(identifier, expires_at = %issued.expires_at, "OTP sent");
        Ok(issued)
    }

    /// Check `candidate` against the pending code for `identifier`.
    ///
    /// `Ok(())` consumes the code. Wrong codes leave it in place unless the
    /// attempt limit is configured and reached.
    pub async fn verify(&self, identifier: &str, candidate: &str) -> Result<(), OtpError> {
        let identifier = required(identifier, "Phone number and code are required")?;
        let candidate = required(candidate, "Phone number and code are required")?;

        let outcome = self
            .store
            .consume(
                identifier,
                candidate,
                self.clock.now(),
                self.settings.max_attempts,
            )
            .await;

        match outcome {
            ConsumeOutcome::Verified => {
                info!(identifier, "OTP verified");
                Ok(())
            }
            ConsumeOutcome::NotFound => {
                debug!(identifier, "No pending OTP");
                Err(OtpError::NotFound)
            }
            ConsumeOutcome::Expired => {
                warn!(identifier, "OTP expired");
                Err(OtpError::Expired)
            }
            ConsumeOutcome::Invalid { failed_attempts } => {
                warn!(identifier, failed_attempts, "Invalid OTP");
                Err(OtpError::InvalidCode)
            }
            ConsumeOutcome::LockedOut => {
                warn!(identifier, "OTP discarded after too many invalid attempts");
                Err(OtpError::TooManyAttempts)
            }
        }
    }

    /// Reap expired codes. Not needed for correctness; bounds memory.
    pub async fn sweep_expired(&self) -> usize {
        let removed = self.store.sweep_expired(self.clock.now()).await;
        if removed > 0 {
            debug!(removed, "Swept expired OTPs");
        }
        removed
    }

    pub async fn pending_count(&self) -> usize {
        self.store.len().await
    }
}

fn required<'a>(value: &'a str, message: &str) -> Result<&'a str, OtpError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(OtpError::validation(message));
    }
    Ok(trimmed)
}

fn format_message(code: &str, ttl: Duration) -> String {
    let minutes = ttl.num_minutes();
    if minutes >= 1 {
        format!(
            "Your verification code is: {}. It expires in {} minute{}.",
            code,
            minutes,
            if minutes == 1 { "" } else { "s" }
        )
    } else {
        format!("Your verification code is: {}", code)
    }
}
