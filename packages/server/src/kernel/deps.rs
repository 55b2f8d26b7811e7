//! Server dependencies (using traits for testability)
//!
//! This module provides the central dependency container used by the HTTP layer.
//! All external services use trait abstractions to enable testing.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use twilio::TwilioService;

use crate::domains::auth::{OtpService, OtpSettings};
use crate::kernel::{BaseClock, BaseNotifier};

// =============================================================================
// TwilioService Adapter (implements BaseNotifier trait)
// =============================================================================

/// Wrapper around TwilioService that implements BaseNotifier trait
pub struct TwilioAdapter(pub Arc<TwilioService>);

impl TwilioAdapter {
    pub fn new(service: Arc<TwilioService>) -> Self {
        Self(service)
    }
}

#[async_trait]
impl BaseNotifier for TwilioAdapter {
    async fn send(&self, destination: &str, body: &str) -> Result<()> {
        self.0
            .send_sms(destination, body)
            .await
            .map(|message| {
                tracing::debug!(sid = %message.sid, status = %message.status, "Twilio accepted message");
            })
            .map_err(|e| anyhow::anyhow!("{}", e))
    }
}

// =============================================================================
// System clock
// =============================================================================

/// Wall-clock time source used outside of tests
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl BaseClock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Server dependencies accessible to handlers and scheduled tasks
#[derive(Clone)]
pub struct ServerDeps {
    /// Owns every pending code for the lifetime of the process
    pub otp: Arc<OtpService>,
}

impl ServerDeps {
    /// Create new ServerDeps, wiring the OTP service to the given notifier and clock
    pub fn new(
        notifier: Arc<dyn BaseNotifier>,
        clock: Arc<dyn BaseClock>,
        settings: OtpSettings,
    ) -> Self {
        Self {
            otp: Arc::new(OtpService::new(notifier, clock, settings)),
        }
    }
}
