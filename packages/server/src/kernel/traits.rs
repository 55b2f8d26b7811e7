// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// The OTP lifecycle lives in domains/auth and only talks to these traits.
//
// Naming convention: Base* for trait names (e.g., BaseNotifier, BaseClock)

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

// =============================================================================
// Notifier Trait (Infrastructure - SMS delivery)
// =============================================================================

#[async_trait]
pub trait BaseNotifier: Send + Sync {
    /// Deliver a text message to a destination (phone number).
    ///
    /// Single attempt; callers decide what a failure means.
    async fn send(&self, destination: &str, body: &str) -> Result<()>;
}

// =============================================================================
// Clock Trait (Infrastructure - time source)
// =============================================================================

pub trait BaseClock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
