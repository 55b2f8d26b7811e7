// TestDependencies - mock implementations for testing
//
// Provides mock services that can be injected into ServerDeps for tests.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::{BaseClock, BaseNotifier, ServerDeps};
use crate::domains::auth::OtpSettings;

// =============================================================================
// Mock Notifier
// =============================================================================

/// A message captured by the mock notifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub destination: String,
    pub body: String,
}

#[derive(Clone, Default)]
pub struct MockNotifier {
    sent: Arc<Mutex<Vec<SentMessage>>>,
    fail: Arc<AtomicBool>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// All delivery attempts, including failed ones
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, destination: &str) -> Vec<SentMessage> {
        self.sent()
            .into_iter()
            .filter(|m| m.destination == destination)
            .collect()
    }

    /// Pull the 6-digit code out of the most recent message to `destination`
    pub fn last_code_for(&self, destination: &str) -> Option<String> {
        self.sent_to(destination).last().and_then(|m| {
            m.body
                .split(|c: char| !c.is_ascii_digit())
                .find(|chunk| chunk.len() == 6)
                .map(str::to_string)
        })
    }
}

#[async_trait]
impl BaseNotifier for MockNotifier {
    async fn send(&self, destination: &str, body: &str) -> Result<()> {
        // Record the call
        self.sent.lock().unwrap().push(SentMessage {
            destination: destination.to_string(),
            body: body.to_string(),
        });

        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("mock notifier configured to fail");
        }
        Ok(())
    }
}

// =============================================================================
// Mock Clock
// =============================================================================

/// Manually advanced clock, shared between the test and the code under test
#[derive(Clone)]
pub struct MockClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl MockClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap())
    }
}

impl BaseClock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

/// Bundle of mocks plus the ServerDeps built from them
pub struct TestDependencies {
    pub notifier: MockNotifier,
    pub clock: MockClock,
    pub deps: ServerDeps,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self::with_settings(OtpSettings::default())
    }

    pub fn with_settings(settings: OtpSettings) -> Self {
        let notifier = MockNotifier::new();
        let clock = MockClock::default();
        let deps = ServerDeps::new(
            Arc::new(notifier.clone()),
            Arc::new(clock.clone()),
            settings,
        );
        Self {
            notifier,
            clock,
            deps,
        }
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
