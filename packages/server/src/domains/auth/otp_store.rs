//! In-memory store of pending codes.
//!
//! One mutex guards the whole map. Every operation is a single critical
//! section, so read-check-mutate sequences (verify, rollback, sweep) are
//! atomic with respect to each other. Nothing is awaited while the lock is
//! held except the lock itself.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;

use super::models::PendingCode;

/// Identifies one particular write, so a rollback never removes a newer code
pub type Generation = u64;

/// Result of checking a candidate against the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumeOutcome {
    /// Code matched; record removed
    Verified,
    /// No record for the identifier
    NotFound,
    /// Record was past its deadline; record removed
    Expired,
    /// Wrong code; record kept
    Invalid { failed_attempts: u32 },
    /// Wrong code and the attempt limit was reached; record removed
    LockedOut,
}

struct Entry {
    generation: Generation,
    record: PendingCode,
}

#[derive(Default)]
struct Inner {
    codes: HashMap<String, Entry>,
    next_generation: Generation,
}

/// In-memory OTP store
///
/// At most one pending code per identifier; inserts overwrite.
#[derive(Default)]
pub struct OtpStore {
    inner: Mutex<Inner>,
}

impl OtpStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the record for its identifier.
    ///
    /// Returns the generation of the new write and whether a previous
    /// record was replaced.
    pub async fn insert(&self, record: PendingCode) -> (Generation, bool) {
        let mut inner = self.inner.lock().await;
        inner.next_generation += 1;
        let generation = inner.next_generation;
        let replaced = inner
            .codes
            .insert(record.identifier.clone(), Entry { generation, record })
            .is_some();
        (generation, replaced)
    }

    /// Check `candidate` for `identifier` and apply the outcome atomically.
    ///
    /// With `max_attempts = None` wrong guesses never consume the record.
    pub async fn consume(
        &self,
        identifier: &str,
        candidate: &str,
        now: DateTime<Utc>,
        max_attempts: Option<u32>,
    ) -> ConsumeOutcome {
        let mut inner = self.inner.lock().await;

        let Some(entry) = inner.codes.get_mut(identifier) else {
            return ConsumeOutcome::NotFound;
        };

        if entry.record.is_expired_at(now) {
            inner.codes.remove(identifier);
            return ConsumeOutcome::Expired;
        }

        if entry.record.matches(candidate) {
            inner.codes.remove(identifier);
            return ConsumeOutcome::Verified;
        }

        entry.record.failed_attempts = entry.record.failed_attempts.saturating_add(1);
        let failed_attempts = entry.record.failed_attempts;

        match max_attempts {
            Some(limit) if failed_attempts >= limit => {
                inner.codes.remove(identifier);
                ConsumeOutcome::LockedOut
            }
            _ => ConsumeOutcome::Invalid { failed_attempts },
        }
    }

    /// Remove the record for `identifier` only if it is still the given write
    pub async fn remove_if_current(&self, identifier: &str, generation: Generation) -> bool {
        let mut inner = self.inner.lock().await;
        match inner.codes.get(identifier) {
            Some(entry) if entry.generation == generation => {
                inner.codes.remove(identifier);
                true
            }
            _ => false,
        }
    }

    /// Drop every record past its deadline. Returns how many were removed.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let mut inner = self.inner.lock().await;
        let before = inner.codes.len();
        inner.codes.retain(|_, entry| !entry.record.is_expired_at(now));
        before - inner.codes.len()
    }

    /// Copy of the current record, if any
    pub async fn get(&self, identifier: &str) -> Option<PendingCode> {
        let inner = self.inner.lock().await;
        inner.codes.get(identifier).map(|entry| entry.record.clone())
    }

    /// Number of records held, including expired ones not yet reaped
    pub async fn len(&self) -> usize {
        self.inner.lock().await.codes.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
