use chrono::{DateTime, Duration, Utc};
use constant_time_eq::constant_time_eq;
use rand::rngs::OsRng;
use rand::Rng;
use std::fmt;

/// Number of digits in an issued code
pub const CODE_LENGTH: usize = 6;

/// Exclusive upper bound of the numeric code space (10^CODE_LENGTH)
const CODE_SPACE: u32 = 1_000_000;

/// PendingCode - one outstanding verification challenge for an identifier
///
/// Created on issue, destroyed on successful/expired verification or when a
/// newer code replaces it. The store is the only owner; callers get clones.
#[derive(Clone, PartialEq, Eq)]
pub struct PendingCode {
    pub identifier: String,
    pub code: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub failed_attempts: u32,
}

impl PendingCode {
    /// Build a challenge with a freshly generated code
    pub fn issue(identifier: &str, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self::with_code(identifier, generate_code(), now, ttl)
    }

    pub fn with_code(identifier: &str, code: String, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            identifier: identifier.to_string(),
            code,
            issued_at: now,
            // Saturates instead of panicking on absurd TTLs
            expires_at: now
                .checked_add_signed(ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
            failed_attempts: 0,
        }
    }

    /// Strictly after `expires_at`; the expiry instant itself is still valid
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Compare a candidate against the stored code in constant time
    pub fn matches(&self, candidate: &str) -> bool {
        constant_time_eq(self.code.as_bytes(), candidate.as_bytes())
    }
}

// Codes stay out of logs even when a record is debug-printed.
impl fmt::Debug for PendingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingCode")
            .field("identifier", &self.identifier)
            .field("code", &"******")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .field("failed_attempts", &self.failed_attempts)
            .finish()
    }
}

/// Generate a 6-digit code, uniform over 000000..=999999, from the OS CSPRNG
pub fn generate_code() -> String {
    let value: u32 = OsRng.gen_range(0..CODE_SPACE);
    format!("{:0width$}", value, width = CODE_LENGTH)
}
