use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

/// Default lifetime of an issued code (5 minutes)
pub const DEFAULT_OTP_TTL_SECONDS: u64 = 300;

/// Upper bound on code lifetime (24 hours)
pub const MAX_OTP_TTL_SECONDS: u64 = 24 * 60 * 60;

/// Default sweep schedule: top of every minute
pub const DEFAULT_OTP_SWEEP_CRON: &str = "0 * * * * *";

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub twilio_account_sid: String,
    pub twilio_auth_token: String,
    pub twilio_phone_number: String,
    pub otp_ttl: Duration,
    pub otp_max_attempts: Option<u32>,
    /// Cron expression for the expired-code sweep. `None` disables it.
    pub otp_sweep_cron: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let otp_ttl_seconds: u64 = match env::var("OTP_TTL_SECONDS") {
            Ok(raw) => raw
                .trim()
                .parse()
                .context("OTP_TTL_SECONDS must be a valid number")?,
            Err(_) => DEFAULT_OTP_TTL_SECONDS,
        };
        if otp_ttl_seconds == 0 {
            bail!("OTP_TTL_SECONDS must be greater than zero");
        }
        if otp_ttl_seconds > MAX_OTP_TTL_SECONDS {
            bail!(
                "OTP_TTL_SECONDS must be at most {} (24 hours)",
                MAX_OTP_TTL_SECONDS
            );
        }

        let otp_max_attempts = match env::var("OTP_MAX_ATTEMPTS") {
            Ok(raw) if !raw.trim().is_empty() => {
                let attempts: u32 = raw
                    .trim()
                    .parse()
                    .context("OTP_MAX_ATTEMPTS must be a valid number")?;
                if attempts == 0 {
                    bail!("OTP_MAX_ATTEMPTS must be greater than zero");
                }
                Some(attempts)
            }
            _ => None,
        };

        let otp_sweep_cron = match env::var("OTP_SWEEP_CRON") {
            Ok(raw) if raw.trim().is_empty() => None,
            Ok(raw) => Some(raw.trim().to_string()),
            Err(_) => Some(DEFAULT_OTP_SWEEP_CRON.to_string()),
        };

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            twilio_account_sid: required("TWILIO_ACCOUNT_SID")?,
            twilio_auth_token: required("TWILIO_AUTH_TOKEN")?,
            twilio_phone_number: required("TWILIO_PHONE_NUMBER")?,
            otp_ttl: Duration::from_secs(otp_ttl_seconds),
            otp_max_attempts,
            otp_sweep_cron,
        })
    }
}

fn required(name: &str) -> Result<String> {
    let value = env::var(name).with_context(|| format!("{} must be set", name))?;
    if value.trim().is_empty() {
        bail!("{} must not be empty", name);
    }
    Ok(value)
}
