// Main entry point for API server

use std::sync::Arc;

use anyhow::{Context, Result};
use server_core::domains::auth::OtpSettings;
use server_core::kernel::{start_scheduler, ServerDeps, SystemClock, TwilioAdapter};
use server_core::{server::build_app, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use twilio::{TwilioOptions, TwilioService};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting SMS verification API");

    // Load configuration; missing Twilio credentials stop the process here
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    // Create Twilio service
    let twilio = Arc::new(TwilioService::new(TwilioOptions {
        account_sid: config.twilio_account_sid.clone(),
        auth_token: config.twilio_auth_token.clone(),
        from_number: config.twilio_phone_number.clone(),
    }));

    let settings = OtpSettings {
        ttl: chrono::Duration::from_std(config.otp_ttl).context("OTP_TTL_SECONDS out of range")?,
        max_attempts: config.otp_max_attempts,
    };
    tracing::info!(
        ttl_seconds = settings.ttl.num_seconds(),
        max_attempts = ?settings.max_attempts,
        "OTP settings"
    );

    let deps = ServerDeps::new(
        Arc::new(TwilioAdapter::new(twilio)),
        Arc::new(SystemClock),
        settings,
    );

    // Keep the scheduler handle alive for the lifetime of the server
    let _scheduler = match &config.otp_sweep_cron {
        Some(cron) => Some(
            start_scheduler(deps.otp.clone(), cron)
                .await
                .context("Failed to start scheduled tasks")?,
        ),
        None => {
            tracing::info!("Expired OTP sweep disabled");
            None
        }
    };

    // Build application
    let app = build_app(deps);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
