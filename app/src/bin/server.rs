//! QuickStay server.
//!
//! This binary:
//! - Loads configuration from the environment (and `.env`)
//! - Connects to `PostgreSQL` and applies migrations
//! - Wires the Stripe gateway, the confirmation notifier and the services
//! - Serves the HTTP API until Ctrl+C / SIGTERM, then drains in-flight
//!   requests for at most `SHUTDOWN_TIMEOUT` seconds
//!
//! # Usage
//!
//! ```bash
//! docker compose up -d postgres
//! STRIPE_SECRET_KEY=sk_test_... STRIPE_WEBHOOK_SECRET=whsec_... \
//!   cargo run --bin quickstay-server
//! ```

use quickstay::notify::{ConsoleNotifier, SmtpNotifier};
use quickstay::services::{BookingService, WebhookReconciler};
use quickstay::{build_router, AppState, Config};
use quickstay_core::{BookingStore, Clock, Notifier, SystemClock};
use quickstay_postgres::{PostgresBookingStore, PostgresRoomCatalog};
use quickstay_stripe::StripeGateway;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,quickstay=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("🏨 Starting QuickStay server...");

    // Load configuration
    let config = Config::from_env();
    config.validate()?;
    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        stripe_api = %config.stripe.api_base,
        smtp = config.email.smtp_host.is_some(),
        "Configuration loaded"
    );

    // Database
    let pool = quickstay_postgres::connect(&config.database.url, config.database.max_connections).await?;
    quickstay_postgres::migrate(&pool).await?;
    tracing::info!("✓ Database connected and migrated");

    let store: Arc<dyn BookingStore> = Arc::new(PostgresBookingStore::new(pool.clone()));
    let catalog = Arc::new(PostgresRoomCatalog::new(pool.clone()));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // Payment gateway
    let gateway = Arc::new(StripeGateway::new(config.stripe_config(), Arc::clone(&clock))?);
    tracing::info!("✓ Stripe gateway configured");

    // Confirmation emails
    let notifier: Arc<dyn Notifier> = match &config.email.smtp_host {
        Some(host) => Arc::new(SmtpNotifier::new(
            host.as_str(),
            config.email.smtp_port,
            config.email.smtp_username.as_str(),
            config.email.smtp_password.as_str(),
            &config.email.sender,
            config.email.currency_symbol.as_str(),
        )?),
        None => {
            tracing::warn!("SMTP_HOST not set, booking confirmations will only be logged");
            Arc::new(ConsoleNotifier::new(config.email.currency_symbol.as_str()))
        },
    };

    // Services
    let bookings = BookingService::new(
        Arc::clone(&store),
        catalog,
        gateway.clone(),
        notifier,
        clock,
    );
    let reconciler = WebhookReconciler::new(
        Arc::clone(&store),
        gateway,
        config.webhook.ack_unknown_bookings,
    );

    let mut state = AppState::new(Arc::new(bookings), Arc::new(reconciler), store);
    match quickstay::metrics::install() {
        Ok(handle) => state = state.with_metrics(handle),
        Err(e) => tracing::warn!(error = %e, "Metrics disabled"),
    }

    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "🏨 QuickStay is listening");

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.await;
            })
            .await
    });

    shutdown_signal().await;
    tracing::info!("Shutting down gracefully...");
    let _ = stop_tx.send(());

    match tokio::time::timeout(config.shutdown_timeout(), server).await {
        Ok(joined) => joined??,
        Err(_) => tracing::warn!(
            timeout_secs = config.server.shutdown_timeout,
            "In-flight requests did not finish in time"
        ),
    }

    pool.close().await;
    tracing::info!("✓ Shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
