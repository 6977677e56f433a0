//! QuickKart Storefront - demo e-commerce site.
//!
//! This binary serves the storefront on port 3000 by default.
//!
//! # Architecture
//!
//! - Axum web framework with HTMX for interactivity
//! - Askama templates for server-side rendering
//! - Public product catalog REST API for products
//! - In-memory sessions holding each shopper's cart
//!
//! Nothing is persisted: restarting the process forgets every cart.

#![cfg_attr(not(test), forbid(unsafe_code))]

use quickkart_storefront::config::QuickKartConfig;
use quickkart_storefront::state::AppState;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Default log filter when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "quickkart_storefront=info,tower_http=debug";

/// Start Sentry when `SENTRY_DSN` is configured. The guard flushes on drop.
fn init_sentry(config: &QuickKartConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_deref()?;

    let options = sentry::ClientOptions {
        release: sentry::release_name!(),
        environment: config
            .sentry_environment
            .clone()
            .map(std::borrow::Cow::Owned),
        attach_stacktrace: true,
        ..Default::default()
    };
    Some(sentry::init((dsn, options)))
}

/// Warnings and errors become Sentry events; info and debug ride along as
/// breadcrumbs.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        tracing::Level::TRACE => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
#[allow(clippy::expect_used)]
async fn main() {
    let config = QuickKartConfig::from_env().expect("invalid QUICKKART_* configuration");

    // The Sentry client has to exist before the tracing layer that feeds it.
    let sentry_guard = init_sentry(&config);
    init_tracing();
    if sentry_guard.is_some() {
        tracing::info!("Sentry enabled");
    }

    let state = AppState::new(config.clone()).expect("failed to build the catalog client");
    tracing::info!(
        catalog = %config.catalog.base_url,
        payment_delay_ms = config.payment_delay.as_millis(),
        session_idle_secs = config.session_idle.as_secs(),
        "QuickKart configured"
    );

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind listen address");
    tracing::info!(%addr, "storefront listening");

    axum::serve(listener, quickkart_storefront::app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    drop(sentry_guard);
}

/// Resolve on Ctrl+C, or SIGTERM on unix. In-flight payment tasks are
/// dropped with the runtime.
#[allow(clippy::expect_used)]
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for Ctrl+C");
    };

    #[cfg(unix)]
    let terminate = async {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to listen for SIGTERM");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Ctrl+C received, draining connections"),
        () = terminate => tracing::info!("SIGTERM received, draining connections"),
    }
}
