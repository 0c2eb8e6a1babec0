//! Cartwheel storefront - Session-scoped shopping cart service.
//!
//! This binary serves the cart API on port 8080.
//!
//! # Architecture
//!
//! - Axum web framework, JSON in and out
//! - In-memory catalog loaded once at startup
//! - In-memory session store, one cart per `X-Session-Id`
//!
//! Nothing is persisted: carts and orders are lost when the process exits.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::process::ExitCode;

use cartwheel_storefront::config::ShopConfig;
use cartwheel_storefront::services::sessions::spawn_idle_session_reaper;
use cartwheel_storefront::state::AppState;
use cartwheel_storefront::{routes, telemetry};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ShopConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match ShopConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);
    // Held until exit so buffered file logs are flushed
    let _log_guard = match telemetry::init(&config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    let state = match AppState::from_config(&config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load catalog");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(
        products = state.catalog().len(),
        source = %config
            .catalog_path
            .as_deref()
            .map_or_else(|| "builtin".into(), |p| p.display().to_string()),
        "Catalog loaded"
    );

    let reaper = config.session_idle_timeout.map(|max_idle| {
        tracing::info!(idle_timeout_secs = max_idle.as_secs(), "Session eviction enabled");
        spawn_idle_session_reaper(state.store_handle(), max_idle)
    });

    let app = routes::app(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let addr = config.socket_addr();
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "Failed to bind to address");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!("storefront listening on {}", addr);

    let served = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await;

    if let Some(reaper) = reaper {
        reaper.abort();
    }

    match served {
        Ok(()) => {
            tracing::info!("Server stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
