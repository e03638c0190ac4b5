//! Steam sign-in gateway
//!
//! Single-binary service that:
//! 1. Redirects users to Steam's OpenID login
//! 2. Re-confirms the returned assertion with Steam
//! 3. Looks up the player profile and resolves a local user
//! 4. Issues a short-lived signed session token

mod config;
mod error;
mod metrics;
mod routes;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use login::{AuthOrchestrator, InMemoryResolver};
use session::{SystemClock, TokenCodec};
use steam_auth::{CallbackVerifier, ProfileFetcher};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::routes::{AppState, build_router};

/// Upper bound on draining in-flight requests after a shutdown signal
const DRAIN_TIMEOUT: Duration = Duration::from_secs(15);

/// Assemble the sign-in pipeline from validated configuration.
fn build_orchestrator(config: &Config, client: reqwest::Client) -> Result<AuthOrchestrator> {
    let signing = config.signing_config()?;
    let codec = TokenCodec::new(&signing, Arc::new(SystemClock))
        .context("failed to build session token codec")?;

    let verifier = CallbackVerifier::new(client.clone(), config.steam_openid_url()?)
        .with_timeout(config.steam_timeout());
    let profiles = ProfileFetcher::new(
        client,
        config.steam_api_url()?,
        config.steam_api_key.clone(),
    )
    .with_timeout(config.steam_timeout());

    Ok(AuthOrchestrator::new(
        config.redirect_config()?,
        verifier,
        profiles,
        Arc::new(InMemoryResolver::new()),
        Arc::new(codec),
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    // JSON logs, filtered by LOG_LEVEL or RUST_LOG
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("starting steam-auth-gateway");

    let prometheus = metrics::install_recorder().context("failed to install metrics recorder")?;

    let args: Vec<String> = std::env::args().collect();
    let cli_config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str());

    let config_path = Config::resolve_path(cli_config_path);
    let config = Config::load(config_path.as_deref()).with_context(|| match &config_path {
        Some(path) => format!("failed to load config from {}", path.display()),
        None => "failed to load config from environment".to_string(),
    })?;

    if config.steam_api_key.is_none() {
        warn!("STEAM_API_KEY not set; every login will fail at the profile lookup");
    }

    info!(
        listen_addr = %config.server.listen_addr,
        public_base_url = %config.public_base_url,
        algorithm = %config.session.algorithm,
        ttl_minutes = config.session.ttl_minutes,
        "configuration loaded"
    );

    let client = reqwest::Client::builder()
        .user_agent(concat!("steam-auth-gateway/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("failed to build HTTP client")?;

    let state = AppState {
        auth: Arc::new(build_orchestrator(&config, client)?),
        prometheus,
    };
    let app = build_router(state, config.server.max_connections);

    let listener = TcpListener::bind(config.server.listen_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.server.listen_addr))?;
    info!(addr = %config.server.listen_addr, "accepting requests");

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    shutdown_signal().await;
    let _ = shutdown_tx.send(());

    match tokio::time::timeout(DRAIN_TIMEOUT, server).await {
        Ok(Ok(Ok(()))) => info!("all in-flight requests drained"),
        Ok(Ok(Err(e))) => warn!(error = %e, "server error during shutdown"),
        Ok(Err(e)) => warn!(error = %e, "server task panicked"),
        Err(_) => warn!(
            drain_timeout_secs = DRAIN_TIMEOUT.as_secs(),
            "drain timeout exceeded, forcing shutdown"
        ),
    }

    info!("shutdown complete");
    Ok(())
}

/// Wait for SIGTERM or SIGINT.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
