// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ridebook API Server
//!
//! Serves the public ride directory and the admin curation API.

use anyhow::Context;
use ridebook::{
    config::{Config, StoreBackend},
    db::{FirestoreDb, MemoryStore, RideStore},
    services::{seed::seed_demo_data, GoogleOidcVerifier},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured JSON logging for GCP
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        port = config.port,
        store = ?config.store_backend,
        admins = config.admin_emails.len(),
        "Starting Ridebook API"
    );

    let store = open_store(&config).await?;

    let google_oidc_verifier = Arc::new(
        GoogleOidcVerifier::new(&config).context("Failed to initialize OIDC verifier")?,
    );

    let state = Arc::new(AppState::new(config.clone(), store.clone(), google_oidc_verifier));
    let app = ridebook::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped, closing ride store");
    store.close().await?;
    Ok(())
}

/// Open the configured ride store, seeding demo data into a memory store if asked.
async fn open_store(config: &Config) -> anyhow::Result<Arc<dyn RideStore>> {
    match config.store_backend {
        StoreBackend::Firestore => {
            let db = FirestoreDb::new(&config.gcp_project_id)
                .await
                .context("Failed to connect to Firestore")?;
            Ok(Arc::new(db))
        }
        StoreBackend::Memory => {
            let store = MemoryStore::new();
            if config.seed_demo_data {
                seed_demo_data(&store, chrono::Utc::now()).await?;
            }
            tracing::warn!("Using in-memory ride store; data is lost on restart");
            Ok(Arc::new(store))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM, shutting down");
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() -> anyhow::Result<()> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ridebook=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
