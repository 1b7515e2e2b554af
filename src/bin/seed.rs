// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Write demo groups and rides into the configured Firestore project.
//!
//! Honors `GCP_PROJECT_ID` and `FIRESTORE_EMULATOR_HOST`. Records with the
//! demo ids are replaced, so running it twice is harmless.

use anyhow::Context;
use ridebook::db::{FirestoreDb, RideStore};
use ridebook::services::seed::seed_demo_data;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    dotenvy::dotenv().ok();
    let project_id = std::env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string());

    let db = FirestoreDb::new(&project_id)
        .await
        .context("Failed to connect to Firestore")?;

    let summary = seed_demo_data(&db, chrono::Utc::now()).await?;
    tracing::info!(
        project = %project_id,
        groups = summary.groups,
        rides = summary.rides,
        "Seed complete"
    );

    db.close().await?;
    Ok(())
}
