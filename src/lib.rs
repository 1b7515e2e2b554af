// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Ridebook: a directory of upcoming group bike rides.
//!
//! This crate provides the backend API: a public, cursor-paginated ride
//! listing and an admin surface for creating and curating rides.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::RideStore;
use services::{GoogleOidcVerifier, RideAdminService, RideListingService};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn RideStore>,
    pub listing: RideListingService,
    pub admin: RideAdminService,
    pub google_oidc_verifier: Arc<GoogleOidcVerifier>,
}

impl AppState {
    /// Wire the services over one shared store.
    pub fn new(
        config: Config,
        store: Arc<dyn RideStore>,
        google_oidc_verifier: Arc<GoogleOidcVerifier>,
    ) -> Self {
        Self {
            listing: RideListingService::new(store.clone()),
            admin: RideAdminService::new(store.clone()),
            config,
            store,
            google_oidc_verifier,
        }
    }
}
