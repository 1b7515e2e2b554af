// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod admin;
pub mod google_oidc;
pub mod listing;
pub mod seed;

pub use admin::RideAdminService;
pub use google_oidc::{GoogleOidcVerifier, OidcError, VerifiedIdentity};
pub use listing::{PageRequest, RideFilter, RideListingService, RidePage};
