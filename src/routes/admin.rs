// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin session and ride write routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_session_jwt, AdminUser, SESSION_COOKIE};
use crate::models::{Ride, RidePayload};
use crate::services::OidcError;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use axum_extra::extract::{
    cookie::{Cookie, CookieJar, SameSite},
    WithRejection,
};
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Session routes reachable without a session.
pub fn session_routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/api/admin/session",
        post(create_session).delete(delete_session),
    )
}

/// Routes that require an admin session.
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/admin/me", get(get_me))
        .route("/api/admin/rides", post(create_ride))
        .route("/api/admin/rides/{id}", patch(update_ride).delete(delete_ride))
        .route("/api/admin/rides/{id}/archive", post(archive_ride))
}

// ─── Session ─────────────────────────────────────────────────

#[derive(Deserialize)]
struct SessionRequest {
    /// Google Sign-In ID token
    credential: String,
}

/// Session creation response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SessionResponse {
    pub email: String,
    /// RFC 3339 expiry of the session
    pub expires_at: String,
}

fn session_cookie(state: &AppState, value: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.frontend_url.starts_with("https://"))
        .build()
}

/// Exchange a Google ID token for an admin session cookie.
async fn create_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    WithRejection(Json(body), _): WithRejection<Json<SessionRequest>, AppError>,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    let identity = state
        .google_oidc_verifier
        .verify_id_token(&body.credential)
        .await
        .map_err(|e| match e {
            OidcError::Forbidden(reason) => {
                tracing::warn!(reason = %reason, "Rejected Google ID token");
                AppError::Forbidden("Invalid credential".to_string())
            }
            OidcError::Transient(reason) => {
                AppError::Internal(anyhow::anyhow!("Google key fetch failed: {reason}"))
            }
        })?;

    if !state.config.is_admin_email(&identity.email) {
        tracing::warn!(email = %identity.email, "Sign-in from non-admin email");
        return Err(AppError::Forbidden("Not an admin".to_string()));
    }

    let (token, exp) = create_session_jwt(&identity.email, &state.config.session_signing_key)?;
    let expires_at = DateTime::from_timestamp(exp as i64, 0)
        .map(|t| t.to_rfc3339())
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("session expiry out of range")))?;

    tracing::info!(email = %identity.email, "Admin session created");

    Ok((
        jar.add(session_cookie(&state, token)),
        Json(SessionResponse {
            email: identity.email,
            expires_at,
        }),
    ))
}

/// Clear the session cookie. Removal attributes match creation.
async fn delete_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> (CookieJar, StatusCode) {
    (
        jar.remove(session_cookie(&state, String::new())),
        StatusCode::NO_CONTENT,
    )
}

/// Current admin response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MeResponse {
    pub email: String,
}

async fn get_me(Extension(user): Extension<AdminUser>) -> Json<MeResponse> {
    Json(MeResponse { email: user.email })
}

// ─── Rides ───────────────────────────────────────────────────

async fn create_ride(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AdminUser>,
    WithRejection(Json(payload), _): WithRejection<Json<RidePayload>, AppError>,
) -> Result<(StatusCode, Json<Ride>)> {
    let new = payload.into_new_ride().map_err(AppError::Validation)?;
    let ride = state.admin.create(new, &user.email).await?;
    Ok((StatusCode::CREATED, Json(ride)))
}

async fn update_ride(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AdminUser>,
    Path(id): Path<String>,
    WithRejection(Json(payload), _): WithRejection<Json<RidePayload>, AppError>,
) -> Result<Json<Ride>> {
    let patch = payload.into_patch().map_err(AppError::Validation)?;
    tracing::debug!(ride_id = %id, admin = %user.email, "Updating ride");
    Ok(Json(state.admin.update(&id, patch).await?))
}

async fn archive_ride(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Ride>> {
    Ok(Json(state.admin.archive(&id).await?))
}

async fn delete_ride(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AdminUser>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    tracing::debug!(ride_id = %id, admin = %user.email, "Deleting ride");
    state.admin.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
