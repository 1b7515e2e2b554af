// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin session authentication middleware.
//!
//! A session is an HS256 JWT whose subject is the admin's email. It is read
//! from the session cookie first, then from an `Authorization: Bearer` header.
//! The email must still be on the allow-list when the request arrives.

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Name of the HttpOnly session cookie.
pub const SESSION_COOKIE: &str = "ridebook_session";

/// Session lifetime.
pub const SESSION_TTL_SECS: usize = 12 * 60 * 60;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (admin email, lower-cased)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Authenticated admin extracted from the session.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub email: String,
}

/// Middleware that requires a valid admin session.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Try cookie first, then header
    let token = if let Some(cookie) = jar.get(SESSION_COOKIE) {
        cookie.value().to_string()
    } else {
        let auth_header = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
            Some(token) if !token.is_empty() => token.to_string(),
            _ => return Err(AppError::Unauthorized),
        }
    };

    let claims = verify_session_jwt(&token, &state.config.session_signing_key)
        .map_err(|_| AppError::Unauthorized)?;

    if !state.config.is_admin_email(&claims.sub) {
        tracing::warn!(email = %claims.sub, "Session email no longer on admin allow-list");
        return Err(AppError::Forbidden("Not an admin".to_string()));
    }

    request
        .extensions_mut()
        .insert(AdminUser { email: claims.sub });

    Ok(next.run(request).await)
}

/// Create a session JWT for an admin email.
pub fn create_session_jwt(email: &str, signing_key: &[u8]) -> anyhow::Result<(String, usize)> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;
    let exp = now + SESSION_TTL_SECS;

    let claims = Claims {
        sub: email.trim().to_lowercase(),
        iat: now,
        exp,
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?;
    Ok((token, exp))
}

/// Decode and validate a session JWT.
pub fn verify_session_jwt(
    token: &str,
    signing_key: &[u8],
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);
    decode::<Claims>(token, &key, &validation).map(|data| data.claims)
}
