// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::response::Response;
use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Algorithm, DecodingKey, EncodingKey, Header};
use ridebook::config::Config;
use ridebook::db::{FirestoreDb, MemoryStore, RideStore};
use ridebook::middleware::auth::create_session_jwt;
use ridebook::models::{Difficulty, OrganizerType, Ride, RideStatus, RideType};
use ridebook::routes::create_router;
use ridebook::services::GoogleOidcVerifier;
use ridebook::AppState;
use serde_json::json;
use std::sync::Arc;

/// Key id the test verifier accepts.
pub const TEST_KID: &str = "test-kid";
/// Email on the test config's admin allow-list.
pub const ADMIN_EMAIL: &str = "admin@example.com";

const TEST_PRIVATE_KEY: &[u8] = include_bytes!("../fixtures/oidc_test_private.pem");
const TEST_PUBLIC_KEY: &[u8] = include_bytes!("../fixtures/oidc_test_public.pem");

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Verifier that trusts only the fixture RSA key.
#[allow(dead_code)]
pub fn test_verifier(config: &Config) -> Arc<GoogleOidcVerifier> {
    let key = DecodingKey::from_rsa_pem(TEST_PUBLIC_KEY).expect("valid test public key");
    Arc::new(
        GoogleOidcVerifier::new_with_static_key(config, TEST_KID, key)
            .expect("Failed to build test verifier"),
    )
}

/// Create a test app over the given store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app_with_store(store: Arc<dyn RideStore>) -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let verifier = test_verifier(&config);
    let state = Arc::new(AppState::new(config, store, verifier));
    (create_router(state.clone()), state)
}

/// Create a test app over an empty in-memory store.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with_store(Arc::new(MemoryStore::new()))
}

/// Create a test app whose store is unreachable.
#[allow(dead_code)]
pub fn create_offline_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with_store(Arc::new(FirestoreDb::new_mock()))
}

/// Session token for the allow-listed admin.
#[allow(dead_code)]
pub fn admin_token(state: &AppState) -> String {
    session_token(state, ADMIN_EMAIL)
}

/// Session token for any email, allowed or not.
#[allow(dead_code)]
pub fn session_token(state: &AppState, email: &str) -> String {
    create_session_jwt(email, &state.config.session_signing_key)
        .expect("Failed to create session")
        .0
}

/// Sign a Google-style ID token with the fixture key.
#[allow(dead_code)]
pub fn sign_id_token(config: &Config, email: &str, email_verified: bool) -> String {
    let now = Utc::now().timestamp();
    let claims = json!({
        "iss": "https://accounts.google.com",
        "aud": config.google_client_id,
        "sub": "1234567890",
        "iat": now,
        "exp": now + 3600,
        "email": email,
        "email_verified": email_verified,
    });

    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(TEST_KID.to_string());
    encode(
        &header,
        &claims,
        &EncodingKey::from_rsa_pem(TEST_PRIVATE_KEY).expect("valid test private key"),
    )
    .expect("Failed to sign ID token")
}

/// Parse an RFC 3339 timestamp.
#[allow(dead_code)]
pub fn parse_time(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

/// A published road ride starting at `start`.
#[allow(dead_code)]
pub fn ride(id: &str, start: DateTime<Utc>) -> Ride {
    Ride {
        id: id.to_string(),
        title: format!("Ride {id}"),
        group: "Test Group".to_string(),
        start_date_time_utc: start,
        timezone: "UTC".to_string(),
        meetup_location_short: "Cafe".to_string(),
        meetup_location_full: None,
        route_url: "https://example.com/route".to_string(),
        route_platform: None,
        difficulty: Difficulty::Easy,
        ride_type: RideType::Road,
        organizer_type: OrganizerType::Shop,
        status: RideStatus::Published,
        event_url: None,
        notes: None,
        created_by_user_id: "test".to_string(),
        created_at_utc: start,
        updated_at_utc: start,
    }
}

/// Store pre-filled with `rides`.
#[allow(dead_code)]
pub async fn store_with(rides: &[Ride]) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    for r in rides {
        store.put_ride(r).await.expect("memory put");
    }
    store
}

/// Read a JSON response body.
#[allow(dead_code)]
pub async fn body_json(response: Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&body).expect("Body is not JSON")
}
