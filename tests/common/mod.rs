// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use flat_finder::config::Config;
use flat_finder::db::FirestoreDb;
use flat_finder::routes::create_router;
use flat_finder::services::{
    IdentityService, ListingService, MessageFeed, MessagingService, SessionService,
};
use flat_finder::AppState;
use std::sync::Arc;

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

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with(test_db_offline(), IdentityService::new_mock())
}

/// Create a test app around a specific db and identity provider.
#[allow(dead_code)]
pub fn create_test_app_with(
    db: FirestoreDb,
    identity: IdentityService,
) -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let feed = MessageFeed::new();

    let state = Arc::new(AppState {
        config,
        db: db.clone(),
        identity,
        sessions: SessionService::new(db.clone()),
        listings: ListingService::new(db.clone()),
        messaging: MessagingService::new(db, feed),
    });

    (create_router(state.clone()), state)
}

/// Create a test JWT for `uid`.
#[allow(dead_code)]
pub fn create_test_jwt(uid: &str, email: &str, signing_key: &[u8]) -> String {
    flat_finder::middleware::auth::create_jwt(uid, email, signing_key)
        .expect("JWT creation failed")
}

/// Generate a unique uid for test isolation.
#[allow(dead_code)]
pub fn unique_uid(prefix: &str) -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let since_the_epoch = SystemTime::now().duration_since(UNIX_EPOCH).unwrap();
    format!("{}-{}", prefix, since_the_epoch.as_nanos())
}

/// A minimal valid user profile document for tests.
#[allow(dead_code)]
pub fn test_user(uid: &str, email: &str) -> flat_finder::models::User {
    flat_finder::models::User {
        uid: uid.to_string(),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        email: email.to_string(),
        birth_date: "1990-01-01".to_string(),
        is_admin: false,
        created_at: "2024-01-01T00:00:00Z".to_string(),
    }
}
