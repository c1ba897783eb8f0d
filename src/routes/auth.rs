// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Registration, login and logout routes.

use axum::{extract::State, routing::post, Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

use crate::error::Result;
use crate::middleware::auth::{create_jwt, AuthUser, SESSION_COOKIE};
use crate::models::forms::RegistrationForm;
use crate::models::User;
use crate::services::Session;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RegisterResponse {
    pub uid: String,
}

/// Register a new account: create the provider identity, then the
/// profile document keyed by the returned uid.
///
/// Validation failures block the request before either backend call.
async fn register(
    State(state): State<Arc<AppState>>,
    Json(form): Json<RegistrationForm>,
) -> Result<Json<RegisterResponse>> {
    form.validate()?;

    let record = state.identity.sign_up(&form.email, &form.password).await?;

    let user = User {
        uid: record.uid.clone(),
        first_name: form.first_name.trim().to_string(),
        last_name: form.last_name.trim().to_string(),
        email: record.email.clone(),
        birth_date: form.birth_date.clone(),
        is_admin: false,
        created_at: format_utc_rfc3339(chrono::Utc::now()),
    };

    if let Err(e) = state.db.upsert_user(&user).await {
        // The identity already exists at the provider; nothing deletes it
        // here, so the orphan must be visible in the logs.
        tracing::warn!(
            uid = %record.uid,
            "Profile creation failed after identity creation, identity orphaned"
        );
        return Err(e);
    }

    tracing::info!(uid = %record.uid, "User registered");
    Ok(Json(RegisterResponse { uid: record.uid }))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LoginResponse {
    pub token: String,
    /// The merged session, absent when the profile document is missing
    /// for an otherwise valid identity.
    pub session: Option<Session>,
}

/// Verify credentials with the provider and mint a session JWT.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    let record = state
        .identity
        .sign_in(&request.email, &request.password)
        .await?;

    let token = create_jwt(&record.uid, &record.email, &state.config.jwt_signing_key)?;

    let auth = AuthUser {
        uid: record.uid.clone(),
        email: record.email.clone(),
    };
    let session = state.sessions.try_resolve(&auth).await?;

    let cookie = Cookie::build((SESSION_COOKIE, token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    tracing::info!(uid = %record.uid, "User logged in");
    Ok((jar.add(cookie), Json(LoginResponse { token, session })))
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

/// Clear the session cookie.
async fn logout(jar: CookieJar) -> (CookieJar, Json<LogoutResponse>) {
    let removal = Cookie::build((SESSION_COOKIE, "")).path("/").build();
    (jar.remove(removal), Json(LogoutResponse { success: true }))
}
