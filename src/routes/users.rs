// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile, account deletion and admin routes.

use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::forms::ProfileUpdateForm;
use crate::models::User;
use crate::services::Session;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me).put(update_me))
        .route("/api/account", delete(delete_account))
        .route("/api/users", get(list_users))
        .route("/api/users/{uid}/admin", post(grant_admin))
        .route("/api/users/{uid}", delete(remove_user))
}

// ─── Session ─────────────────────────────────────────────────

/// Current session: identity merged with profile. Re-read on every call,
/// so this also serves as the post-edit refresh.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Session>> {
    let session = state.sessions.resolve(&user).await?;
    Ok(Json(session))
}

/// Edit the profile document. The provider identity is untouched, so the
/// session must be refreshed by the caller afterwards.
async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(form): Json<ProfileUpdateForm>,
) -> Result<Json<Session>> {
    form.validate()?;

    let mut profile = state
        .db
        .get_user(&user.uid)
        .await?
        .ok_or_else(|| crate::error::AppError::NotFound(format!(
            "Profile for user {} not found",
            user.uid
        )))?;

    profile.first_name = form.first_name.trim().to_string();
    profile.last_name = form.last_name.trim().to_string();
    profile.email = form.email.trim().to_string();
    profile.birth_date = form.birth_date.clone();

    state.db.upsert_user(&profile).await?;

    Ok(Json(Session::merge(&user, &profile)))
}

// ─── Account deletion ────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DeleteAccountResponse {
    pub success: bool,
    pub message: String,
}

/// Delete the account: the profile document, then the provider identity.
///
/// The two deletes are independent with no compensating action. When the
/// identity deletion fails after the profile is gone, the orphaned
/// identity is logged and the failure surfaced to the caller.
async fn delete_account(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DeleteAccountResponse>> {
    tracing::info!(uid = %user.uid, "User-initiated account deletion");

    state.db.delete_user(&user.uid).await?;

    if let Err(e) = state.identity.delete_identity(&user.uid).await {
        tracing::error!(
            uid = %user.uid,
            error = %e,
            "Identity deletion failed after profile removal, identity orphaned"
        );
        return Err(e);
    }

    Ok(Json(DeleteAccountResponse {
        success: true,
        message: "Account deleted".to_string(),
    }))
}

// ─── Admin surface ───────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserResponse {
    pub uid: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub birth_date: String,
    pub is_admin: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            uid: user.uid,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            birth_date: user.birth_date,
            is_admin: user.is_admin,
        }
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UsersResponse {
    pub users: Vec<UserResponse>,
}

/// List every registered user (admin only).
async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UsersResponse>> {
    state.sessions.require_admin(&user).await?;

    let users = state.db.list_users().await?;
    Ok(Json(UsersResponse {
        users: users.into_iter().map(UserResponse::from).collect(),
    }))
}

/// Grant the admin flag (admin only, idempotent).
async fn grant_admin(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(uid): Path<String>,
) -> Result<Json<UserResponse>> {
    state.sessions.require_admin(&user).await?;

    let mut target = state
        .db
        .get_user(&uid)
        .await?
        .ok_or_else(|| crate::error::AppError::NotFound(format!("User {} not found", uid)))?;

    if !target.is_admin {
        target.is_admin = true;
        state.db.upsert_user(&target).await?;
        tracing::info!(uid = %uid, granted_by = %user.uid, "Admin rights granted");
    }

    Ok(Json(target.into()))
}

#[derive(Serialize)]
pub struct RemoveUserResponse {
    pub success: bool,
}

/// Remove a user's profile document (admin only). The provider identity
/// is left alone; only the user themselves can delete it.
async fn remove_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(uid): Path<String>,
) -> Result<Json<RemoveUserResponse>> {
    state.sessions.require_admin(&user).await?;

    state.db.delete_user(&uid).await?;
    tracing::info!(uid = %uid, removed_by = %user.uid, "User profile removed");
    Ok(Json(RemoveUserResponse { success: true }))
}
