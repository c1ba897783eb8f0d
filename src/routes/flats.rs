// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Listing routes: browse/search/sort, favorites, owner mutations.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::forms::FlatForm;
use crate::models::Flat;
use crate::services::listings::{apply_filter, apply_sort, SortDirection, SortField};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/flats", get(list_flats).post(create_flat))
        .route("/api/flats/mine", get(my_flats))
        .route("/api/flats/favorites", get(favorite_flats))
        .route(
            "/api/flats/{id}",
            get(get_flat).put(update_flat).delete(delete_flat),
        )
        .route("/api/flats/{id}/favorite", post(toggle_favorite))
}

// ─── Responses ───────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct FlatResponse {
    pub id: String,
    pub owner_id: String,
    pub city: String,
    pub street_name: String,
    pub street_number: u32,
    pub rent_price: f64,
    pub area_size: f64,
    pub year_built: u32,
    pub date_available: String,
    pub has_ac: bool,
    pub favorite_count: usize,
    /// Whether the requesting user has this flat favorited
    pub favorited: bool,
}

impl FlatResponse {
    fn for_user(flat: Flat, uid: &str) -> Self {
        let favorited = flat.is_favorited_by(uid);
        Self {
            favorite_count: flat.favorites.len(),
            favorited,
            id: flat.id,
            owner_id: flat.owner_id,
            city: flat.city,
            street_name: flat.street_name,
            street_number: flat.street_number,
            rent_price: flat.rent_price,
            area_size: flat.area_size,
            year_built: flat.year_built,
            date_available: flat.date_available,
            has_ac: flat.has_ac,
        }
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct FlatsResponse {
    pub flats: Vec<FlatResponse>,
}

// ─── Browse / search / sort ──────────────────────────────────

#[derive(Deserialize)]
struct FlatsQuery {
    /// Substring to match against any displayed field
    search: Option<String>,
    sort_by: Option<SortField>,
    direction: Option<SortDirection>,
}

/// The listing view: the full working set, filtered and sorted in memory.
async fn list_flats(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<FlatsQuery>,
) -> Result<Json<FlatsResponse>> {
    let working_set = state.listings.load_all().await?;

    let mut flats = match params.search.as_deref() {
        Some(query) => apply_filter(&working_set, query),
        None => working_set,
    };

    if let Some(field) = params.sort_by {
        let direction = params.direction.unwrap_or(SortDirection::Asc);
        apply_sort(&mut flats, field, direction);
    }

    Ok(Json(FlatsResponse {
        flats: flats
            .into_iter()
            .map(|f| FlatResponse::for_user(f, &user.uid))
            .collect(),
    }))
}

/// Flats owned by the current user.
async fn my_flats(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<FlatsResponse>> {
    let flats = state.listings.by_owner(&user.uid).await?;
    Ok(Json(FlatsResponse {
        flats: flats
            .into_iter()
            .map(|f| FlatResponse::for_user(f, &user.uid))
            .collect(),
    }))
}

/// Flats the current user has favorited.
async fn favorite_flats(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<FlatsResponse>> {
    let flats = state.listings.favorites_of(&user.uid).await?;
    Ok(Json(FlatsResponse {
        flats: flats
            .into_iter()
            .map(|f| FlatResponse::for_user(f, &user.uid))
            .collect(),
    }))
}

async fn get_flat(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(flat_id): Path<String>,
) -> Result<Json<FlatResponse>> {
    let flat = state.listings.get(&flat_id).await?;
    Ok(Json(FlatResponse::for_user(flat, &user.uid)))
}

// ─── Mutations ───────────────────────────────────────────────

async fn create_flat(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(form): Json<FlatForm>,
) -> Result<Json<FlatResponse>> {
    let input = form.validate_and_parse()?;
    let flat = state.listings.create(&user.uid, input).await?;
    tracing::info!(flat_id = %flat.id, owner = %user.uid, "Flat created");
    Ok(Json(FlatResponse::for_user(flat, &user.uid)))
}

async fn update_flat(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(flat_id): Path<String>,
    Json(form): Json<FlatForm>,
) -> Result<Json<FlatResponse>> {
    let input = form.validate_and_parse()?;
    let flat = state.listings.update(&flat_id, &user.uid, input).await?;
    Ok(Json(FlatResponse::for_user(flat, &user.uid)))
}

#[derive(Serialize)]
pub struct DeleteFlatResponse {
    pub success: bool,
}

/// Delete a listing. The confirmation dialog is a client concern; here
/// only ownership (or the admin flag) is enforced.
async fn delete_flat(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(flat_id): Path<String>,
) -> Result<Json<DeleteFlatResponse>> {
    let session = state.sessions.resolve(&user).await?;
    state.listings.delete(&flat_id, &session).await?;
    tracing::info!(flat_id = %flat_id, actor = %user.uid, "Flat deleted");
    Ok(Json(DeleteFlatResponse { success: true }))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct FavoriteResponse {
    /// Whether the flat is favorited after the toggle
    pub favorited: bool,
    pub favorite_count: usize,
}

/// Idempotent add-or-remove of the current user in the favorites set.
async fn toggle_favorite(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(flat_id): Path<String>,
) -> Result<Json<FavoriteResponse>> {
    let (favorited, favorites) = state.listings.toggle_favorite(&flat_id, &user.uid).await?;
    Ok(Json(FavoriteResponse {
        favorited,
        favorite_count: favorites.len(),
    }))
}
