// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Listing collection view: load, filter, sort, and mutate flats.
//!
//! The view works on the full set of listings loaded into memory;
//! filtering and sorting are pure projections recomputed per request.

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::flat::{toggled_favorites, Flat};
use crate::models::forms::FlatInput;
use crate::services::Session;
use crate::time_utils;
use serde::Deserialize;
use std::cmp::Ordering;

/// Sortable listing fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    City,
    StreetName,
    StreetNumber,
    RentPrice,
    AreaSize,
    YearBuilt,
    DateAvailable,
    HasAc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Current sort selection. Selecting the same field again flips the
/// direction; selecting a different field resets to ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortState {
    pub fn select(current: Option<SortState>, field: SortField) -> SortState {
        match current {
            Some(state) if state.field == field => SortState {
                field,
                direction: match state.direction {
                    SortDirection::Asc => SortDirection::Desc,
                    SortDirection::Desc => SortDirection::Asc,
                },
            },
            _ => SortState {
                field,
                direction: SortDirection::Asc,
            },
        }
    }
}

/// Filter the working set to flats where any displayed field contains
/// `query`, case-insensitively. Pure and non-mutating; the result is
/// always a subsequence of the input.
pub fn apply_filter(flats: &[Flat], query: &str) -> Vec<Flat> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return flats.to_vec();
    }
    flats
        .iter()
        .filter(|flat| {
            [
                flat.city.clone(),
                flat.street_name.clone(),
                flat.street_number.to_string(),
                flat.rent_price.to_string(),
                flat.area_size.to_string(),
                flat.year_built.to_string(),
                flat.date_available.clone(),
            ]
            .iter()
            .any(|text| text.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

/// Stable-sort the working set by `field`.
///
/// Descending order is the exact reverse of the canonical ascending
/// order, so toggling the direction reverses the list exactly.
pub fn apply_sort(flats: &mut [Flat], field: SortField, direction: SortDirection) {
    flats.sort_by(|a, b| compare(a, b, field));
    if direction == SortDirection::Desc {
        flats.reverse();
    }
}

fn compare(a: &Flat, b: &Flat, field: SortField) -> Ordering {
    match field {
        SortField::City => cmp_text(&a.city, &b.city),
        SortField::StreetName => cmp_text(&a.street_name, &b.street_name),
        SortField::StreetNumber => a.street_number.cmp(&b.street_number),
        SortField::RentPrice => cmp_number(a.rent_price, b.rent_price),
        SortField::AreaSize => cmp_number(a.area_size, b.area_size),
        SortField::YearBuilt => a.year_built.cmp(&b.year_built),
        SortField::DateAvailable => cmp_date(&a.date_available, &b.date_available),
        // false sorts before true
        SortField::HasAc => a.has_ac.cmp(&b.has_ac),
    }
}

fn cmp_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

fn cmp_number(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Compare availability dates chronologically where both parse,
/// lexicographically otherwise.
fn cmp_date(a: &str, b: &str) -> Ordering {
    match (parse_date(a), parse_date(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}

fn parse_date(raw: &str) -> Option<chrono::NaiveDate> {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .ok()
        .or_else(|| chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
}

/// Listing operations against the backend.
#[derive(Clone)]
pub struct ListingService {
    db: FirestoreDb,
}

impl ListingService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Fetch every flat and normalize availability dates for display.
    pub async fn load_all(&self) -> Result<Vec<Flat>, AppError> {
        let mut flats = self.db.list_flats().await?;
        for flat in &mut flats {
            flat.date_available = time_utils::display_date(&flat.date_available);
        }
        Ok(flats)
    }

    /// Get one flat, normalized for display.
    pub async fn get(&self, flat_id: &str) -> Result<Flat, AppError> {
        let mut flat = self
            .db
            .get_flat(flat_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Flat {} not found", flat_id)))?;
        flat.date_available = time_utils::display_date(&flat.date_available);
        Ok(flat)
    }

    /// Flats owned by `uid`, normalized for display.
    pub async fn by_owner(&self, uid: &str) -> Result<Vec<Flat>, AppError> {
        let mut flats = self.db.flats_by_owner(uid).await?;
        for flat in &mut flats {
            flat.date_available = time_utils::display_date(&flat.date_available);
        }
        Ok(flats)
    }

    /// Flats `uid` has favorited, normalized for display.
    pub async fn favorites_of(&self, uid: &str) -> Result<Vec<Flat>, AppError> {
        let mut flats = self.db.flats_favorited_by(uid).await?;
        for flat in &mut flats {
            flat.date_available = time_utils::display_date(&flat.date_available);
        }
        Ok(flats)
    }

    /// Create a new listing owned by `owner_id`.
    pub async fn create(&self, owner_id: &str, input: FlatInput) -> Result<Flat, AppError> {
        let flat = Flat {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            city: input.city,
            street_name: input.street_name,
            street_number: input.street_number,
            rent_price: input.rent_price,
            area_size: input.area_size,
            year_built: input.year_built,
            date_available: input.date_available,
            has_ac: input.has_ac,
            favorites: Vec::new(),
            created_at: time_utils::format_utc_rfc3339(chrono::Utc::now()),
        };
        self.db.upsert_flat(&flat).await?;
        Ok(flat)
    }

    /// Edit a listing's fields. Only the owner may edit; the favorites
    /// set is preserved as-is.
    pub async fn update(
        &self,
        flat_id: &str,
        editor_uid: &str,
        input: FlatInput,
    ) -> Result<Flat, AppError> {
        let existing = self
            .db
            .get_flat(flat_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Flat {} not found", flat_id)))?;

        if existing.owner_id != editor_uid {
            return Err(AppError::Forbidden);
        }

        let flat = Flat {
            city: input.city,
            street_name: input.street_name,
            street_number: input.street_number,
            rent_price: input.rent_price,
            area_size: input.area_size,
            year_built: input.year_built,
            date_available: input.date_available,
            has_ac: input.has_ac,
            ..existing
        };
        self.db.upsert_flat(&flat).await?;
        Ok(flat)
    }

    /// Delete a listing. Allowed for the owner and for admins.
    pub async fn delete(&self, flat_id: &str, actor: &Session) -> Result<(), AppError> {
        let flat = self
            .db
            .get_flat(flat_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Flat {} not found", flat_id)))?;

        if flat.owner_id != actor.uid && !actor.is_admin {
            return Err(AppError::Forbidden);
        }

        self.db.delete_flat(flat_id).await
    }

    /// Toggle `uid`'s membership in a flat's favorites set.
    ///
    /// The backend write uses atomic array transforms; the returned
    /// projection is computed only after the write is confirmed, so a
    /// failed call never reports a state the store does not hold.
    pub async fn toggle_favorite(
        &self,
        flat_id: &str,
        uid: &str,
    ) -> Result<(bool, Vec<String>), AppError> {
        let flat = self
            .db
            .get_flat(flat_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Flat {} not found", flat_id)))?;

        let (favorites, favorited) = toggled_favorites(&flat.favorites, uid);

        if favorited {
            self.db.add_favorite(flat_id, uid).await?;
        } else {
            self.db.remove_favorite(flat_id, uid).await?;
        }

        tracing::debug!(flat_id, uid, favorited, "Favorite toggled");
        Ok((favorited, favorites))
    }
}
