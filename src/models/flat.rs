// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Flat (rental listing) model.

use serde::{Deserialize, Serialize};

/// A rental listing stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flat {
    /// Document ID
    pub id: String,
    /// Owning user's uid
    pub owner_id: String,
    pub city: String,
    pub street_name: String,
    pub street_number: u32,
    pub rent_price: f64,
    pub area_size: f64,
    pub year_built: u32,
    /// Availability date; may be RFC3339 or a plain `YYYY-MM-DD` string
    /// depending on which client wrote it. Normalized for display in the
    /// listing view.
    pub date_available: String,
    pub has_ac: bool,
    /// Uids of users who favorited this flat. Set semantics: no
    /// duplicates, order irrelevant.
    #[serde(default)]
    pub favorites: Vec<String>,
    pub created_at: String,
}

impl Flat {
    /// Whether `uid` currently has this flat favorited.
    pub fn is_favorited_by(&self, uid: &str) -> bool {
        self.favorites.iter().any(|f| f == uid)
    }
}

/// Compute the favorites set after toggling `uid`'s membership.
///
/// Returns the new set and whether `uid` is a member afterwards. Removal
/// drops every occurrence, so a set that somehow acquired duplicates is
/// repaired on the way out.
pub fn toggled_favorites(current: &[String], uid: &str) -> (Vec<String>, bool) {
    if current.iter().any(|f| f == uid) {
        let remaining = current
            .iter()
            .filter(|f| f.as_str() != uid)
            .cloned()
            .collect();
        (remaining, false)
    } else {
        let mut updated = current.to_vec();
        updated.push(uid.to_string());
        (updated, true)
    }
}
