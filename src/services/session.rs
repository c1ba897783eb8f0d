// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session derivation: authenticated identity joined with its profile.

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::models::User;
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// The current user's merged identity + profile data.
///
/// Derived, never stored: it exists only for an authenticated request.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Session {
    pub uid: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_admin: bool,
}

impl Session {
    /// Merge the provider identity with the stored profile.
    ///
    /// `uid` and `email` come from the provider; names and the admin flag
    /// come from the profile document.
    pub fn merge(auth: &AuthUser, profile: &User) -> Self {
        Self {
            uid: auth.uid.clone(),
            email: auth.email.clone(),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            is_admin: profile.is_admin,
        }
    }
}

/// Resolves sessions for authenticated requests.
#[derive(Clone)]
pub struct SessionService {
    db: FirestoreDb,
}

impl SessionService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Resolve the full session, treating a missing profile as
    /// fatal-to-view: the identity stays valid, but any view that needs
    /// profile fields gets a 404.
    pub async fn resolve(&self, auth: &AuthUser) -> Result<Session, AppError> {
        match self.try_resolve(auth).await? {
            Some(session) => Ok(session),
            None => Err(AppError::NotFound(format!(
                "Profile for user {} not found",
                auth.uid
            ))),
        }
    }

    /// Resolve the session if the profile document exists.
    pub async fn try_resolve(&self, auth: &AuthUser) -> Result<Option<Session>, AppError> {
        let profile = self.db.get_user(&auth.uid).await?;
        if profile.is_none() {
            tracing::warn!(uid = %auth.uid, "Authenticated identity has no profile document");
        }
        Ok(profile.map(|p| Session::merge(auth, &p)))
    }

    /// Resolve the session and require the admin flag.
    pub async fn require_admin(&self, auth: &AuthUser) -> Result<Session, AppError> {
        let session = self.resolve(auth).await?;
        if !session.is_admin {
            return Err(AppError::Forbidden);
        }
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_prefers_provider_email() {
        let auth = AuthUser {
            uid: "u1".to_string(),
            email: "current@example.com".to_string(),
        };
        let profile = User {
            uid: "u1".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "stale@example.com".to_string(),
            birth_date: "1990-12-10".to_string(),
            is_admin: true,
            created_at: "2024-01-01T00:00:00Z".to_string(),
        };

        let session = Session::merge(&auth, &profile);
        assert_eq!(session.email, "current@example.com");
        assert_eq!(session.first_name, "Ada");
        assert!(session.is_admin);
    }
}
