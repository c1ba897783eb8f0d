//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// User profile stored in Firestore.
///
/// The document ID is the identity provider's uid, so the profile can be
/// joined with an authenticated identity in one read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Identity provider uid (also used as document ID)
    pub uid: String,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Email address (denormalized from the identity provider)
    pub email: String,
    /// Birth date (YYYY-MM-DD)
    pub birth_date: String,
    /// Admin flag, default false
    #[serde(default)]
    pub is_admin: bool,
    /// When the account was registered
    pub created_at: String,
}
