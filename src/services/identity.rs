// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity provider client (Google Identity Toolkit REST API).
//!
//! Handles:
//! - Account creation (sign-up)
//! - Credential verification (sign-in)
//! - Identity deletion (account removal)
//!
//! The provider owns credentials and identity lifecycle; this service
//! only calls its REST surface and maps provider error codes onto
//! application errors.

use crate::error::AppError;
use serde::Deserialize;
use std::sync::{Arc, Mutex};

const DEFAULT_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// An authenticated identity as reported by the provider.
#[derive(Debug, Clone)]
pub struct IdentityRecord {
    /// Provider-assigned uid (`localId`)
    pub uid: String,
    pub email: String,
}

/// A recorded provider call (mock mode only).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityCall {
    SignUp { email: String },
    SignIn { email: String },
    DeleteIdentity { uid: String },
}

/// Identity provider client.
#[derive(Clone)]
pub struct IdentityService {
    inner: Inner,
}

#[derive(Clone)]
enum Inner {
    Http(HttpIdentity),
    Mock(Arc<MockIdentity>),
}

#[derive(Clone)]
struct HttpIdentity {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

struct MockIdentity {
    calls: Mutex<Vec<IdentityCall>>,
    fail_delete: bool,
}

impl IdentityService {
    /// Create a new client for the Identity Toolkit REST API.
    ///
    /// For local development with the auth emulator, set
    /// FIREBASE_AUTH_EMULATOR_HOST.
    pub fn new(api_key: &str) -> Self {
        let base_url = match std::env::var("FIREBASE_AUTH_EMULATOR_HOST") {
            Ok(host) => {
                tracing::info!(host = %host, "Using identity provider emulator");
                format!("http://{}/identitytoolkit.googleapis.com/v1", host)
            }
            Err(_) => DEFAULT_BASE_URL.to_string(),
        };

        Self {
            inner: Inner::Http(HttpIdentity {
                http: reqwest::Client::new(),
                base_url,
                api_key: api_key.to_string(),
            }),
        }
    }

    /// Create a mock identity provider for testing.
    ///
    /// Every call is recorded and can be asserted on via [`Self::calls`].
    pub fn new_mock() -> Self {
        Self {
            inner: Inner::Mock(Arc::new(MockIdentity {
                calls: Mutex::new(Vec::new()),
                fail_delete: false,
            })),
        }
    }

    /// Mock identity provider whose delete-identity call always fails.
    pub fn new_mock_failing_delete() -> Self {
        Self {
            inner: Inner::Mock(Arc::new(MockIdentity {
                calls: Mutex::new(Vec::new()),
                fail_delete: true,
            })),
        }
    }

    /// Calls recorded by the mock. Empty for HTTP clients.
    pub fn calls(&self) -> Vec<IdentityCall> {
        match &self.inner {
            Inner::Http(_) => Vec::new(),
            Inner::Mock(mock) => mock
                .calls
                .lock()
                .map(|calls| calls.clone())
                .unwrap_or_default(),
        }
    }

    /// Create a new identity (`accounts:signUp`).
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<IdentityRecord, AppError> {
        match &self.inner {
            Inner::Http(http) => {
                http.account_request("accounts:signUp", email, password)
                    .await
            }
            Inner::Mock(mock) => {
                mock.record(IdentityCall::SignUp {
                    email: email.to_string(),
                });
                Ok(IdentityRecord {
                    uid: mock_uid(email),
                    email: email.to_string(),
                })
            }
        }
    }

    /// Verify credentials (`accounts:signInWithPassword`).
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<IdentityRecord, AppError> {
        match &self.inner {
            Inner::Http(http) => {
                http.account_request("accounts:signInWithPassword", email, password)
                    .await
            }
            Inner::Mock(mock) => {
                mock.record(IdentityCall::SignIn {
                    email: email.to_string(),
                });
                Ok(IdentityRecord {
                    uid: mock_uid(email),
                    email: email.to_string(),
                })
            }
        }
    }

    /// Delete an identity (`accounts:delete`).
    ///
    /// Used by account deletion after the profile document is removed;
    /// the two deletes are independent, so a failure here leaves an
    /// orphaned identity the caller must surface.
    pub async fn delete_identity(&self, uid: &str) -> Result<(), AppError> {
        match &self.inner {
            Inner::Http(http) => http.delete_identity(uid).await,
            Inner::Mock(mock) => {
                mock.record(IdentityCall::DeleteIdentity {
                    uid: uid.to_string(),
                });
                if mock.fail_delete {
                    return Err(AppError::Identity(
                        "identity deletion failed (mock)".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }
}

impl MockIdentity {
    fn record(&self, call: IdentityCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

/// Deterministic mock uid, so sign-up and sign-in for the same email
/// resolve to the same identity across calls.
fn mock_uid(email: &str) -> String {
    format!("mock-{}", email.replace(['@', '.'], "-"))
}

/// Successful sign-up/sign-in response body.
#[derive(Debug, Deserialize)]
struct AccountResponse {
    #[serde(rename = "localId")]
    local_id: String,
    email: String,
}

/// Provider error envelope.
#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

impl HttpIdentity {
    async fn account_request(
        &self,
        endpoint: &str,
        email: &str,
        password: &str,
    ) -> Result<IdentityRecord, AppError> {
        let url = format!("{}/{}?key={}", self.base_url, endpoint, self.api_key);

        let body = serde_json::json!({
            "email": email,
            "password": password,
            "returnSecureToken": true,
        });

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Identity(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::map_provider_error(response).await);
        }

        let account: AccountResponse = response
            .json()
            .await
            .map_err(|e| AppError::Identity(format!("JSON parse error: {}", e)))?;

        Ok(IdentityRecord {
            uid: account.local_id,
            email: account.email,
        })
    }

    async fn delete_identity(&self, uid: &str) -> Result<(), AppError> {
        let url = format!("{}/accounts:delete?key={}", self.base_url, self.api_key);

        let body = serde_json::json!({ "localId": uid });

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Identity(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::map_provider_error(response).await);
        }

        Ok(())
    }

    /// Map provider error codes onto application errors.
    async fn map_provider_error(response: reqwest::Response) -> AppError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        let code = serde_json::from_str::<ProviderError>(&body)
            .map(|e| e.error.message)
            .unwrap_or_default();

        match code.as_str() {
            "EMAIL_EXISTS" => AppError::BadRequest(
                "This email is already registered. Please log in.".to_string(),
            ),
            "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
                AppError::Unauthorized
            }
            "" => AppError::Identity(format!("HTTP {}: {}", status, body)),
            other => AppError::Identity(other.to_string()),
        }
    }
}
