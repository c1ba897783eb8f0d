// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Integration tests for account deletion.
//!
//! Deletion is a two-step process with no transaction: the profile
//! document goes first, then the provider identity. Both calls must be
//! attempted, and a failing second step must surface as an error while
//! the profile deletion stands.
//!
//! These tests require the Firestore emulator to be running.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use flat_finder::services::{IdentityCall, IdentityService};
use tower::ServiceExt;

mod common;

#[tokio::test]
async fn test_delete_account_removes_profile_and_identity() {
    require_emulator!();
    let db = common::test_db().await;
    let identity = IdentityService::new_mock();
    let (app, state) = common::create_test_app_with(db.clone(), identity);

    let uid = common::unique_uid("delete-me");
    let email = format!("{}@example.com", uid);
    db.upsert_user(&common::test_user(&uid, &email)).await.unwrap();
    assert!(db.get_user(&uid).await.unwrap().is_some());

    let token = common::create_test_jwt(&uid, &email, &state.config.jwt_signing_key);
    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/account")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    // Both deletion steps happened
    assert!(db.get_user(&uid).await.unwrap().is_none());
    assert_eq!(
        state.identity.calls(),
        vec![IdentityCall::DeleteIdentity { uid: uid.clone() }]
    );
}

#[tokio::test]
async fn test_failed_identity_deletion_is_surfaced() {
    require_emulator!();
    let db = common::test_db().await;
    let identity = IdentityService::new_mock_failing_delete();
    let (app, state) = common::create_test_app_with(db.clone(), identity);

    let uid = common::unique_uid("orphan");
    let email = format!("{}@example.com", uid);
    db.upsert_user(&common::test_user(&uid, &email)).await.unwrap();

    let token = common::create_test_jwt(&uid, &email, &state.config.jwt_signing_key);
    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/account")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // The identity deletion failure surfaces as an error...
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    // ...the identity call was still attempted...
    assert_eq!(
        state.identity.calls(),
        vec![IdentityCall::DeleteIdentity { uid: uid.clone() }]
    );

    // ...and the already-deleted profile stays deleted (no rollback).
    assert!(db.get_user(&uid).await.unwrap().is_none());
}

#[tokio::test]
async fn test_admin_remove_user_leaves_identity_alone() {
    require_emulator!();
    let db = common::test_db().await;
    let identity = IdentityService::new_mock();
    let (app, state) = common::create_test_app_with(db.clone(), identity);

    // Admin actor
    let admin_uid = common::unique_uid("admin");
    let mut admin = common::test_user(&admin_uid, "admin@example.com");
    admin.is_admin = true;
    db.upsert_user(&admin).await.unwrap();

    // Target user
    let target_uid = common::unique_uid("target");
    db.upsert_user(&common::test_user(&target_uid, "target@example.com"))
        .await
        .unwrap();

    let token =
        common::create_test_jwt(&admin_uid, "admin@example.com", &state.config.jwt_signing_key);
    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(&format!("/api/users/{}", target_uid))
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(db.get_user(&target_uid).await.unwrap().is_none());
    // Admin removal touches only the profile document
    assert!(state.identity.calls().is_empty());
}

#[tokio::test]
async fn test_non_admin_cannot_remove_users() {
    require_emulator!();
    let db = common::test_db().await;
    let (app, state) = common::create_test_app_with(db.clone(), IdentityService::new_mock());

    let uid = common::unique_uid("plain");
    db.upsert_user(&common::test_user(&uid, "plain@example.com"))
        .await
        .unwrap();

    let token = common::create_test_jwt(&uid, "plain@example.com", &state.config.jwt_signing_key);
    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/users/somebody-else")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
