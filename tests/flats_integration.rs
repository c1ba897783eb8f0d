// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Integration tests for the listing view and favorites.
//!
//! These tests require the Firestore emulator to be running.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use flat_finder::models::Flat;
use flat_finder::services::IdentityService;
use serde_json::Value;
use tower::ServiceExt;

mod common;

fn test_flat(id: &str, owner: &str, city: &str, price: f64) -> Flat {
    Flat {
        id: id.to_string(),
        owner_id: owner.to_string(),
        city: city.to_string(),
        street_name: "Main Street".to_string(),
        street_number: 1,
        rent_price: price,
        area_size: 50.0,
        year_built: 2005,
        date_available: "2024-06-01".to_string(),
        has_ac: false,
        favorites: vec![],
        created_at: "2024-01-01T00:00:00Z".to_string(),
    }
}

async fn response_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_search_matches_city_case_insensitively() {
    require_emulator!();
    let db = common::test_db().await;
    let (app, state) = common::create_test_app_with(db.clone(), IdentityService::new_mock());

    let uid = common::unique_uid("searcher");
    let paris_id = common::unique_uid("flat-paris");
    let berlin_id = common::unique_uid("flat-berlin");
    // Unique city names keyed to this run so parallel tests don't collide.
    let paris = format!("Paris-{}", paris_id);
    let berlin = format!("Berlin-{}", berlin_id);
    db.upsert_flat(&test_flat(&paris_id, "owner-1", &paris, 1200.0))
        .await
        .unwrap();
    db.upsert_flat(&test_flat(&berlin_id, "owner-1", &berlin, 900.0))
        .await
        .unwrap();

    let token = common::create_test_jwt(&uid, "s@example.com", &state.config.jwt_signing_key);

    for query in [paris.clone(), paris.to_lowercase()] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri(&format!("/api/flats?search={}", query))
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        let flats = json["flats"].as_array().unwrap();
        assert_eq!(flats.len(), 1, "query {:?}", query);
        assert_eq!(flats[0]["id"], paris_id.as_str());
    }
}

#[tokio::test]
async fn test_toggle_favorite_alternates_membership() {
    require_emulator!();
    let db = common::test_db().await;
    let (app, state) = common::create_test_app_with(db.clone(), IdentityService::new_mock());

    let uid = common::unique_uid("fan");
    let flat_id = common::unique_uid("flat-fav");
    db.upsert_flat(&test_flat(&flat_id, "owner-1", "Lisbon", 800.0))
        .await
        .unwrap();

    let token = common::create_test_jwt(&uid, "fan@example.com", &state.config.jwt_signing_key);
    let toggle = |app: axum::Router, token: String, flat_id: String| async move {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(&format!("/api/flats/{}/favorite", flat_id))
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        response_json(response).await
    };

    // Odd toggles: member. Even toggles: not a member.
    let first = toggle(app.clone(), token.clone(), flat_id.clone()).await;
    assert_eq!(first["favorited"], true);
    let stored = db.get_flat(&flat_id).await.unwrap().unwrap();
    assert_eq!(stored.favorites, vec![uid.clone()]);

    let second = toggle(app.clone(), token.clone(), flat_id.clone()).await;
    assert_eq!(second["favorited"], false);
    let stored = db.get_flat(&flat_id).await.unwrap().unwrap();
    assert!(stored.favorites.is_empty());

    let third = toggle(app.clone(), token.clone(), flat_id.clone()).await;
    assert_eq!(third["favorited"], true);
    let stored = db.get_flat(&flat_id).await.unwrap().unwrap();
    assert_eq!(stored.favorites, vec![uid.clone()]);
}

#[tokio::test]
async fn test_favorites_view_uses_membership_query() {
    require_emulator!();
    let db = common::test_db().await;
    let (app, state) = common::create_test_app_with(db.clone(), IdentityService::new_mock());

    let uid = common::unique_uid("collector");
    let liked_id = common::unique_uid("flat-liked");
    let other_id = common::unique_uid("flat-other");

    let mut liked = test_flat(&liked_id, "owner-1", "Rome", 1000.0);
    liked.favorites = vec![uid.clone()];
    db.upsert_flat(&liked).await.unwrap();
    db.upsert_flat(&test_flat(&other_id, "owner-1", "Rome", 1100.0))
        .await
        .unwrap();

    let token = common::create_test_jwt(&uid, "c@example.com", &state.config.jwt_signing_key);
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/flats/favorites")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    let flats = json["flats"].as_array().unwrap();
    assert_eq!(flats.len(), 1);
    assert_eq!(flats[0]["id"], liked_id.as_str());
    assert_eq!(flats[0]["favorited"], true);
}

#[tokio::test]
async fn test_only_owner_can_delete_flat() {
    require_emulator!();
    let db = common::test_db().await;
    let (app, state) = common::create_test_app_with(db.clone(), IdentityService::new_mock());

    let owner_uid = common::unique_uid("owner");
    let other_uid = common::unique_uid("other");
    db.upsert_user(&common::test_user(&owner_uid, "o@example.com"))
        .await
        .unwrap();
    db.upsert_user(&common::test_user(&other_uid, "x@example.com"))
        .await
        .unwrap();

    let flat_id = common::unique_uid("flat-del");
    db.upsert_flat(&test_flat(&flat_id, &owner_uid, "Vienna", 950.0))
        .await
        .unwrap();

    // A non-owner is rejected
    let other_token =
        common::create_test_jwt(&other_uid, "x@example.com", &state.config.jwt_signing_key);
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(&format!("/api/flats/{}", flat_id))
                .header(header::AUTHORIZATION, format!("Bearer {}", other_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(db.get_flat(&flat_id).await.unwrap().is_some());

    // The owner succeeds
    let owner_token =
        common::create_test_jwt(&owner_uid, "o@example.com", &state.config.jwt_signing_key);
    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(&format!("/api/flats/{}", flat_id))
                .header(header::AUTHORIZATION, format!("Bearer {}", owner_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(db.get_flat(&flat_id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_date_available_is_normalized_for_display() {
    require_emulator!();
    let db = common::test_db().await;
    let (app, state) = common::create_test_app_with(db.clone(), IdentityService::new_mock());

    let uid = common::unique_uid("viewer");
    let flat_id = common::unique_uid("flat-date");
    let mut flat = test_flat(&flat_id, "owner-1", "Oslo", 1300.0);
    // Written by an older client as a provider-native timestamp
    flat.date_available = "2024-03-01T12:30:00Z".to_string();
    db.upsert_flat(&flat).await.unwrap();

    let token = common::create_test_jwt(&uid, "v@example.com", &state.config.jwt_signing_key);
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(&format!("/api/flats/{}", flat_id))
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["date_available"], "Fri Mar 01 2024");
}
