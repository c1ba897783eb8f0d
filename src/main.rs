// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! FlatFinder API Server
//!
//! Backend for the FlatFinder rental-listing app: sessions, flat
//! listings with favorites, and messaging between owners and interested
//! users.

use flat_finder::{
    config::Config,
    db::FirestoreDb,
    services::{
        IdentityService, ListingService, MessageFeed, MessagingService, SessionService,
    },
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting FlatFinder API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    // Identity provider client
    let identity = IdentityService::new(&config.identity_api_key);
    tracing::info!("Identity provider client initialized");

    // Message feed shared by all live subscriptions in this instance
    let feed = MessageFeed::new();

    let sessions = SessionService::new(db.clone());
    let listings = ListingService::new(db.clone());
    let messaging = MessagingService::new(db.clone(), feed);

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        identity,
        sessions,
        listings,
        messaging,
    });

    // Build router
    let app = flat_finder::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("flat_finder=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
