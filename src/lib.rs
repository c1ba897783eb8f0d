// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! FlatFinder: rental-listing API backend
//!
//! This crate provides the backend API for the FlatFinder app: user
//! registration and sessions, flat listings with search/sort and
//! favorites, and messaging between flat owners and interested users.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::{IdentityService, ListingService, MessagingService, SessionService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub identity: IdentityService,
    pub sessions: SessionService,
    pub listings: ListingService,
    pub messaging: MessagingService,
}
