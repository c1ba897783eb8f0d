// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod identity;
pub mod listings;
pub mod messaging;
pub mod session;

pub use identity::{IdentityCall, IdentityRecord, IdentityService};
pub use listings::ListingService;
pub use messaging::{MessageEvent, MessageEventKind, MessageFeed, MessagingService};
pub use session::{Session, SessionService};
