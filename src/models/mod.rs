// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod flat;
pub mod forms;
pub mod message;
pub mod user;

pub use flat::Flat;
pub use message::Message;
pub use user::User;
