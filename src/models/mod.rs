// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod car;
pub mod user;

pub use car::CarRecord;
pub use user::User;
