// SPDX-FileCopyrightText: 2026 Keyseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite settings store for keyseal.
//!
//! Provides a synchronous `rusqlite` connection with embedded `refinery`
//! migrations and typed operations on the `settings` table. [`Database`]
//! implements [`keyseal_core::SettingsStore`], so it plugs directly into the
//! vault's settings facade and migration step.

pub mod database;
pub mod migrations;
pub mod queries;

pub use database::Database;
