// SPDX-FileCopyrightText: 2026 Keyseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for keyseal integration tests.
//!
//! Provides an in-memory settings store and a harness that wires a codec to a
//! temporary data directory with a fixed identity, so tests never depend on
//! the host machine or pay the production key-derivation cost.
//!
//! # Components
//!
//! - [`MockSettingsStore`] - In-memory store with write counting and failure injection
//! - [`TestHarness`] - Temp data dir, fixed-identity codec and store in one place

pub mod harness;
pub mod mock_store;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_store::MockSettingsStore;
