// SPDX-FileCopyrightText: 2026 Keyseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator contracts consumed by the vault layer.

pub mod settings;

pub use settings::SettingsStore;
