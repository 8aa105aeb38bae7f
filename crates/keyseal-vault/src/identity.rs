// SPDX-FileCopyrightText: 2026 Keyseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Machine identity derivation.
//!
//! The identity is the key-derivation input in place of a user password. It
//! is recomputed on every call and never cached or persisted, so a test can
//! swap in a [`FixedIdentity`] without touching process-wide state.

/// Separator between identity components.
const SEPARATOR: &str = "|";

/// Source of the local identifiers that make up a machine identity.
///
/// Every method is best-effort: `None` (or a blank string) means the
/// identifier is unavailable and is simply left out.
pub trait IdentitySource {
    /// Host name of the machine.
    fn host_name(&self) -> Option<String>;

    /// Platform descriptor, e.g. `linux-x86_64`.
    fn platform(&self) -> Option<String>;

    /// Account name of the current user.
    fn user_name(&self) -> Option<String>;

    /// Platform-specific installation GUID.
    fn install_id(&self) -> Option<String>;

    /// Names of the components this source can currently provide.
    ///
    /// Used for diagnostics; never exposes the values.
    fn available_components(&self) -> Vec<&'static str> {
        components(self)
            .into_iter()
            .filter_map(|(name, value)| value.map(|_| name))
            .collect()
    }
}

/// Live identity read from the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemIdentity;

impl IdentitySource for SystemIdentity {
    fn host_name(&self) -> Option<String> {
        hostname::get()
            .ok()
            .map(|name| name.to_string_lossy().into_owned())
    }

    /// OS family and architecture only; kernel or patch versions would change
    /// the identity on every update.
    fn platform(&self) -> Option<String> {
        Some(format!(
            "{}-{}",
            std::env::consts::OS,
            std::env::consts::ARCH
        ))
    }

    fn user_name(&self) -> Option<String> {
        std::env::var("USERNAME")
            .or_else(|_| std::env::var("USER"))
            .ok()
    }

    fn install_id(&self) -> Option<String> {
        crate::platform::install_id()
    }
}

/// Identity with a fixed value, for tests and for tooling that must decrypt
/// tokens produced elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedIdentity(String);

impl FixedIdentity {
    pub fn new(identity: impl Into<String>) -> Self {
        Self(identity.into())
    }
}

impl IdentitySource for FixedIdentity {
    fn host_name(&self) -> Option<String> {
        Some(self.0.clone())
    }

    fn platform(&self) -> Option<String> {
        None
    }

    fn user_name(&self) -> Option<String> {
        None
    }

    fn install_id(&self) -> Option<String> {
        None
    }
}

impl<T: IdentitySource + ?Sized> IdentitySource for &T {
    fn host_name(&self) -> Option<String> {
        (**self).host_name()
    }

    fn platform(&self) -> Option<String> {
        (**self).platform()
    }

    fn user_name(&self) -> Option<String> {
        (**self).user_name()
    }

    fn install_id(&self) -> Option<String> {
        (**self).install_id()
    }
}

/// Derive the identity string: available components, in order, joined by `|`.
///
/// Never fails; an unavailable component is omitted.
pub fn derive_identity<S: IdentitySource + ?Sized>(source: &S) -> String {
    components(source)
        .into_iter()
        .filter_map(|(_, value)| value)
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

fn components<S: IdentitySource + ?Sized>(source: &S) -> [(&'static str, Option<String>); 4] {
    [
        ("host_name", source.host_name()),
        ("platform", source.platform()),
        ("user_name", source.user_name()),
        ("install_id", source.install_id()),
    ]
    .map(|(name, value)| (name, value.filter(|v| !v.trim().is_empty())))
}
