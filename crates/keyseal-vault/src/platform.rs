// SPDX-FileCopyrightText: 2026 Keyseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Platform-specific identifier lookup and file protection.
//!
//! Each target gets its own implementation; anything else falls back to
//! "unavailable" for identifiers and a no-op for file protection. Callers
//! treat both as best-effort.

use std::io;
use std::path::Path;

/// Installation GUID of the operating system, where one can be read.
///
/// Windows: `HKLM\SOFTWARE\Microsoft\Cryptography\MachineGuid`.
/// Linux: `/etc/machine-id` (or the dbus copy). macOS: `IOPlatformUUID`.
pub fn install_id() -> Option<String> {
    imp::install_id()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
}

/// Restrict the file to the current user and hide it where the platform
/// supports that.
pub fn protect_file(path: &Path) -> io::Result<()> {
    imp::protect_file(path)
}

#[cfg(unix)]
mod imp {
    use std::fs;
    use std::io;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    #[cfg(any(target_os = "linux", target_os = "macos", target_os = "freebsd"))]
    pub fn install_id() -> Option<String> {
        machine_uid::get().ok()
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "freebsd")))]
    pub fn install_id() -> Option<String> {
        None
    }

    /// Unix has no hidden attribute beyond the leading dot; owner-only
    /// permissions are the protection.
    pub fn protect_file(path: &Path) -> io::Result<()> {
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))
    }
}

#[cfg(windows)]
mod imp {
    use std::io;
    use std::iter;
    use std::os::windows::ffi::OsStrExt;
    use std::path::Path;

    use windows_sys::Win32::Storage::FileSystem::{
        GetFileAttributesW, SetFileAttributesW, FILE_ATTRIBUTE_HIDDEN, INVALID_FILE_ATTRIBUTES,
    };

    pub fn install_id() -> Option<String> {
        machine_uid::get().ok()
    }

    /// Add the hidden attribute, keeping whatever attributes are already set.
    pub fn protect_file(path: &Path) -> io::Result<()> {
        let wide: Vec<u16> = path
            .as_os_str()
            .encode_wide()
            .chain(iter::once(0))
            .collect();

        // SAFETY: `wide` is NUL-terminated and outlives both calls.
        let attributes = unsafe { GetFileAttributesW(wide.as_ptr()) };
        if attributes == INVALID_FILE_ATTRIBUTES {
            return Err(io::Error::last_os_error());
        }
        // SAFETY: as above.
        if unsafe { SetFileAttributesW(wide.as_ptr(), attributes | FILE_ATTRIBUTE_HIDDEN) } == 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

#[cfg(not(any(unix, windows)))]
mod imp {
    use std::io;
    use std::path::Path;

    pub fn install_id() -> Option<String> {
        None
    }

    pub fn protect_file(_path: &Path) -> io::Result<()> {
        Ok(())
    }
}
