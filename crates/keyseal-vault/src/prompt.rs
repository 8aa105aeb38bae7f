// SPDX-FileCopyrightText: 2026 Keyseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Secret acquisition via TTY prompt or the KEYSEAL_SECRET environment variable.

use keyseal_core::KeysealError;
use secrecy::SecretString;

/// Environment variable consulted before prompting for a secret value.
pub const SECRET_ENV_VAR: &str = "KEYSEAL_SECRET";

/// Get a secret value from the environment or an interactive hidden prompt.
///
/// Priority:
/// 1. `KEYSEAL_SECRET` (scripts, CI)
/// 2. Hidden TTY prompt via `rpassword`
///
/// Empty values are rejected from either source.
pub fn read_secret(prompt: &str) -> Result<SecretString, KeysealError> {
    if let Ok(value) = std::env::var(SECRET_ENV_VAR)
        && !value.is_empty()
    {
        return Ok(SecretString::from(value));
    }

    if std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        eprint!("{prompt}: ");
        let value = rpassword::read_password()
            .map_err(|e| KeysealError::Internal(format!("failed to read secret: {e}")))?;
        if value.is_empty() {
            return Err(KeysealError::Config("empty secret not allowed".to_string()));
        }
        return Ok(SecretString::from(value));
    }

    Err(KeysealError::Config(format!(
        "no secret provided. Pass it as an argument, set {SECRET_ENV_VAR}, or run interactively."
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serial_test::serial;

    #[test]
    #[serial]
    fn reads_secret_from_env_var() {
        // SAFETY: test-only env mutation, serialized with #[serial].
        unsafe { std::env::set_var(SECRET_ENV_VAR, "sk-live-abc123") };
        let result = read_secret("API key");
        unsafe { std::env::remove_var(SECRET_ENV_VAR) };

        assert_eq!(result.unwrap().expose_secret(), "sk-live-abc123");
    }

    #[test]
    #[serial]
    fn empty_env_var_without_tty_is_rejected() {
        unsafe { std::env::set_var(SECRET_ENV_VAR, "") };
        // Test harness stdin is not a terminal.
        let result = read_secret("API key");
        unsafe { std::env::remove_var(SECRET_ENV_VAR) };

        if !std::io::IsTerminal::is_terminal(&std::io::stdin()) {
            let err = result.unwrap_err();
            assert!(err.to_string().contains(SECRET_ENV_VAR));
        }
    }
}
