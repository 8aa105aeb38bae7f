// SPDX-FileCopyrightText: 2026 Keyseal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyseal - machine-bound encryption for locally stored API keys.
//!
//! This is the binary entry point for the operator CLI.

mod commands;
mod doctor;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use keyseal_config::KeysealConfig;
use keyseal_core::KeysealError;
use keyseal_vault::SecretCodec;

/// Keyseal - machine-bound encryption for locally stored API keys.
#[derive(Parser, Debug)]
#[command(name = "keyseal", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Encrypt a value and print the token.
    Encrypt {
        /// Value to encrypt. Read from KEYSEAL_SECRET or a hidden prompt if omitted.
        value: Option<String>,
    },
    /// Decrypt a token and print the plaintext.
    Decrypt {
        token: String,
        /// Fail instead of printing an empty line when decryption fails.
        #[arg(long)]
        strict: bool,
    },
    /// Print a stored setting (sensitive values are masked).
    Get {
        key: String,
        /// Fail instead of printing an empty value when decryption fails.
        #[arg(long)]
        strict: bool,
        /// Print sensitive values in full.
        #[arg(long)]
        reveal: bool,
    },
    /// Store a setting, encrypting it if it is sensitive.
    Set {
        key: String,
        /// Value to store. Read from KEYSEAL_SECRET or a hidden prompt if omitted.
        value: Option<String>,
    },
    /// Encrypt any plaintext API keys left in the settings database.
    Migrate,
    /// Run diagnostic checks on the local installation.
    Doctor {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => keyseal_config::load_and_validate_path(path),
        None => keyseal_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            keyseal_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.app.log_level);

    if let Err(e) = run(cli, &config) {
        eprintln!("keyseal: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli, config: &KeysealConfig) -> Result<(), KeysealError> {
    let mut out = std::io::stdout().lock();
    let codec = SecretCodec::from_config(config);
    match cli.command {
        Commands::Encrypt { value } => commands::encrypt(&codec, value, &mut out),
        Commands::Decrypt { token, strict } => commands::decrypt(&codec, &token, strict, &mut out),
        Commands::Get {
            key,
            strict,
            reveal,
        } => {
            let settings = commands::open_settings(config, codec)?;
            commands::get(&settings, &key, strict, reveal, &mut out)
        }
        Commands::Set { key, value } => {
            let settings = commands::open_settings(config, codec)?;
            commands::set(&settings, &key, value, &mut out)
        }
        Commands::Migrate => commands::migrate(&commands::open_settings(config, codec)?, &mut out),
        Commands::Doctor { plain } => {
            doctor::run_doctor(config, &codec, cli.config.as_deref(), plain)
        }
    }
}

/// Initialize the tracing subscriber. Logs go to stderr so stdout stays
/// clean for tokens and values.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    // `keyseal` also matches the `keyseal_*` library targets.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("keyseal={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
