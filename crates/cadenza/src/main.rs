// SPDX-FileCopyrightText: 2026 Cadenza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cadenza - talk to Sonic Pi.
//!
//! This is the binary entry point: `cadenza serve` for the web UI API and
//! `cadenza chat` for a terminal session.

mod serve;
mod shell;
mod shutdown;

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::path::PathBuf;
use std::sync::Arc;

use cadenza_agent::{SessionController, load_system_prompt};
use cadenza_azure::AzureProvider;
use cadenza_config::CadenzaConfig;
use cadenza_core::CadenzaError;
use cadenza_sonicpi::SonicPiSink;
use cadenza_storage::FileSnapshotStore;
use clap::{Parser, Subcommand};

/// Cadenza - talk to Sonic Pi.
#[derive(Parser, Debug)]
#[command(name = "cadenza", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP API used by the web UI.
    Serve,
    /// Chat with the live coder in the terminal.
    Chat,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => cadenza_config::load_and_validate_path(path),
        None => cadenza_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            cadenza_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Chat) => shell::run_shell(config).await,
        None => {
            println!("cadenza: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Wires the configured adapters into a ready controller.
pub(crate) async fn build_controller(
    config: &CadenzaConfig,
) -> Result<SessionController, CadenzaError> {
    let provider = Arc::new(AzureProvider::new(&config.azure)?);
    let sink = Arc::new(SonicPiSink::new(&config.sonic_pi));
    let store = Arc::new(FileSnapshotStore::new(&config.storage));
    let system_prompt = load_system_prompt(&config.agent).await;

    SessionController::new(
        provider,
        sink,
        store,
        system_prompt,
        config.agent.max_retries,
    )
    .await
}

/// Initializes the tracing subscriber with the given log level.
///
/// `RUST_LOG` takes precedence when set. Output goes to stderr so the chat
/// shell's stdout stays clean.
pub(crate) fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("cadenza={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = cadenza_config::load_and_validate_str("")
            .expect("default config should be valid");
        assert_eq!(config.agent.name, "cadenza");
        assert_eq!(config.agent.max_retries, 3);
    }

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::parse_from(["cadenza", "--config", "/tmp/c.toml", "serve"]);
        assert!(matches!(cli.command, Some(Commands::Serve)));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));

        let cli = Cli::parse_from(["cadenza", "chat"]);
        assert!(matches!(cli.command, Some(Commands::Chat)));
    }
}
