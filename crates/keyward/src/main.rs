// SPDX-FileCopyrightText: 2026 Keyward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! keyward - keeps local account data in step with a rate-limited remote API.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod runtime;
mod serve;
mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use keyward_config::KeywardConfig;

/// keyward - rate-limited API poller.
#[derive(Parser, Debug)]
#[command(name = "keyward", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the scheduler and worker pool until SIGINT or SIGTERM.
    Serve,
    /// Run one scheduling pass and print what it dispatched.
    Pass {
        #[arg(long)]
        json: bool,
    },
    /// Show schedule state counts, cache size and queue depth.
    Status {
        #[arg(long)]
        json: bool,
    },
}

fn load_config(path: Option<&PathBuf>) -> KeywardConfig {
    let loaded = match path {
        Some(path) => keyward_config::load_and_validate_path(path),
        None => keyward_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            keyward_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("keyward={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref());
    init_tracing(&config.daemon.log_level);

    let result = match cli.command {
        Commands::Serve => serve::run_serve(config).await,
        Commands::Pass { json } => status::run_pass(&config, json).await,
        Commands::Status { json } => status::run_status(&config, json).await,
    };

    if let Err(e) = result {
        eprintln!("keyward: {e}");
        std::process::exit(1);
    }
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
    fn parses_subcommands() {
        let cli = Cli::try_parse_from(["keyward", "status", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::Status { json: true }));

        let cli = Cli::try_parse_from(["keyward", "--config", "/tmp/k.toml", "serve"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/k.toml")));
        assert!(matches!(cli.command, Commands::Serve));
    }
}
