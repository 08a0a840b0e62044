//! txt-redirect
//!
//! Answers every request with a redirect whose destination is rendered from
//! a placeholder template.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server ──▶ routing (rule + captures + segments)
//!                                           │
//!                                           ▼
//!     Client Response                  placeholder::render
//!     ◀────────────── 3xx Location ◀────────┘
//!
//!     config (TOML) ──▶ validation ──▶ rule table   (hot swapped with --watch)
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use txt_redirect::config::{load_config, ConfigWatcher};
use txt_redirect::lifecycle::{wait_for_signal, Shutdown};
use txt_redirect::observability::init_logging;
use txt_redirect::RedirectServer;

#[derive(Parser)]
#[command(name = "txt-redirect")]
#[command(about = "Redirect server rendering placeholder templates", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "txt-redirect.toml")]
    config: PathBuf,

    /// Reload rules when the configuration file changes.
    #[arg(short, long)]
    watch: bool,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    if cli.check {
        println!(
            "{}: ok ({} rules)",
            cli.config.display(),
            config.rules.len()
        );
        return Ok(());
    }

    init_logging(&config.observability)?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        rules = config.rules.len(),
        enabled = ?config.enabled_kinds(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    // Keep the watcher alive for the lifetime of the server
    let (_watcher, config_updates) = if cli.watch {
        let (watcher, updates) = ConfigWatcher::new(&cli.config);
        (Some(watcher.run()?), updates)
    } else {
        let (_, updates) = mpsc::unbounded_channel();
        (None, updates)
    };

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    });

    let server = RedirectServer::new(config)?;
    server.run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
