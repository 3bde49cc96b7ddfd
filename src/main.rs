//! # padmap
//!
//! Watches `/dev/input` for gamepads and prints the canonical events produced
//! by translating their raw input through the mapping database.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{interval, Duration};
use tracing::{info, warn};

use padmap::backend::evdev::probe;
use padmap::config::{Config, OutputFormat};
use padmap::event::InputEvent;
use padmap::registry::Dispatcher;

/// Configuration file used when none is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Main entry point for the padmap monitor
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Set up logging with tracing subscriber (stderr, events go to stdout)
///    - Load configuration, falling back to defaults when the file is absent
///    - Load the mapping database and create the dispatcher
///
/// 2. **Main Loop**
///    - Rescan `/dev/input` every `probe_interval_ms` and start a reader
///      thread per new gamepad
///    - Print each canonical event as text or JSON lines
///    - Forget devices whose reader stopped so they can be picked up again
///    - Handle Ctrl+C for graceful shutdown
///
/// # Examples
///
/// ```bash
/// padmap config/default.toml
/// ```
///
/// Expected output:
/// ```text
/// device 0 connected
/// device 0 button a pressed
/// device 0 axis leftx = -0.412
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("padmap v{} starting...", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let config = Config::load_or_default(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))?;

    let database = config.load_database();
    info!("{} mapping(s) available", database.len());

    let (dispatcher, mut events) = Dispatcher::new(database, config.dispatcher_options());
    let dispatcher = Arc::new(dispatcher);

    let (closed_tx, mut closed_rx) = mpsc::unbounded_channel::<PathBuf>();
    let mut open_paths: HashSet<PathBuf> = HashSet::new();
    let mut probe_interval = interval(Duration::from_millis(config.monitor.probe_interval_ms));

    info!("Press Ctrl+C to exit");

    loop {
        tokio::select! {
            _ = probe_interval.tick() => {
                let joypads = match probe(&dispatcher, &open_paths) {
                    Ok(joypads) => joypads,
                    Err(e) => {
                        warn!("Device scan failed: {}", e);
                        continue;
                    }
                };

                for joypad in joypads {
                    let path = joypad.path().to_path_buf();
                    open_paths.insert(path.clone());

                    let dispatcher = Arc::clone(&dispatcher);
                    let closed_tx = closed_tx.clone();
                    // Reads block, so each device gets its own thread
                    std::thread::spawn(move || {
                        joypad.run(&dispatcher);
                        let _ = closed_tx.send(path);
                    });
                }
            }

            Some(event) = events.recv() => {
                println!("{}", format_event(&event, config.monitor.format)?);
            }

            Some(path) = closed_rx.recv() => {
                open_paths.remove(&path);
            }

            // Handle Ctrl+C for graceful shutdown
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    Ok(())
}

/// Renders one event in the configured output format
fn format_event(event: &InputEvent, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(event.to_string()),
        OutputFormat::Jsonl => serde_json::to_string(event).context("Failed to serialize event"),
    }
}
