//! `cyltrack-tui`: terminal inventory for gas cylinders.
//!
//! Built on [ratatui](https://ratatui.rs) with reactive data from
//! `cyltrack-core`'s [`InventoryStream`](cyltrack_core::InventoryStream).
//! One screen lists every cylinder type with its cylinders; modals add
//! types, edit readings, confirm deletions, and run a scan session.
//!
//! Logs are written to a file (default `<data dir>/cyltrack-tui.log`) to
//! avoid corrupting the terminal UI.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod modals;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use cyltrack_core::{FileStore, Inventory, ScanSource};

use crate::app::App;

/// Terminal dashboard for tracking gas cylinder stock.
#[derive(Parser, Debug)]
#[command(name = "cyltrack-tui", version, about)]
struct Cli {
    /// Directory holding the inventory files
    #[arg(long, env = "CYLTRACK_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Scanner device to read ids from (overrides scanner.device)
    #[arg(long, env = "CYLTRACK_SCANNER_DEVICE")]
    device: Option<String>,

    /// Log file path (defaults to <data dir>/cyltrack-tui.log)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Set up file-based tracing. Nothing may log to stdout/stderr while the
/// TUI owns the terminal. The returned guard flushes on drop.
fn setup_tracing(verbose: u8, log_file: &Path) -> WorkerGuard {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("cyltrack_tui={log_level},cyltrack_core={log_level}"))
    });

    let log_dir = log_file.parent().unwrap_or_else(|| Path::new("."));
    let log_filename = log_file
        .file_name()
        .unwrap_or_else(|| std::ffi::OsStr::new("cyltrack-tui.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Hooks go in before the terminal is touched
    tui::install_hooks()?;

    let config = cyltrack_config::load_config().wrap_err("failed to load configuration")?;
    let data_dir = cyltrack_config::resolve_data_dir(&config, cli.data_dir.as_deref());
    std::fs::create_dir_all(&data_dir)
        .wrap_err_with(|| format!("cannot create data directory {}", data_dir.display()))?;

    let log_file = cli
        .log_file
        .clone()
        .unwrap_or_else(|| data_dir.join("cyltrack-tui.log"));
    let _log_guard = setup_tracing(cli.verbose, &log_file);

    info!(data_dir = %data_dir.display(), "starting cyltrack-tui");

    let qr = config.qr_link()?;
    // No stdin fallback: the terminal belongs to the UI
    let scanner: Arc<dyn ScanSource> = Arc::new(config.line_scanner(cli.device.as_deref(), None));
    let inventory = Inventory::open(FileStore::new(&data_dir));

    let mut app = App::new(inventory, scanner, qr);
    app.run().await?;

    Ok(())
}
