//! CLI configuration: thin wrapper around `cyltrack_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--data-dir, --output, --color).

use std::path::PathBuf;

use clap::ValueEnum;

use cyltrack_core::{FileStore, Inventory};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};

// ── Re-exports from shared crate ────────────────────────────────────

pub use cyltrack_config::{
    Config, SETTABLE_KEYS, config_path, default_data_dir, load_config, load_config_or_default,
    save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Fill unset `--output` / `--color` from the config file's `[defaults]`.
pub fn apply_defaults(global: &mut GlobalOpts, cfg: &Config) {
    if global.output.is_none() {
        global.output = OutputFormat::from_str(&cfg.defaults.output, true).ok();
    }
    if global.color.is_none() {
        global.color = ColorMode::from_str(&cfg.defaults.color, true).ok();
    }
}

/// Data directory: `--data-dir` / `CYLTRACK_DATA_DIR`, then config, then
/// the platform default.
pub fn data_dir(global: &GlobalOpts, cfg: &Config) -> PathBuf {
    cyltrack_config::resolve_data_dir(cfg, global.data_dir.as_deref())
}

/// Open the file-backed inventory in the resolved data directory.
pub fn open_inventory(global: &GlobalOpts, cfg: &Config) -> (Inventory, PathBuf) {
    let dir = data_dir(global, cfg);
    tracing::debug!(data_dir = %dir.display(), "opening inventory");
    (Inventory::open(FileStore::new(&dir)), dir)
}
