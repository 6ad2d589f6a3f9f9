//! Config subcommand handlers.

use std::io::IsTerminal;

use dialoguer::Input;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Helpers ─────────────────────────────────────────────────────────

fn format_config(cfg: &Config) -> String {
    toml::to_string_pretty(cfg).unwrap_or_else(|e| format!("# failed to render config: {e}"))
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Ask for the data directory and scanner device. Empty answers keep the
/// defaults.
fn prompt_config() -> Result<Config, CliError> {
    let mut cfg = Config::default();

    let data_dir: String = Input::new()
        .with_prompt("Data directory")
        .default(config::default_data_dir().display().to_string())
        .interact_text()
        .map_err(prompt_err)?;
    if data_dir != config::default_data_dir().display().to_string() {
        cfg.set("storage.data_dir", &data_dir)?;
    }

    let device: String = Input::new()
        .with_prompt("Scanner device (serial port or FIFO, empty for none)")
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_err)?;
    if !device.trim().is_empty() {
        cfg.set("scanner.device", device.trim())?;
    }

    Ok(cfg)
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: guided setup ──────────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            if config_path.exists()
                && !util::confirm(
                    &format!("Overwrite existing config at {}?", config_path.display()),
                    "config init",
                    global.yes,
                )?
            {
                return Ok(());
            }

            let interactive = !global.yes && std::io::stdin().is_terminal();
            let cfg = if interactive {
                output::print_status(
                    &format!("cyltrack configuration\n   Config path: {}\n", config_path.display()),
                    global.quiet,
                );
                prompt_config()?
            } else {
                Config::default()
            };

            let path = config::save_config(&cfg)?;
            output::print_status(
                &format!("✓ Configuration written to {}", path.display()),
                global.quiet,
            );
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let out = output::render_single(&global.output(), &cfg, format_config, |_| {
                "config".into()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            cfg.set(&key, &value).map_err(|e| match e {
                cyltrack_config::ConfigError::UnknownKey(other) => CliError::Validation {
                    field: other.clone(),
                    reason: format!(
                        "unknown config key '{other}'. Valid keys: {}",
                        config::SETTABLE_KEYS.join(", ")
                    ),
                },
                other => other.into(),
            })?;
            let path = config::save_config(&cfg)?;
            output::print_status(
                &format!("✓ Set {key} in {}", path.display()),
                global.quiet,
            );
            Ok(())
        }
    }
}
