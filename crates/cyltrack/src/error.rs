//! CLI error types with miette diagnostics.
//!
//! Maps core and config errors into user-facing errors with actionable
//! help text and stable exit codes.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use cyltrack_config::ConfigError;
use cyltrack_core::{CoreError, ScanError, ScannerError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(cyltrack::not_found),
        help("Run: cyltrack {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("Could not add {resource_type}: {reason}")]
    #[diagnostic(code(cyltrack::conflict))]
    Conflict {
        resource_type: String,
        reason: String,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(cyltrack::validation))]
    Validation { field: String, reason: String },

    #[error("Please enter a valid 6-digit cylinder ID.")]
    #[diagnostic(
        code(cyltrack::invalid_id),
        help("Got '{input}'. Cylinder IDs are exactly six digits, e.g. 100001.")
    )]
    InvalidCylinderId { input: String },

    // ── Storage ──────────────────────────────────────────────────────
    #[error("Changes could not be saved to {}", .dir.display())]
    #[diagnostic(
        code(cyltrack::save_failed),
        help("Check that the data directory is writable, or choose another with --data-dir. Run with -v for details.")
    )]
    SaveFailed { dir: PathBuf },

    // ── Scanner ──────────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(cyltrack::scanner),
        help("Set scanner.device in the config file or pass --device <PATH> (`-` for stdin).")
    )]
    Scanner(#[from] ScannerError),

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(cyltrack::config), help("Fix it with: cyltrack config set <KEY> <VALUE>"))]
    Config(#[from] ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(cyltrack::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::Validation { .. }
            | Self::InvalidCylinderId { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    pub fn cylinder_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: "cylinder".into(),
            identifier: id.into(),
            list_command: "cylinders list".into(),
        }
    }

    pub fn type_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: "cylinder type".into(),
            identifier: id.into(),
            list_command: "types list".into(),
        }
    }
}

// ── Core → CliError mapping ──────────────────────────────────────────

impl From<ScanError> for CliError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::InvalidFormat { input } => CliError::InvalidCylinderId { input },
            ScanError::NotFound { id } => CliError::cylinder_not_found(id.as_str()),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },
            CoreError::Scan(e) => e.into(),
            CoreError::Scanner(e) => CliError::Scanner(e),
            CoreError::Persistence(e) => CliError::Io(std::io::Error::other(e)),
        }
    }
}
