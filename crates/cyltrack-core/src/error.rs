// ── Core error types ──
//
// User-facing errors from cyltrack-core. Not-found on mutations is a silent
// no-op (see `CommandResult::Unchanged`), so it has no variant here; scan
// misses live in `ScanError`.

use thiserror::Error;

use crate::persist::PersistError;
use crate::scan::ScanError;
use crate::scanner::ScannerError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Input errors ─────────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error(transparent)]
    Scan(#[from] ScanError),

    // ── Collaborator errors ──────────────────────────────────────────
    #[error(transparent)]
    Persistence(#[from] PersistError),

    #[error(transparent)]
    Scanner(#[from] ScannerError),
}

impl CoreError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }
}
