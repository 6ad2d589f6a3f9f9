//! All possible UI actions. Actions are the sole mechanism for state mutation.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use cyltrack_core::{Command, Snapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A toast notification.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Error,
        }
    }

    pub fn warning(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Warning,
        }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Info,
        }
    }
}

/// Deletion awaiting confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingDelete {
    Type { id: String, name: String },
    Cylinder { id: String },
}

impl PendingDelete {
    pub fn into_command(self) -> Command {
        match self {
            Self::Type { id, .. } => Command::DeleteType { id },
            Self::Cylinder { id } => Command::DeleteCylinder { id },
        }
    }
}

impl fmt::Display for PendingDelete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type { .. } => f.write_str(
                "Are you sure you want to delete this cylinder type? All associated \
                 cylinders will also be deleted. This action cannot be undone.",
            ),
            Self::Cylinder { .. } => f.write_str(
                "Are you sure you want to delete this cylinder? This action cannot be undone.",
            ),
        }
    }
}

/// Every state transition in the TUI is expressed as an Action.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Tick,
    Render,

    // ── Data Events (from the inventory stream) ───────────────────
    SnapshotUpdated(Arc<Snapshot>),
    Saved(DateTime<Utc>),

    // ── Inventory Commands ────────────────────────────────────────
    Execute(Command),

    // ── Scanning ──────────────────────────────────────────────────
    /// Resolve a typed or decoded id and open its edit modal.
    ResolveScan(String),
    ScanDecoded(String),
    ScanFailed(String),

    // ── Modals ────────────────────────────────────────────────────
    OpenAddType,
    OpenEditCylinder(String),
    OpenScan,
    ShowConfirm(PendingDelete),
    CloseModal,

    // ── Help ──────────────────────────────────────────────────────
    ToggleHelp,

    // ── Notifications ─────────────────────────────────────────────
    Notify(Notification),
    DismissNotification,
}
