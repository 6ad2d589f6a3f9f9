// ── Command API ──
//
// All inventory mutations flow through a unified `Command` enum executed by
// `Inventory::execute`.

use serde::Serialize;

use crate::model::{Cylinder, CylinderType, CylinderUpdate, MeasurementUnit};

/// All possible write operations against the inventory.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    // ── Type operations ──────────────────────────────────────────────
    AddType {
        name: String,
        unit: MeasurementUnit,
    },
    /// Removes the type and every cylinder of that type.
    DeleteType {
        id: String,
    },

    // ── Cylinder operations ──────────────────────────────────────────
    AddCylinder {
        type_id: String,
    },
    UpdateCylinder {
        id: String,
        update: CylinderUpdate,
    },
    DeleteCylinder {
        id: String,
    },
}

impl Command {
    /// Short verb for log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddType { .. } => "add_type",
            Self::DeleteType { .. } => "delete_type",
            Self::AddCylinder { .. } => "add_cylinder",
            Self::UpdateCylinder { .. } => "update_cylinder",
            Self::DeleteCylinder { .. } => "delete_cylinder",
        }
    }
}

/// Outcome of an executed [`Command`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CommandResult {
    TypeAdded(CylinderType),
    TypeDeleted { id: String, cylinders_removed: usize },
    CylinderAdded(Cylinder),
    CylinderUpdated(Cylinder),
    CylinderDeleted { id: String },
    /// Unknown id or rejected input. Nothing was written.
    Unchanged,
}

impl CommandResult {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }
}
