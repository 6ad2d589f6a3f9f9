// ── Cylinder and cylinder type records ──
//
// Field names and casing match the persisted JSON entries exactly
// (`typeId`, `tareWeight`). There is no schema version field.

use serde::{Deserialize, Serialize};

use super::unit::MeasurementUnit;

/// A category of cylinder sharing one measurement unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CylinderType {
    /// Opaque identifier, assigned at creation and never changed.
    pub id: String,
    /// User-supplied label, trimmed and non-empty.
    pub name: String,
    pub unit: MeasurementUnit,
}

/// One physical cylinder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cylinder {
    /// Six-digit numeric string for cylinders created here; imported data
    /// may hold anything.
    pub id: String,
    /// Owning type. Deleting the type deletes this cylinder.
    pub type_id: String,
    /// Gross weight for mass types, gauge reading for pressure types.
    pub value: f64,
    /// Empty-container weight. Only meaningful for mass types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tare_weight: Option<f64>,
}

impl Cylinder {
    /// Net contents for display: `value - tare`, never below zero.
    ///
    /// Returns `None` for pressure types, which have no tare.
    pub fn net_contents(&self, unit: MeasurementUnit) -> Option<f64> {
        match unit {
            MeasurementUnit::Mass => Some((self.value - self.tare_weight.unwrap_or(0.0)).max(0.0)),
            MeasurementUnit::Pressure => None,
        }
    }

    /// Apply an update in place, leaving `id` and `type_id` untouched.
    ///
    /// `tare_weight` is only replaced when the update carries one.
    pub fn apply(&mut self, update: &CylinderUpdate) {
        self.value = update.value;
        if let Some(tare) = update.tare_weight {
            self.tare_weight = Some(tare);
        }
    }
}

/// New readings for an existing cylinder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CylinderUpdate {
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tare_weight: Option<f64>,
}

impl CylinderUpdate {
    pub fn value(value: f64) -> Self {
        Self {
            value,
            tare_weight: None,
        }
    }

    pub fn with_tare(value: f64, tare_weight: f64) -> Self {
        Self {
            value,
            tare_weight: Some(tare_weight),
        }
    }
}
