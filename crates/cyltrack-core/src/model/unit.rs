// ── Measurement unit ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// How a cylinder type is measured.
///
/// Closed set, fixed when a type is created. Decides which cylinder fields
/// are meaningful and which low-stock threshold applies.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum MeasurementUnit {
    /// `value` is the gross weight; a tare weight is tracked alongside it.
    Mass,
    /// `value` is the gauge reading.
    Pressure,
}

impl MeasurementUnit {
    /// Short unit label used next to values (`kg` / `PSI`).
    pub fn label(self) -> &'static str {
        match self {
            Self::Mass => "kg",
            Self::Pressure => "PSI",
        }
    }

    pub fn is_mass(self) -> bool {
        matches!(self, Self::Mass)
    }

    /// The other unit. Used by form toggles.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Mass => Self::Pressure,
            Self::Pressure => Self::Mass,
        }
    }
}
