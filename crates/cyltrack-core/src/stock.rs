// ── Low-stock classification ──
//
// Pure, unit-aware rule applied per cylinder. Thresholds are fixed
// policy, not configuration.

use serde::{Deserialize, Serialize};

use crate::model::{Cylinder, MeasurementUnit};

/// A mass cylinder with less net contents than this (kg) is low.
pub const LOW_MASS_THRESHOLD: f64 = 1.0;

/// A pressure cylinder reading below this (PSI) is low.
pub const LOW_PRESSURE_THRESHOLD: f64 = 300.0;

/// Presentation-friendly classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockLevel {
    Ok,
    Low,
}

impl StockLevel {
    pub fn of(cylinder: &Cylinder, unit: MeasurementUnit) -> Self {
        if is_low(cylinder, unit) {
            Self::Low
        } else {
            Self::Ok
        }
    }

    pub fn is_low(self) -> bool {
        matches!(self, Self::Low)
    }
}

/// Whether `cylinder` is near empty under `unit`'s threshold.
///
/// Mass: `value - tare < 1`, absent tare counts as zero. The difference is
/// not clamped here, so a negative net is low too. Pressure: `value < 300`.
pub fn is_low(cylinder: &Cylinder, unit: MeasurementUnit) -> bool {
    match unit {
        MeasurementUnit::Mass => {
            let net = cylinder.value - cylinder.tare_weight.unwrap_or(0.0);
            net < LOW_MASS_THRESHOLD
        }
        MeasurementUnit::Pressure => cylinder.value < LOW_PRESSURE_THRESHOLD,
    }
}
