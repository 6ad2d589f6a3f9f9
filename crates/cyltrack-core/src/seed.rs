// ── Seed dataset ──
//
// Installed on first run, and whenever persisted state cannot be read.

use crate::model::{Cylinder, CylinderType, MeasurementUnit, Snapshot};

/// The fixed fallback dataset: three types, six cylinders.
pub fn snapshot() -> Snapshot {
    Snapshot::new(types(), cylinders())
}

pub fn types() -> Vec<CylinderType> {
    vec![
        cylinder_type("ct1", "CO2", MeasurementUnit::Mass),
        cylinder_type("ct2", "Argon", MeasurementUnit::Pressure),
        cylinder_type("ct3", "Nitrogen", MeasurementUnit::Pressure),
    ]
}

pub fn cylinders() -> Vec<Cylinder> {
    vec![
        cylinder("100001", "ct1", 25.5, Some(10.2)),
        cylinder("100002", "ct1", 15.1, Some(10.1)),
        // empty
        cylinder("100003", "ct1", 10.0, Some(10.0)),
        cylinder("200001", "ct2", 3000.0, None),
        cylinder("200002", "ct2", 750.0, None),
        cylinder("300001", "ct3", 2200.0, None),
    ]
}

fn cylinder_type(id: &str, name: &str, unit: MeasurementUnit) -> CylinderType {
    CylinderType {
        id: id.into(),
        name: name.into(),
        unit,
    }
}

fn cylinder(id: &str, type_id: &str, value: f64, tare_weight: Option<f64>) -> Cylinder {
    Cylinder {
        id: id.into(),
        type_id: type_id.into(),
        value,
        tare_weight,
    }
}
