// ── Domain model ──
//
// Canonical types shared by the CLI, the TUI, and the storage format.

mod cylinder;
mod snapshot;
mod unit;

pub use cylinder::{Cylinder, CylinderType, CylinderUpdate};
pub use snapshot::Snapshot;
pub use unit::MeasurementUnit;
