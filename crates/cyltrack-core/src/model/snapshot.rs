// ── Inventory snapshot ──
//
// One immutable pair of collections. The Inventory replaces the whole
// snapshot on every accepted mutation; readers hold an `Arc` to whichever
// snapshot was current when they looked.

use serde::{Deserialize, Serialize};

use super::cylinder::{Cylinder, CylinderType};
use super::unit::MeasurementUnit;
use crate::stock;

/// Both collections, in insertion order. Lookups are linear scans.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub types: Vec<CylinderType>,
    pub cylinders: Vec<Cylinder>,
}

impl Snapshot {
    pub fn new(types: Vec<CylinderType>, cylinders: Vec<Cylinder>) -> Self {
        Self { types, cylinders }
    }

    pub fn type_by_id(&self, id: &str) -> Option<&CylinderType> {
        self.types.iter().find(|t| t.id == id)
    }

    pub fn cylinder_by_id(&self, id: &str) -> Option<&Cylinder> {
        self.cylinders.iter().find(|c| c.id == id)
    }

    /// Cylinders belonging to `type_id`, in insertion order.
    pub fn cylinders_of<'a>(&'a self, type_id: &'a str) -> impl Iterator<Item = &'a Cylinder> + 'a {
        self.cylinders.iter().filter(move |c| c.type_id == type_id)
    }

    /// Unit of the cylinder's owning type, if that type still exists.
    pub fn unit_of(&self, cylinder: &Cylinder) -> Option<MeasurementUnit> {
        self.type_by_id(&cylinder.type_id).map(|t| t.unit)
    }

    /// Every cylinder with a known type that is classified as low stock.
    pub fn low_stock(&self) -> Vec<&Cylinder> {
        self.cylinders
            .iter()
            .filter(|c| self.unit_of(c).is_some_and(|unit| stock::is_low(c, unit)))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.cylinders.is_empty()
    }
}
