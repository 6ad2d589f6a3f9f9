//! Overlay dialogs. At most one is open at a time.

mod add_type;
mod confirm;
mod edit_cylinder;
mod scan;

pub use add_type::AddTypeModal;
pub use confirm::ConfirmModal;
pub use edit_cylinder::EditCylinderModal;
pub use scan::ScanModal;

use crate::component::Component;

pub enum Modal {
    AddType(AddTypeModal),
    EditCylinder(EditCylinderModal),
    Confirm(ConfirmModal),
    Scan(ScanModal),
}

impl Modal {
    pub fn component(&self) -> &dyn Component {
        match self {
            Self::AddType(m) => m,
            Self::EditCylinder(m) => m,
            Self::Confirm(m) => m,
            Self::Scan(m) => m,
        }
    }

    pub fn component_mut(&mut self) -> &mut dyn Component {
        match self {
            Self::AddType(m) => m,
            Self::EditCylinder(m) => m,
            Self::Confirm(m) => m,
            Self::Scan(m) => m,
        }
    }

    pub fn is_scan(&self) -> bool {
        matches!(self, Self::Scan(_))
    }
}
