//! Inventory state and domain rules for the cyltrack CLI and TUI.
//!
//! This crate owns everything below the presentation layer:
//!
//! - **Domain model** ([`model`]): [`CylinderType`], [`Cylinder`], and the
//!   closed [`MeasurementUnit`] set that decides how a cylinder's value is
//!   read. [`Snapshot`] pairs the two collections.
//!
//! - **Rules**: [`stock::is_low`] classifies a cylinder as low stock;
//!   [`ops`] holds the pure collection transformations (add/update/remove,
//!   cascade delete); [`scan`] validates and resolves scanned ids.
//!
//! - **[`Inventory`]**: the single owner of application state. Executes
//!   typed [`Command`]s, installs a fresh immutable snapshot per accepted
//!   mutation, writes it through [`Persistence`], and notifies subscribers
//!   via [`InventoryStream`].
//!
//! - **Collaborators**: [`KeyValueStore`] for durable storage and
//!   [`ScanSource`] for QR/barcode capture devices, both injected.

pub mod command;
pub mod error;
pub mod inventory;
pub mod model;
pub mod ops;
pub mod persist;
pub mod qr;
pub mod scan;
pub mod scanner;
pub mod seed;
pub mod stock;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{Command, CommandResult};
pub use error::CoreError;
pub use inventory::Inventory;
pub use model::{Cylinder, CylinderType, CylinderUpdate, MeasurementUnit, Snapshot};
pub use ops::{IdSource, RandomIds};
pub use persist::{FileStore, KeyValueStore, MemoryStore, PersistError, Persistence};
pub use qr::QrLink;
pub use scan::{ScanError, ScanId};
pub use scanner::{LineScanSource, ScanDevice, ScanSession, ScanSource, ScanTarget, ScannerError};
pub use stock::{StockLevel, is_low};
pub use stream::InventoryStream;
