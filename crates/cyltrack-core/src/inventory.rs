// ── Inventory controller ──
//
// The single owner of application state. Surfaces hold an `Inventory`
// handle, read snapshots, and send `Command`s; every accepted mutation
// installs a fresh snapshot, notifies subscribers, and writes through to
// storage.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::command::{Command, CommandResult};
use crate::model::{Cylinder, Snapshot};
use crate::ops::{self, IdSource, RandomIds};
use crate::persist::{KeyValueStore, Persistence};
use crate::scan::{self, ScanError, ScanId};
use crate::stream::InventoryStream;

/// Cheaply cloneable handle to the inventory state.
#[derive(Clone)]
pub struct Inventory {
    inner: Arc<InventoryInner>,
}

struct InventoryInner {
    snapshot: watch::Sender<Arc<Snapshot>>,
    last_saved: watch::Sender<Option<DateTime<Utc>>>,
    persistence: Persistence,
    /// Held for the whole read-modify-write-save of a mutation.
    ids: Mutex<Box<dyn IdSource>>,
}

impl Inventory {
    /// Load from `store` (seed data when empty or unreadable) with random ids.
    pub fn open(store: impl KeyValueStore + 'static) -> Self {
        Self::with_ids(store, RandomIds)
    }

    /// Like [`open`](Self::open) with an injected id source.
    pub fn with_ids(store: impl KeyValueStore + 'static, ids: impl IdSource + 'static) -> Self {
        let persistence = Persistence::new(store);
        let initial = persistence.load();
        debug!(
            types = initial.types.len(),
            cylinders = initial.cylinders.len(),
            "inventory opened"
        );

        let (snapshot, _) = watch::channel(Arc::new(initial));
        let (last_saved, _) = watch::channel(None);

        Self {
            inner: Arc::new(InventoryInner {
                snapshot,
                last_saved,
                persistence,
                ids: Mutex::new(Box::new(ids)),
            }),
        }
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.inner.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> InventoryStream {
        InventoryStream::new(self.inner.snapshot.subscribe())
    }

    /// Time of the last successful write to storage this session.
    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        *self.inner.last_saved.borrow()
    }

    pub fn subscribe_last_saved(&self) -> watch::Receiver<Option<DateTime<Utc>>> {
        self.inner.last_saved.subscribe()
    }

    /// Validate a raw scanned or typed id and find its cylinder.
    pub fn scan(&self, raw: &str) -> Result<Cylinder, ScanError> {
        let id = ScanId::parse(raw)?;
        let snapshot = self.snapshot();
        let cylinder = scan::resolve_scan(&snapshot.cylinders, &id)?;
        debug!(%id, "scan resolved");
        Ok(cylinder.clone())
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Execute a mutation. Unknown ids and rejected input leave state
    /// untouched and return [`CommandResult::Unchanged`].
    pub fn execute(&self, command: Command) -> CommandResult {
        let mut ids = self.inner.ids.lock().unwrap_or_else(PoisonError::into_inner);
        let name = command.name();
        let current = self.snapshot();

        let Some((next, result)) = apply(&current, command, &mut **ids) else {
            debug!(command = name, "command left inventory unchanged");
            return CommandResult::Unchanged;
        };

        let next = Arc::new(next);
        self.inner.snapshot.send_replace(Arc::clone(&next));
        info!(command = name, "inventory updated");

        match self.inner.persistence.save(&next) {
            Ok(()) => {
                self.inner.last_saved.send_replace(Some(Utc::now()));
            }
            Err(e) => {
                error!(command = name, error = %e, "failed to save inventory");
            }
        }

        result
    }
}

/// Compute the snapshot a command produces, or `None` when it is a no-op.
fn apply(
    current: &Snapshot,
    command: Command,
    ids: &mut dyn IdSource,
) -> Option<(Snapshot, CommandResult)> {
    match command {
        Command::AddType { name, unit } => {
            let types = ops::add_type(&current.types, &name, unit, ids);
            if types.len() == current.types.len() {
                return None;
            }
            let added = types.last()?.clone();
            Some((
                Snapshot::new(types, current.cylinders.clone()),
                CommandResult::TypeAdded(added),
            ))
        }
        Command::DeleteType { id } => {
            let (types, cylinders) = ops::delete_type(&current.types, &current.cylinders, &id);
            let cylinders_removed = current.cylinders.len() - cylinders.len();
            if types.len() == current.types.len() && cylinders_removed == 0 {
                return None;
            }
            Some((
                Snapshot::new(types, cylinders),
                CommandResult::TypeDeleted {
                    id,
                    cylinders_removed,
                },
            ))
        }
        Command::AddCylinder { type_id } => {
            let cylinders = ops::add_cylinder(&current.cylinders, &current.types, &type_id, ids);
            if cylinders.len() == current.cylinders.len() {
                return None;
            }
            let added = cylinders.last()?.clone();
            Some((
                Snapshot::new(current.types.clone(), cylinders),
                CommandResult::CylinderAdded(added),
            ))
        }
        Command::UpdateCylinder { id, update } => {
            current.cylinder_by_id(&id)?;
            let cylinders = ops::update_cylinder(&current.cylinders, &id, &update);
            let updated = cylinders.iter().find(|c| c.id == id)?.clone();
            Some((
                Snapshot::new(current.types.clone(), cylinders),
                CommandResult::CylinderUpdated(updated),
            ))
        }
        Command::DeleteCylinder { id } => {
            current.cylinder_by_id(&id)?;
            let cylinders = ops::delete_cylinder(&current.cylinders, &id);
            Some((
                Snapshot::new(current.types.clone(), cylinders),
                CommandResult::CylinderDeleted { id },
            ))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{CylinderUpdate, MeasurementUnit};
    use crate::persist::{MemoryStore, Persistence};
    use crate::seed;
    use pretty_assertions::assert_eq;

    struct CountingIds(u32);

    impl IdSource for CountingIds {
        fn type_id(&mut self) -> String {
            self.0 += 1;
            format!("ctn{}", self.0)
        }

        fn cylinder_id(&mut self) -> String {
            self.0 += 1;
            (500_000 + self.0).to_string()
        }
    }

    fn seeded() -> (Inventory, MemoryStore) {
        let store = MemoryStore::new();
        (Inventory::with_ids(store.clone(), CountingIds(0)), store)
    }

    #[test]
    fn opens_with_seed_and_does_not_write() {
        let (inventory, store) = seeded();
        assert_eq!(*inventory.snapshot(), seed::snapshot());
        assert!(store.is_empty());
        assert!(inventory.last_saved().is_none());
    }

    #[test]
    fn add_type_writes_through() {
        let (inventory, store) = seeded();
        let result = inventory.execute(Command::AddType {
            name: " Helium ".into(),
            unit: MeasurementUnit::Pressure,
        });

        let CommandResult::TypeAdded(added) = result else {
            panic!("expected TypeAdded, got {result:?}");
        };
        assert_eq!(added.name, "Helium");
        assert_eq!(inventory.snapshot().types.len(), 4);
        assert_eq!(Persistence::new(store).load(), *inventory.snapshot());
        assert!(inventory.last_saved().is_some());
    }

    #[test]
    fn blank_type_name_is_unchanged() {
        let (inventory, store) = seeded();
        let result = inventory.execute(Command::AddType {
            name: "  ".into(),
            unit: MeasurementUnit::Mass,
        });
        assert!(result.is_unchanged());
        assert!(store.is_empty());
    }

    #[test]
    fn delete_type_reports_cascade() {
        let (inventory, _) = seeded();
        let result = inventory.execute(Command::DeleteType { id: "ct1".into() });
        assert_eq!(
            result,
            CommandResult::TypeDeleted {
                id: "ct1".into(),
                cylinders_removed: 3,
            }
        );
        let snap = inventory.snapshot();
        assert!(snap.cylinders.iter().all(|c| c.type_id != "ct1"));

        let again = inventory.execute(Command::DeleteType { id: "ct1".into() });
        assert!(again.is_unchanged());
    }

    #[test]
    fn delete_type_removes_orphaned_cylinders() {
        let store = MemoryStore::new();
        let orphan = Cylinder {
            id: "400001".into(),
            type_id: "ct9".into(),
            value: 5.0,
            tare_weight: Some(10.0),
        };
        Persistence::new(store.clone())
            .save(&Snapshot::new(seed::types(), vec![orphan]))
            .unwrap();
        let inventory = Inventory::open(store);

        let result = inventory.execute(Command::DeleteType { id: "ct9".into() });
        assert_eq!(
            result,
            CommandResult::TypeDeleted {
                id: "ct9".into(),
                cylinders_removed: 1,
            }
        );
        let snap = inventory.snapshot();
        assert!(snap.cylinders.is_empty());
        assert_eq!(snap.types.len(), seed::types().len());
    }

    #[test]
    fn add_cylinder_to_unknown_type_is_unchanged() {
        let (inventory, _) = seeded();
        let result = inventory.execute(Command::AddCylinder {
            type_id: "nope".into(),
        });
        assert!(result.is_unchanged());
        assert_eq!(inventory.snapshot().cylinders.len(), 6);
    }

    #[test]
    fn update_and_delete_cylinder() {
        let (inventory, _) = seeded();
        let result = inventory.execute(Command::UpdateCylinder {
            id: "100003".into(),
            update: CylinderUpdate::with_tare(30.0, 11.0),
        });
        let CommandResult::CylinderUpdated(updated) = result else {
            panic!("expected CylinderUpdated, got {result:?}");
        };
        assert_eq!(updated.value, 30.0);
        assert_eq!(updated.tare_weight, Some(11.0));

        let result = inventory.execute(Command::DeleteCylinder {
            id: "100003".into(),
        });
        assert_eq!(
            result,
            CommandResult::CylinderDeleted {
                id: "100003".into()
            }
        );
        assert!(inventory.snapshot().cylinder_by_id("100003").is_none());
    }

    #[test]
    fn unknown_cylinder_updates_are_unchanged() {
        let (inventory, _) = seeded();
        let before = inventory.snapshot();
        assert!(
            inventory
                .execute(Command::UpdateCylinder {
                    id: "999999".into(),
                    update: CylinderUpdate::value(1.0),
                })
                .is_unchanged()
        );
        assert!(
            inventory
                .execute(Command::DeleteCylinder {
                    id: "999999".into()
                })
                .is_unchanged()
        );
        assert!(Arc::ptr_eq(&before, &inventory.snapshot()));
    }

    #[test]
    fn save_failure_keeps_in_memory_state() {
        let (inventory, store) = seeded();
        store.set_read_only(true);

        let result = inventory.execute(Command::DeleteCylinder {
            id: "100001".into(),
        });
        assert!(!result.is_unchanged());
        assert!(inventory.snapshot().cylinder_by_id("100001").is_none());
        assert!(inventory.last_saved().is_none());
    }

    #[test]
    fn scan_validates_then_resolves() {
        let (inventory, _) = seeded();
        assert_eq!(inventory.scan(" 200002 ").unwrap().value, 750.0);
        assert!(matches!(
            inventory.scan("12345"),
            Err(ScanError::InvalidFormat { .. })
        ));
        assert!(matches!(
            inventory.scan("999999"),
            Err(ScanError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn subscribers_see_each_accepted_mutation() {
        let (inventory, _) = seeded();
        let mut stream = inventory.subscribe();
        assert_eq!(stream.current().cylinders.len(), 6);

        inventory.execute(Command::AddCylinder {
            type_id: "ct2".into(),
        });
        let snap = stream.changed().await.unwrap();
        assert_eq!(snap.cylinders.len(), 7);
        assert_eq!(snap.cylinders[6].tare_weight, None);
        assert_eq!(stream.latest().cylinders.len(), 7);
    }
}
