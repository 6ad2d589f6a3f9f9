// Integration tests for `Inventory` over a file-backed store.
#![allow(clippy::unwrap_used)]

use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio_stream::StreamExt;

use cyltrack_core::persist::{CYLINDERS_KEY, TYPES_KEY};
use cyltrack_core::{
    Command, CommandResult, CylinderUpdate, FileStore, IdSource, Inventory, MeasurementUnit,
    ScanError, seed,
};

// ── Helpers ─────────────────────────────────────────────────────────

/// Deterministic ids: `ctT1`, `ctT2`, ... and `700001`, `700002`, ...
struct Sequence {
    types: u32,
    cylinders: u32,
}

impl Sequence {
    fn new() -> Self {
        Self {
            types: 0,
            cylinders: 0,
        }
    }
}

impl IdSource for Sequence {
    fn type_id(&mut self) -> String {
        self.types += 1;
        format!("ctT{}", self.types)
    }

    fn cylinder_id(&mut self) -> String {
        self.cylinders += 1;
        (700_000 + self.cylinders).to_string()
    }
}

fn open(dir: &std::path::Path) -> Inventory {
    Inventory::with_ids(FileStore::new(dir), Sequence::new())
}

// ── Persistence ─────────────────────────────────────────────────────

#[test]
fn fresh_directory_starts_from_seed() {
    let dir = tempfile::tempdir().unwrap();
    let inventory = open(dir.path());
    assert_eq!(*inventory.snapshot(), seed::snapshot());
}

#[test]
fn mutations_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let inventory = open(dir.path());

    let CommandResult::TypeAdded(helium) = inventory.execute(Command::AddType {
        name: "Helium".into(),
        unit: MeasurementUnit::Pressure,
    }) else {
        panic!("type not added");
    };
    let CommandResult::CylinderAdded(cylinder) = inventory.execute(Command::AddCylinder {
        type_id: helium.id.clone(),
    }) else {
        panic!("cylinder not added");
    };
    inventory.execute(Command::UpdateCylinder {
        id: cylinder.id.clone(),
        update: CylinderUpdate::value(180.0),
    });
    drop(inventory);

    let reopened = open(dir.path());
    let snap = reopened.snapshot();
    assert_eq!(snap.types.len(), 4);
    let stored = snap.cylinder_by_id(&cylinder.id).unwrap();
    assert_eq!(stored.type_id, helium.id);
    assert_eq!(stored.value, 180.0);
    assert!(snap.low_stock().iter().any(|c| c.id == cylinder.id));
}

#[test]
fn corrupt_storage_falls_back_to_seed_and_is_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());
    std::fs::write(store.path_for(TYPES_KEY), "[]").unwrap();
    std::fs::write(store.path_for(CYLINDERS_KEY), "garbage").unwrap();

    let inventory = open(dir.path());
    assert_eq!(*inventory.snapshot(), seed::snapshot());

    inventory.execute(Command::DeleteCylinder {
        id: "300001".into(),
    });
    let raw = std::fs::read_to_string(store.path_for(CYLINDERS_KEY)).unwrap();
    let stored: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(stored.as_array().unwrap().len(), 5);
}

#[test]
fn delete_type_cascade_is_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let inventory = open(dir.path());
    inventory.execute(Command::DeleteType { id: "ct2".into() });
    drop(inventory);

    let snap = open(dir.path()).snapshot();
    assert!(snap.type_by_id("ct2").is_none());
    assert_eq!(snap.cylinders_of("ct2").count(), 0);
    assert_eq!(snap.cylinders.len(), 4);
}

// ── Scan resolution ─────────────────────────────────────────────────

#[test]
fn scanning_never_mutates() {
    let dir = tempfile::tempdir().unwrap();
    let inventory = open(dir.path());
    let before = inventory.snapshot();

    assert!(matches!(
        inventory.scan("12a456"),
        Err(ScanError::InvalidFormat { .. })
    ));
    let err = inventory.scan("999999").unwrap_err();
    assert_eq!(err.to_string(), "cylinder with ID 999999 not found");
    assert_eq!(inventory.scan("100003").unwrap().tare_weight, Some(10.0));

    assert_eq!(*inventory.snapshot(), *before);
    assert!(!FileStore::new(dir.path()).path_for(CYLINDERS_KEY).exists());
}

// ── Subscriptions ───────────────────────────────────────────────────

#[tokio::test]
async fn stream_yields_current_then_each_change() {
    let dir = tempfile::tempdir().unwrap();
    let inventory = open(dir.path());
    let mut stream = Box::pin(inventory.subscribe().into_stream());

    let first = stream.next().await.unwrap();
    assert_eq!(first.cylinders.len(), 6);

    inventory.execute(Command::DeleteCylinder {
        id: "100001".into(),
    });
    let second = tokio::time::timeout(Duration::from_secs(1), stream.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(second.cylinders.len(), 5);

    // No-ops publish nothing.
    inventory.execute(Command::DeleteCylinder {
        id: "100001".into(),
    });
    assert!(
        tokio::time::timeout(Duration::from_millis(50), stream.next())
            .await
            .is_err()
    );
}
