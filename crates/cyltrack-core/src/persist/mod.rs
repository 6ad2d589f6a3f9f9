// ── Persistence adapter ──
//
// Mirrors the two collections into a key-value store. Reads fall back to
// the seed dataset on any problem; writes report errors to the caller,
// which logs and carries on with its in-memory state.

mod kv;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::model::Snapshot;
use crate::seed;

pub use kv::{FileStore, KeyValueStore, MemoryStore};

/// Storage entry holding the serialized `CylinderType` list.
pub const TYPES_KEY: &str = "cylinderTypes";

/// Storage entry holding the serialized `Cylinder` list.
pub const CYLINDERS_KEY: &str = "cylinders";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to access storage entry '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("storage entry '{key}' is not valid JSON: {source}")]
    Parse {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize storage entry '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage is read-only")]
    ReadOnly,
}

/// Load/save of a [`Snapshot`] through an injected [`KeyValueStore`].
pub struct Persistence {
    store: Box<dyn KeyValueStore>,
}

impl Persistence {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    /// Load the stored inventory, or the seed dataset.
    ///
    /// Missing entries mean first run. Unreadable or corrupt entries are
    /// treated the same way (logged at `warn`), and the next save overwrites
    /// them.
    pub fn load(&self) -> Snapshot {
        match self.try_load() {
            Ok(Some(snapshot)) => {
                debug!(
                    types = snapshot.types.len(),
                    cylinders = snapshot.cylinders.len(),
                    "loaded stored inventory"
                );
                snapshot
            }
            Ok(None) => {
                info!("no stored inventory, starting from seed data");
                seed::snapshot()
            }
            Err(e) => {
                warn!(error = %e, "stored inventory unreadable, starting from seed data");
                seed::snapshot()
            }
        }
    }

    /// Load without the seed fallback. `Ok(None)` when either entry is
    /// absent or empty.
    pub fn try_load(&self) -> Result<Option<Snapshot>, PersistError> {
        let types = self.store.get(TYPES_KEY)?;
        let cylinders = self.store.get(CYLINDERS_KEY)?;

        let (Some(types), Some(cylinders)) = (nonempty(types), nonempty(cylinders)) else {
            return Ok(None);
        };

        Ok(Some(Snapshot::new(
            parse(TYPES_KEY, &types)?,
            parse(CYLINDERS_KEY, &cylinders)?,
        )))
    }

    /// Serialize and write both entries.
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), PersistError> {
        let types = serialize(TYPES_KEY, &snapshot.types)?;
        let cylinders = serialize(CYLINDERS_KEY, &snapshot.cylinders)?;
        self.store.set(TYPES_KEY, &types)?;
        self.store.set(CYLINDERS_KEY, &cylinders)?;
        Ok(())
    }
}

fn nonempty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse<T: DeserializeOwned>(key: &str, raw: &str) -> Result<T, PersistError> {
    serde_json::from_str(raw).map_err(|source| PersistError::Parse {
        key: key.into(),
        source,
    })
}

fn serialize<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<String, PersistError> {
    serde_json::to_string(value).map_err(|source| PersistError::Serialize {
        key: key.into(),
        source,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{Cylinder, CylinderType, MeasurementUnit};
    use pretty_assertions::assert_eq;

    fn custom_snapshot() -> Snapshot {
        Snapshot::new(
            vec![CylinderType {
                id: "ctX".into(),
                name: "Oxygen".into(),
                unit: MeasurementUnit::Mass,
            }],
            vec![Cylinder {
                id: "123456".into(),
                type_id: "ctX".into(),
                value: 42.25,
                tare_weight: Some(12.0),
            }],
        )
    }

    #[test]
    fn empty_store_yields_seed() {
        let persistence = Persistence::new(MemoryStore::new());
        assert_eq!(persistence.load(), seed::snapshot());
        assert!(persistence.try_load().unwrap().is_none());
    }

    #[test]
    fn round_trip() {
        let persistence = Persistence::new(MemoryStore::new());
        persistence.save(&custom_snapshot()).unwrap();
        assert_eq!(persistence.load(), custom_snapshot());
    }

    #[test]
    fn empty_collections_round_trip() {
        let persistence = Persistence::new(MemoryStore::new());
        persistence.save(&Snapshot::default()).unwrap();
        assert_eq!(persistence.load(), Snapshot::default());
    }

    #[test]
    fn one_missing_entry_yields_seed() {
        let store = MemoryStore::new();
        store.set(TYPES_KEY, "[]").unwrap();
        assert_eq!(Persistence::new(store).load(), seed::snapshot());
    }

    #[test]
    fn corrupt_entry_yields_seed() {
        let store = MemoryStore::new();
        store.set(TYPES_KEY, "[]").unwrap();
        store.set(CYLINDERS_KEY, "{not json").unwrap();
        let persistence = Persistence::new(store);

        assert!(matches!(
            persistence.try_load(),
            Err(PersistError::Parse { ref key, .. }) if key == CYLINDERS_KEY
        ));
        assert_eq!(persistence.load(), seed::snapshot());
    }

    #[test]
    fn wrong_shape_yields_seed() {
        let store = MemoryStore::new();
        store.set(TYPES_KEY, r#"[{"id":"ct1","name":"CO2","unit":"litres"}]"#).unwrap();
        store.set(CYLINDERS_KEY, "[]").unwrap();
        assert_eq!(Persistence::new(store).load(), seed::snapshot());
    }

    #[test]
    fn saved_entries_use_storage_schema() {
        let store = MemoryStore::new();
        let persistence = Persistence::new(store.clone());
        persistence.save(&custom_snapshot()).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&store.get(CYLINDERS_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(
            raw,
            serde_json::json!([
                { "id": "123456", "typeId": "ctX", "value": 42.25, "tareWeight": 12.0 }
            ])
        );
    }
}
