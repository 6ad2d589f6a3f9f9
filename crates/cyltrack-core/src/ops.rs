// ── Collection operations ──
//
// Pure transformations: each takes the current collections and returns new
// ones. Persisting and notifying is the caller's job. Every "not found" is a
// silent no-op that returns the input unchanged.

use tracing::warn;
use uuid::Uuid;

use crate::error::CoreError;
use crate::model::{Cylinder, CylinderType, CylinderUpdate, MeasurementUnit};

/// Lowest and highest generated cylinder id.
pub const CYLINDER_ID_MIN: u32 = 100_000;
pub const CYLINDER_ID_MAX: u32 = 999_999;

/// Candidate ids drawn before `add_cylinder` gives up on a collision.
pub const MAX_ID_ATTEMPTS: usize = 64;

// ── Id generation ───────────────────────────────────────────────────

/// Source of fresh identifiers for new records.
pub trait IdSource: Send {
    /// Opaque id for a new cylinder type.
    fn type_id(&mut self) -> String;

    /// Candidate six-digit id for a new cylinder. May collide; callers check.
    fn cylinder_id(&mut self) -> String;
}

/// Random ids: `ct<hex>` for types, uniform six-digit numbers for cylinders.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn type_id(&mut self) -> String {
        format!("ct{}", Uuid::new_v4().simple())
    }

    fn cylinder_id(&mut self) -> String {
        let span = u128::from(CYLINDER_ID_MAX - CYLINDER_ID_MIN + 1);
        let offset = Uuid::new_v4().as_u128() % span;
        (u128::from(CYLINDER_ID_MIN) + offset).to_string()
    }
}

// ── Validation ──────────────────────────────────────────────────────

/// Trim a proposed type name, rejecting names that are empty after trimming.
pub fn validate_type_name(name: &str) -> Result<String, CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::validation("type name must not be empty"));
    }
    Ok(trimmed.to_owned())
}

// ── Type operations ─────────────────────────────────────────────────

/// Append a new type. No-op when `name` trims to empty.
pub fn add_type(
    types: &[CylinderType],
    name: &str,
    unit: MeasurementUnit,
    ids: &mut dyn IdSource,
) -> Vec<CylinderType> {
    let mut next = types.to_vec();
    let Ok(name) = validate_type_name(name) else {
        return next;
    };
    next.push(CylinderType {
        id: ids.type_id(),
        name,
        unit,
    });
    next
}

/// Remove a type and every cylinder that references it.
///
/// The one place cross-collection consistency is maintained. Idempotent.
pub fn delete_type(
    types: &[CylinderType],
    cylinders: &[Cylinder],
    type_id: &str,
) -> (Vec<CylinderType>, Vec<Cylinder>) {
    let types = types.iter().filter(|t| t.id != type_id).cloned().collect();
    let cylinders = cylinders
        .iter()
        .filter(|c| c.type_id != type_id)
        .cloned()
        .collect();
    (types, cylinders)
}

// ── Cylinder operations ─────────────────────────────────────────────

/// Append a new empty cylinder of `type_id`.
///
/// Starts at `value = 0`; mass types also get `tare_weight = 0`. No-op when
/// the type is unknown or no unused id turns up within [`MAX_ID_ATTEMPTS`].
pub fn add_cylinder(
    cylinders: &[Cylinder],
    types: &[CylinderType],
    type_id: &str,
    ids: &mut dyn IdSource,
) -> Vec<Cylinder> {
    let mut next = cylinders.to_vec();
    let Some(ty) = types.iter().find(|t| t.id == type_id) else {
        return next;
    };

    let Some(id) = unused_cylinder_id(cylinders, ids) else {
        warn!(
            attempts = MAX_ID_ATTEMPTS,
            type_id, "no unused cylinder id found, cylinder not added"
        );
        return next;
    };

    next.push(Cylinder {
        id,
        type_id: ty.id.clone(),
        value: 0.0,
        tare_weight: ty.unit.is_mass().then_some(0.0),
    });
    next
}

/// Replace the readings of cylinder `id`. No-op when absent.
pub fn update_cylinder(cylinders: &[Cylinder], id: &str, update: &CylinderUpdate) -> Vec<Cylinder> {
    cylinders
        .iter()
        .map(|c| {
            let mut c = c.clone();
            if c.id == id {
                c.apply(update);
            }
            c
        })
        .collect()
}

/// Remove cylinder `id`. No-op when absent.
pub fn delete_cylinder(cylinders: &[Cylinder], id: &str) -> Vec<Cylinder> {
    cylinders.iter().filter(|c| c.id != id).cloned().collect()
}

fn unused_cylinder_id(cylinders: &[Cylinder], ids: &mut dyn IdSource) -> Option<String> {
    (0..MAX_ID_ATTEMPTS)
        .map(|_| ids.cylinder_id())
        .find(|candidate| cylinders.iter().all(|c| &c.id != candidate))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::seed;
    use pretty_assertions::assert_eq;

    /// Hands out ids from fixed lists, cycling the cylinder list.
    struct FixedIds {
        types: Vec<&'static str>,
        cylinders: Vec<&'static str>,
        next_cylinder: usize,
    }

    impl FixedIds {
        fn new(types: Vec<&'static str>, cylinders: Vec<&'static str>) -> Self {
            Self {
                types,
                cylinders,
                next_cylinder: 0,
            }
        }
    }

    impl IdSource for FixedIds {
        fn type_id(&mut self) -> String {
            self.types.remove(0).to_owned()
        }

        fn cylinder_id(&mut self) -> String {
            let id = self.cylinders[self.next_cylinder % self.cylinders.len()];
            self.next_cylinder += 1;
            id.to_owned()
        }
    }

    #[test]
    fn random_cylinder_ids_are_six_digits() {
        let mut ids = RandomIds;
        for _ in 0..500 {
            let id = ids.cylinder_id();
            assert_eq!(id.len(), 6, "{id}");
            let n: u32 = id.parse().unwrap();
            assert!((CYLINDER_ID_MIN..=CYLINDER_ID_MAX).contains(&n));
        }
    }

    #[test]
    fn random_type_ids_are_prefixed_and_distinct() {
        let mut ids = RandomIds;
        let a = ids.type_id();
        let b = ids.type_id();
        assert!(a.starts_with("ct"));
        assert_ne!(a, b);
    }

    #[test]
    fn add_type_trims_name() {
        let mut ids = FixedIds::new(vec!["ct9"], vec![]);
        let types = add_type(&seed::types(), "  Helium ", MeasurementUnit::Pressure, &mut ids);
        assert_eq!(types.len(), 4);
        assert_eq!(
            types[3],
            CylinderType {
                id: "ct9".into(),
                name: "Helium".into(),
                unit: MeasurementUnit::Pressure,
            }
        );
    }

    #[test]
    fn add_type_with_blank_name_is_noop() {
        let mut ids = FixedIds::new(vec!["ct9"], vec![]);
        let types = add_type(&seed::types(), "   ", MeasurementUnit::Mass, &mut ids);
        assert_eq!(types, seed::types());
        assert!(validate_type_name("\t").is_err());
    }

    #[test]
    fn delete_type_cascades_to_exactly_its_cylinders() {
        let (types, cylinders) = delete_type(&seed::types(), &seed::cylinders(), "ct1");
        assert_eq!(types.len(), 2);
        assert!(types.iter().all(|t| t.id != "ct1"));

        let remaining: Vec<_> = cylinders.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(remaining, vec!["200001", "200002", "300001"]);
    }

    #[test]
    fn delete_type_is_idempotent() {
        let (types, cylinders) = delete_type(&seed::types(), &seed::cylinders(), "ct2");
        let (types2, cylinders2) = delete_type(&types, &cylinders, "ct2");
        assert_eq!(types, types2);
        assert_eq!(cylinders, cylinders2);
    }

    #[test]
    fn add_cylinder_initializes_mass_with_zero_tare() {
        let mut ids = FixedIds::new(vec![], vec!["400001"]);
        let cylinders = add_cylinder(&seed::cylinders(), &seed::types(), "ct1", &mut ids);
        let added = cylinders.last().unwrap();
        assert_eq!(
            *added,
            Cylinder {
                id: "400001".into(),
                type_id: "ct1".into(),
                value: 0.0,
                tare_weight: Some(0.0),
            }
        );
    }

    #[test]
    fn add_cylinder_leaves_pressure_tare_unset() {
        let mut ids = FixedIds::new(vec![], vec!["400002"]);
        let cylinders = add_cylinder(&seed::cylinders(), &seed::types(), "ct2", &mut ids);
        let added = cylinders.last().unwrap();
        assert_eq!(added.value, 0.0);
        assert_eq!(added.tare_weight, None);
    }

    #[test]
    fn add_cylinder_for_unknown_type_is_noop() {
        let mut ids = FixedIds::new(vec![], vec!["400003"]);
        let cylinders = add_cylinder(&seed::cylinders(), &seed::types(), "nope", &mut ids);
        assert_eq!(cylinders, seed::cylinders());
    }

    #[test]
    fn add_cylinder_redraws_on_collision() {
        let mut ids = FixedIds::new(vec![], vec!["100001", "100002", "555555"]);
        let cylinders = add_cylinder(&seed::cylinders(), &seed::types(), "ct3", &mut ids);
        assert_eq!(cylinders.last().unwrap().id, "555555");
    }

    #[test]
    fn add_cylinder_gives_up_when_every_candidate_collides() {
        let mut ids = FixedIds::new(vec![], vec!["100001"]);
        let cylinders = add_cylinder(&seed::cylinders(), &seed::types(), "ct3", &mut ids);
        assert_eq!(cylinders, seed::cylinders());
    }

    #[test]
    fn update_cylinder_touches_only_the_match() {
        let update = CylinderUpdate::with_tare(30.0, 11.0);
        let cylinders = update_cylinder(&seed::cylinders(), "100002", &update);
        assert_eq!(cylinders[1].value, 30.0);
        assert_eq!(cylinders[1].tare_weight, Some(11.0));
        assert_eq!(cylinders[0], seed::cylinders()[0]);
        assert_eq!(&cylinders[2..], &seed::cylinders()[2..]);
    }

    #[test]
    fn update_missing_cylinder_is_noop() {
        let cylinders = update_cylinder(&seed::cylinders(), "999999", &CylinderUpdate::value(1.0));
        assert_eq!(cylinders, seed::cylinders());
    }

    #[test]
    fn delete_cylinder_removes_only_the_match() {
        let cylinders = delete_cylinder(&seed::cylinders(), "200002");
        assert_eq!(cylinders.len(), 5);
        assert!(cylinders.iter().all(|c| c.id != "200002"));
        assert_eq!(delete_cylinder(&cylinders, "200002"), cylinders);
    }
}
