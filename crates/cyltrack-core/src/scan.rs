// ── Scan resolution ──
//
// Typed and camera-decoded ids both land here. Format validation happens
// first, so a malformed payload never reaches the lookup.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::model::Cylinder;

/// Number of digits in a scannable cylinder id.
pub const SCAN_ID_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("invalid cylinder id '{input}': expected exactly 6 digits")]
    InvalidFormat { input: String },

    #[error("cylinder with ID {id} not found")]
    NotFound { id: ScanId },
}

/// A validated scan payload: exactly six ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ScanId(String);

impl ScanId {
    /// Validate raw input. Surrounding whitespace is ignored.
    pub fn parse(raw: &str) -> Result<Self, ScanError> {
        let trimmed = raw.trim();
        if trimmed.len() == SCAN_ID_LEN && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(trimmed.to_owned()))
        } else {
            Err(ScanError::InvalidFormat {
                input: raw.to_owned(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ScanId {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Find the cylinder a scan refers to. Linear search, exact match.
pub fn resolve_scan<'a>(cylinders: &'a [Cylinder], id: &ScanId) -> Result<&'a Cylinder, ScanError> {
    cylinders
        .iter()
        .find(|c| c.id == id.as_str())
        .ok_or_else(|| ScanError::NotFound { id: id.clone() })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::seed;

    #[test]
    fn accepts_six_digits_with_whitespace() {
        let id = ScanId::parse(" 100003\n").unwrap();
        assert_eq!(id.as_str(), "100003");
    }

    #[test]
    fn rejects_malformed_input() {
        for raw in ["12a456", "12345", "1234567", "", "１２３４５６", "-12345"] {
            assert!(
                matches!(ScanId::parse(raw), Err(ScanError::InvalidFormat { .. })),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn resolves_existing_cylinder() {
        let cylinders = seed::cylinders();
        let id: ScanId = "200002".parse().unwrap();
        let found = resolve_scan(&cylinders, &id).unwrap();
        assert_eq!(found.value, 750.0);
    }

    #[test]
    fn unknown_id_is_not_found() {
        let cylinders = seed::cylinders();
        let id: ScanId = "999999".parse().unwrap();
        let err = resolve_scan(&cylinders, &id).unwrap_err();
        assert_eq!(err, ScanError::NotFound { id });
        assert_eq!(err.to_string(), "cylinder with ID 999999 not found");
    }
}
