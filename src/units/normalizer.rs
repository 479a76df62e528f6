//! Unit string normalization
//!
//! Maps free-form unit input to a canonical unit via the catalog, trying the
//! input as given, singularized, then pluralized. Unrecognized units pass
//! through unchanged and are only flagged, never rejected.

use serde::Serialize;
use thiserror::Error;

use super::catalog::{Unit, UnitCatalog};

/// Normalization error types
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("unit must be a non-empty string")]
    EmptyUnit,
}

/// Result of normalizing a raw unit string
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedUnit {
    /// Canonical unit if recognized, otherwise the trimmed input unchanged
    pub canonical_unit: String,
    /// The input exactly as supplied by the caller
    pub original_input: String,
    /// False when the unit was not recognized and passed through
    pub was_normalized: bool,
    /// Catalog metadata for recognized units
    pub unit: Option<Unit>,
}

impl NormalizedUnit {
    fn recognized(unit: &Unit, original: &str) -> Self {
        Self {
            canonical_unit: unit.canonical.clone(),
            original_input: original.to_string(),
            was_normalized: true,
            unit: Some(unit.clone()),
        }
    }
}

/// Normalize a raw unit string against the catalog.
///
/// Tries, in order: exact lookup of the lowercased/trimmed input, the input
/// with one trailing "s" removed, the input with a trailing "s" appended.
/// If none match, the trimmed input is passed through with
/// `was_normalized = false` so that free-text ingredient import never
/// hard-fails on an unrecognized unit.
pub fn normalize_unit(catalog: &UnitCatalog, raw_unit: &str) -> Result<NormalizedUnit, NormalizeError> {
    let clean = raw_unit.trim().to_lowercase();
    if clean.is_empty() {
        return Err(NormalizeError::EmptyUnit);
    }

    if let Some(unit) = catalog.lookup(&clean) {
        return Ok(NormalizedUnit::recognized(unit, raw_unit));
    }

    let singular = clean.strip_suffix('s').unwrap_or(&clean);
    if let Some(unit) = catalog.lookup(singular) {
        return Ok(NormalizedUnit::recognized(unit, raw_unit));
    }

    let plural = format!("{}s", singular);
    if let Some(unit) = catalog.lookup(&plural) {
        return Ok(NormalizedUnit::recognized(unit, raw_unit));
    }

    Ok(NormalizedUnit {
        canonical_unit: raw_unit.trim().to_string(),
        original_input: raw_unit.to_string(),
        was_normalized: false,
        unit: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> UnitCatalog {
        UnitCatalog::standard().unwrap()
    }

    #[test]
    fn test_normalize_exact_variation() {
        let result = normalize_unit(&catalog(), "gram").unwrap();
        assert_eq!(result.canonical_unit, "g");
        assert!(result.was_normalized);
        assert_eq!(result.unit.unwrap().canonical, "g");
    }

    #[test]
    fn test_normalize_tablespoon_spellings() {
        let catalog = catalog();
        for spelling in ["Tbs", "tablespoon", "TBSP"] {
            let result = normalize_unit(&catalog, spelling).unwrap();
            assert_eq!(result.canonical_unit, "tbsp", "spelling: {}", spelling);
            assert!(result.was_normalized);
        }
    }

    #[test]
    fn test_normalize_trims_and_lowercases() {
        let result = normalize_unit(&catalog(), "  Grams  ").unwrap();
        assert_eq!(result.canonical_unit, "g");
        assert_eq!(result.original_input, "  Grams  ");
        assert!(result.was_normalized);
    }

    #[test]
    fn test_normalize_cup_and_cups() {
        let catalog = catalog();
        assert_eq!(normalize_unit(&catalog, "cups").unwrap().canonical_unit, "cup");
        assert_eq!(normalize_unit(&catalog, "cup").unwrap().canonical_unit, "cup");
    }

    #[test]
    fn test_normalize_singularizes() {
        // "grs" is not a variation; stripping the trailing "s" finds "gr"
        let result = normalize_unit(&catalog(), "grs").unwrap();
        assert_eq!(result.canonical_unit, "g");
        assert!(result.was_normalized);
    }

    #[test]
    fn test_normalize_pluralizes() {
        // a unit registered only in plural form is still found from its singular
        use super::super::catalog::UnitCategory;
        let catalog = UnitCatalog::from_units(vec![Unit::new(
            "bean",
            &["beans"],
            UnitCategory::Descriptive,
            None,
        )])
        .unwrap();
        let result = normalize_unit(&catalog, "bean").unwrap();
        assert_eq!(result.canonical_unit, "bean");
        assert!(result.was_normalized);
    }

    #[test]
    fn test_normalize_unknown_passes_through() {
        let result = normalize_unit(&catalog(), "xyz123").unwrap();
        assert_eq!(result.canonical_unit, "xyz123");
        assert_eq!(result.original_input, "xyz123");
        assert!(!result.was_normalized);
        assert!(result.unit.is_none());
    }

    #[test]
    fn test_normalize_unknown_is_trimmed() {
        let result = normalize_unit(&catalog(), " handful ").unwrap();
        assert_eq!(result.canonical_unit, "handful");
        assert!(!result.was_normalized);
    }

    #[test]
    fn test_normalize_empty_is_rejected() {
        assert_eq!(
            normalize_unit(&catalog(), "").unwrap_err(),
            NormalizeError::EmptyUnit
        );
        assert_eq!(
            normalize_unit(&catalog(), "   ").unwrap_err(),
            NormalizeError::EmptyUnit
        );
    }
}
