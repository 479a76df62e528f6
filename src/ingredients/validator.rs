//! Ingredient batch validation
//!
//! Structural checks are fail-fast and all-or-nothing: the first invalid
//! entry aborts the whole batch and nothing is persisted. Unit recognition
//! is the one lenient step: unknown units degrade to warnings on an
//! otherwise successful result.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{IngredientCategory, IngredientEntry};
use crate::units::{normalize_unit, UnitCatalog};

/// Validation error types
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidateError {
    #[error("ingredient at index {index} is missing or has an invalid '{field}'")]
    InvalidField { index: usize, field: &'static str },
}

/// A raw ingredient entry as supplied by a caller or the legacy parser
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngredientDraft {
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub name: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub category: IngredientCategory,
}

/// Output of a successful validation pass
#[derive(Debug, Clone, Serialize)]
pub struct ValidatedIngredients {
    /// Entries in input order, units rewritten to canonical form
    pub ingredients: Vec<IngredientEntry>,
    /// Advisories for units that were passed through unrecognized
    pub warnings: Vec<String>,
}

/// Validate and normalize a batch of raw ingredient entries.
///
/// Each entry must carry a positive quantity, a non-empty unit, and a
/// non-empty name; the first violation fails the whole batch with the
/// entry's index and offending field. Valid entries have their unit run
/// through the normalizer; unrecognized units are kept as-is and reported
/// in the warnings list.
pub fn validate_ingredients(
    catalog: &UnitCatalog,
    drafts: &[IngredientDraft],
) -> Result<ValidatedIngredients, ValidateError> {
    let mut ingredients = Vec::with_capacity(drafts.len());
    let mut warnings = Vec::new();

    for (index, draft) in drafts.iter().enumerate() {
        let quantity = match draft.quantity {
            Some(q) if q > 0.0 => q,
            _ => return Err(ValidateError::InvalidField { index, field: "quantity" }),
        };

        let unit = match draft.unit.as_deref().map(str::trim) {
            Some(u) if !u.is_empty() => u,
            _ => return Err(ValidateError::InvalidField { index, field: "unit" }),
        };

        let name = match draft.name.as_deref().map(str::trim) {
            Some(n) if !n.is_empty() => n,
            _ => return Err(ValidateError::InvalidField { index, field: "name" }),
        };

        let normalized = normalize_unit(catalog, unit)
            .map_err(|_| ValidateError::InvalidField { index, field: "unit" })?;

        if !normalized.was_normalized {
            warnings.push(format!(
                "Unit '{}' was not recognized for '{}'",
                unit, name
            ));
        }

        ingredients.push(IngredientEntry {
            quantity,
            unit: normalized.canonical_unit,
            name: name.to_string(),
            notes: draft.notes.clone(),
            category: draft.category,
        });
    }

    Ok(ValidatedIngredients { ingredients, warnings })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> UnitCatalog {
        UnitCatalog::standard().unwrap()
    }

    fn draft(quantity: Option<f64>, unit: Option<&str>, name: Option<&str>) -> IngredientDraft {
        IngredientDraft {
            quantity,
            unit: unit.map(|s| s.to_string()),
            name: name.map(|s| s.to_string()),
            notes: None,
            category: IngredientCategory::default(),
        }
    }

    #[test]
    fn test_validates_and_canonicalizes() {
        let result = validate_ingredients(
            &catalog(),
            &[
                draft(Some(18.0), Some("grams"), Some("coffee")),
                draft(Some(2.0), Some("Tbs"), Some("sugar")),
            ],
        )
        .unwrap();

        assert_eq!(result.ingredients.len(), 2);
        assert_eq!(result.ingredients[0].unit, "g");
        assert_eq!(result.ingredients[1].unit, "tbsp");
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_preserves_entry_order() {
        let names = ["coffee", "water", "milk", "cinnamon"];
        let drafts: Vec<IngredientDraft> = names
            .iter()
            .map(|n| draft(Some(1.0), Some("g"), Some(n)))
            .collect();

        let result = validate_ingredients(&catalog(), &drafts).unwrap();
        let out: Vec<&str> = result.ingredients.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(out, names);
    }

    #[test]
    fn test_zero_quantity_fails_batch() {
        let err = validate_ingredients(
            &catalog(),
            &[draft(Some(0.0), Some("g"), Some("coffee"))],
        )
        .unwrap_err();

        assert_eq!(err, ValidateError::InvalidField { index: 0, field: "quantity" });
    }

    #[test]
    fn test_missing_quantity_fails_batch() {
        let err = validate_ingredients(&catalog(), &[draft(None, Some("g"), Some("coffee"))])
            .unwrap_err();
        assert_eq!(err, ValidateError::InvalidField { index: 0, field: "quantity" });
    }

    #[test]
    fn test_missing_unit_reports_index() {
        let err = validate_ingredients(
            &catalog(),
            &[
                draft(Some(18.0), Some("g"), Some("coffee")),
                draft(Some(250.0), None, Some("water")),
            ],
        )
        .unwrap_err();

        assert_eq!(err, ValidateError::InvalidField { index: 1, field: "unit" });
    }

    #[test]
    fn test_blank_name_fails_batch() {
        let err = validate_ingredients(
            &catalog(),
            &[draft(Some(18.0), Some("g"), Some("   "))],
        )
        .unwrap_err();
        assert_eq!(err, ValidateError::InvalidField { index: 0, field: "name" });
    }

    #[test]
    fn test_first_violation_aborts_everything() {
        // The valid third entry must not survive the failure of the second
        let err = validate_ingredients(
            &catalog(),
            &[
                draft(Some(18.0), Some("g"), Some("coffee")),
                draft(Some(-1.0), Some("ml"), Some("water")),
                draft(Some(1.0), Some("tsp"), Some("sugar")),
            ],
        )
        .unwrap_err();

        assert_eq!(err, ValidateError::InvalidField { index: 1, field: "quantity" });
    }

    #[test]
    fn test_unknown_unit_warns_but_succeeds() {
        let result = validate_ingredients(
            &catalog(),
            &[draft(Some(18.0), Some("grms"), Some("coffee"))],
        )
        .unwrap();

        assert_eq!(result.ingredients.len(), 1);
        assert_eq!(result.ingredients[0].unit, "grms");
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("grms"));
        assert!(result.warnings[0].contains("coffee"));
    }
}
