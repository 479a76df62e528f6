//! Unit MCP Tools
//!
//! Dry-run access to the unit catalog and the ingredient validation
//! pipeline, without touching any recipe.

use serde::Serialize;

use crate::ingredients::{validate_ingredients, IngredientDraft, ValidatedIngredients};
use crate::units::{normalize_unit, NormalizedUnit, Unit, UnitCatalog};

/// Response for list_units
#[derive(Debug, Serialize)]
pub struct ListUnitsResponse {
    pub units: Vec<Unit>,
    pub count: usize,
}

/// Normalize a single raw unit string
pub fn normalize(catalog: &UnitCatalog, raw_unit: &str) -> Result<NormalizedUnit, String> {
    normalize_unit(catalog, raw_unit).map_err(|e| e.to_string())
}

/// Run the ingredient validation pipeline without persisting anything
pub fn validate(
    catalog: &UnitCatalog,
    drafts: Vec<IngredientDraft>,
) -> Result<ValidatedIngredients, String> {
    validate_ingredients(catalog, &drafts).map_err(|e| e.to_string())
}

/// List the catalog's canonical units and their accepted variations
pub fn list_units(catalog: &UnitCatalog) -> ListUnitsResponse {
    let units: Vec<Unit> = catalog.units().into_iter().cloned().collect();
    let count = units.len();
    ListUnitsResponse { units, count }
}
