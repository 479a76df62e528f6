//! Canonical unit catalog
//!
//! An immutable, case-insensitive registry mapping accepted unit variations
//! to their canonical unit. Built once at startup and shared read-only.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Category of a measurement unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitCategory {
    /// Weight/mass units (g, oz)
    Weight,
    /// Volume units (ml, tbsp, cup, etc.)
    Volume,
    /// Ratio units for brew recipes (part)
    Ratio,
    /// Descriptive units requiring context (shot, scoop)
    Descriptive,
}

impl UnitCategory {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "weight" => Some(UnitCategory::Weight),
            "volume" => Some(UnitCategory::Volume),
            "ratio" => Some(UnitCategory::Ratio),
            "descriptive" => Some(UnitCategory::Descriptive),
            _ => None,
        }
    }

    /// Convert to storage string
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitCategory::Weight => "weight",
            UnitCategory::Volume => "volume",
            UnitCategory::Ratio => "ratio",
            UnitCategory::Descriptive => "descriptive",
        }
    }
}

/// A canonical measurement unit and its accepted textual variations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    /// Canonical identifier used for storage and comparison
    pub canonical: String,
    /// Accepted spellings, matched case-insensitively
    pub variations: Vec<String>,
    pub category: UnitCategory,
    pub description: Option<String>,
}

impl Unit {
    /// Convenience constructor for catalog definitions
    pub fn new(
        canonical: &str,
        variations: &[&str],
        category: UnitCategory,
        description: Option<&str>,
    ) -> Self {
        Self {
            canonical: canonical.to_string(),
            variations: variations.iter().map(|v| v.to_string()).collect(),
            category,
            description: description.map(|d| d.to_string()),
        }
    }
}

/// Catalog construction error types
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("unit variation '{variation}' is claimed by both '{existing}' and '{candidate}'")]
    AmbiguousVariation {
        variation: String,
        existing: String,
        candidate: String,
    },
}

/// Immutable registry of canonical units and their variations
pub struct UnitCatalog {
    /// Lowercased variation -> canonical identifier
    variation_map: HashMap<String, String>,
    /// Canonical identifier -> unit metadata
    units: HashMap<String, Unit>,
}

impl UnitCatalog {
    /// Build a catalog from a list of units.
    ///
    /// Fails if two different canonical units claim the same variation
    /// (case-insensitive). An ambiguous catalog must abort startup rather
    /// than let the last-registered unit win.
    pub fn from_units(units: Vec<Unit>) -> Result<Self, CatalogError> {
        let mut variation_map: HashMap<String, String> = HashMap::new();
        let mut unit_map: HashMap<String, Unit> = HashMap::new();

        for unit in units {
            for variation in &unit.variations {
                let key = variation.to_lowercase();
                if let Some(existing) = variation_map.get(&key) {
                    if existing != &unit.canonical {
                        return Err(CatalogError::AmbiguousVariation {
                            variation: key,
                            existing: existing.clone(),
                            candidate: unit.canonical.clone(),
                        });
                    }
                }
                variation_map.insert(key, unit.canonical.clone());
            }
            unit_map.insert(unit.canonical.clone(), unit);
        }

        Ok(Self {
            variation_map,
            units: unit_map,
        })
    }

    /// Build the standard catalog of supported coffee-recipe units
    pub fn standard() -> Result<Self, CatalogError> {
        Self::from_units(vec![
            Unit::new(
                "g",
                &["g", "gram", "grams", "gr"],
                UnitCategory::Weight,
                Some("Grams (recommended for precision)"),
            ),
            Unit::new(
                "oz",
                &["oz", "ounce", "ounces"],
                UnitCategory::Weight,
                Some("Ounces (weight)"),
            ),
            Unit::new(
                "ml",
                &["ml", "milliliter", "milliliters"],
                UnitCategory::Volume,
                None,
            ),
            Unit::new(
                "fl oz",
                &["fl oz", "fluid ounce", "fluid ounces"],
                UnitCategory::Volume,
                None,
            ),
            Unit::new(
                "tbsp",
                &["tbsp", "tablespoon", "tablespoons", "Tbs"],
                UnitCategory::Volume,
                Some("Tablespoon (~15ml)"),
            ),
            Unit::new(
                "tsp",
                &["tsp", "teaspoon", "teaspoons", "t"],
                UnitCategory::Volume,
                Some("Teaspoon (~5ml)"),
            ),
            Unit::new(
                "shot",
                &["shot", "shots"],
                UnitCategory::Descriptive,
                Some("Espresso shot (~30ml)"),
            ),
            Unit::new(
                "scoop",
                &["scoop", "scoops"],
                UnitCategory::Descriptive,
                Some("Coffee scoop (~10g)"),
            ),
            Unit::new(
                "part",
                &["part", "parts"],
                UnitCategory::Ratio,
                Some("For ratios (e.g., 1:16)"),
            ),
            Unit::new(
                "cup",
                &["cup", "cups", "C"],
                UnitCategory::Volume,
                Some("Cup (varies by region - specify size if possible)"),
            ),
        ])
    }

    /// Look up a unit by any of its variations (case-insensitive)
    pub fn lookup(&self, variation: &str) -> Option<&Unit> {
        let canonical = self.variation_map.get(&variation.to_lowercase())?;
        self.units.get(canonical)
    }

    /// Get a unit by its canonical identifier
    pub fn get(&self, canonical: &str) -> Option<&Unit> {
        self.units.get(canonical)
    }

    /// All units in the catalog, sorted by canonical identifier
    pub fn units(&self) -> Vec<&Unit> {
        let mut units: Vec<&Unit> = self.units.values().collect();
        units.sort_by(|a, b| a.canonical.cmp(&b.canonical));
        units
    }

    /// Number of canonical units in the catalog
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether the catalog holds no units
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_builds() {
        let catalog = UnitCatalog::standard().unwrap();
        assert_eq!(catalog.len(), 10);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let catalog = UnitCatalog::standard().unwrap();
        assert_eq!(catalog.lookup("TBSP").unwrap().canonical, "tbsp");
        assert_eq!(catalog.lookup("Tbs").unwrap().canonical, "tbsp");
        assert_eq!(catalog.lookup("tablespoon").unwrap().canonical, "tbsp");
    }

    #[test]
    fn test_lookup_unknown_variation() {
        let catalog = UnitCatalog::standard().unwrap();
        assert!(catalog.lookup("parsec").is_none());
    }

    #[test]
    fn test_colliding_variations_rejected() {
        let result = UnitCatalog::from_units(vec![
            Unit::new("tbsp", &["tbsp", "T"], UnitCategory::Volume, None),
            Unit::new("tsp", &["tsp", "t"], UnitCategory::Volume, None),
        ]);

        match result {
            Err(CatalogError::AmbiguousVariation {
                variation,
                existing,
                candidate,
            }) => {
                assert_eq!(variation, "t");
                assert_eq!(existing, "tbsp");
                assert_eq!(candidate, "tsp");
            }
            Ok(_) => panic!("expected ambiguous variation error"),
        }
    }

    #[test]
    fn test_same_unit_may_repeat_variation() {
        // Repetition within one unit is harmless, only cross-unit claims are ambiguous
        let result = UnitCatalog::from_units(vec![Unit::new(
            "g",
            &["g", "gram", "Gram"],
            UnitCategory::Weight,
            None,
        )]);
        assert!(result.is_ok());
    }
}
