//! Measurement unit module
//!
//! Canonical unit catalog and unit string normalization.

pub mod catalog;
pub mod normalizer;

pub use catalog::{CatalogError, Unit, UnitCatalog, UnitCategory};
pub use normalizer::{normalize_unit, NormalizeError, NormalizedUnit};
