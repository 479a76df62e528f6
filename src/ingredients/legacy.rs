//! Legacy ingredient line parser
//!
//! Older recipes stored each ingredient as a single free-text line such as
//! `"18 g coffee beans"` or `"250ml water"`. That form is strictly an import
//! format: this parser turns a line into a draft entry, which then goes
//! through the normal validator like any other input.

use thiserror::Error;

use crate::ingredients::validator::IngredientDraft;

/// Legacy line parse error types
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LegacyParseError {
    #[error("ingredient line is empty")]
    EmptyLine,
    #[error("ingredient line does not start with a quantity: '{0}'")]
    InvalidQuantity(String),
}

/// Parse one legacy `"<quantity> <unit> <name>"` line into a draft entry.
///
/// The quantity may have its unit attached ("250ml"). Missing unit or name
/// are left as `None` so the validator reports them with the entry's index,
/// the same way it does for structured input.
pub fn parse_legacy_line(line: &str) -> Result<IngredientDraft, LegacyParseError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(LegacyParseError::EmptyLine);
    }

    let mut tokens = trimmed.split_whitespace();
    let first = tokens.next().unwrap_or_default();
    let (quantity, attached_unit) = split_quantity(first)?;

    let rest: Vec<&str> = tokens.collect();
    let (unit, name_tokens) = match attached_unit {
        Some(unit) => (Some(unit.to_string()), rest.as_slice()),
        None => match rest.split_first() {
            Some((unit, name)) => (Some(unit.to_string()), name),
            None => (None, rest.as_slice()),
        },
    };

    let name = name_tokens.join(" ");

    Ok(IngredientDraft {
        quantity: Some(quantity),
        unit,
        name: if name.is_empty() { None } else { Some(name) },
        notes: None,
        category: Default::default(),
    })
}

/// Split a leading token into its numeric part and an optional attached unit
fn split_quantity(token: &str) -> Result<(f64, Option<&str>), LegacyParseError> {
    if let Ok(quantity) = token.parse::<f64>() {
        return Ok((quantity, None));
    }

    let split_at = token
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(token.len());
    let (number, suffix) = token.split_at(split_at);

    match number.parse::<f64>() {
        Ok(quantity) if !suffix.is_empty() => Ok((quantity, Some(suffix))),
        _ => Err(LegacyParseError::InvalidQuantity(token.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_spaced_line() {
        let draft = parse_legacy_line("18 g coffee beans").unwrap();
        assert_eq!(draft.quantity, Some(18.0));
        assert_eq!(draft.unit.as_deref(), Some("g"));
        assert_eq!(draft.name.as_deref(), Some("coffee beans"));
    }

    #[test]
    fn test_parse_attached_unit() {
        let draft = parse_legacy_line("250ml water").unwrap();
        assert_eq!(draft.quantity, Some(250.0));
        assert_eq!(draft.unit.as_deref(), Some("ml"));
        assert_eq!(draft.name.as_deref(), Some("water"));
    }

    #[test]
    fn test_parse_fractional_quantity() {
        let draft = parse_legacy_line("0.5 tsp vanilla extract").unwrap();
        assert_eq!(draft.quantity, Some(0.5));
        assert_eq!(draft.unit.as_deref(), Some("tsp"));
        assert_eq!(draft.name.as_deref(), Some("vanilla extract"));
    }

    #[test]
    fn test_parse_missing_name_left_for_validator() {
        let draft = parse_legacy_line("2 cups").unwrap();
        assert_eq!(draft.quantity, Some(2.0));
        assert_eq!(draft.unit.as_deref(), Some("cups"));
        assert_eq!(draft.name, None);
    }

    #[test]
    fn test_parse_non_numeric_quantity() {
        assert_eq!(
            parse_legacy_line("some coffee").unwrap_err(),
            LegacyParseError::InvalidQuantity("some".to_string())
        );
    }

    #[test]
    fn test_parse_empty_line() {
        assert_eq!(parse_legacy_line("  ").unwrap_err(), LegacyParseError::EmptyLine);
    }
}
