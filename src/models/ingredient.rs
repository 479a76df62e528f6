//! Ingredient model
//!
//! Structured ingredient rows owned by a recipe. Ingredients have no
//! independent lifecycle: the whole list is replaced when a recipe is
//! created or updated, and rows are destroyed with their recipe.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

/// Category tag for an ingredient
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngredientCategory {
    Coffee,
    Water,
    Sweetener,
    Flavoring,
    #[default]
    Other,
}

impl IngredientCategory {
    /// Parse from string, falling back to Other
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "coffee" => IngredientCategory::Coffee,
            "water" => IngredientCategory::Water,
            "sweetener" => IngredientCategory::Sweetener,
            "flavoring" => IngredientCategory::Flavoring,
            _ => IngredientCategory::Other,
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            IngredientCategory::Coffee => "coffee",
            IngredientCategory::Water => "water",
            IngredientCategory::Sweetener => "sweetener",
            IngredientCategory::Flavoring => "flavoring",
            IngredientCategory::Other => "other",
        }
    }
}

/// An ingredient row belonging to a recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: i64,
    pub recipe_id: i64,
    pub position: i64,
    pub quantity: f64,
    pub unit: String,
    pub name: String,
    pub notes: Option<String>,
    pub category: IngredientCategory,
    pub created_at: String,
}

/// A validated ingredient ready to persist (canonical unit, no row identity yet)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientEntry {
    pub quantity: f64,
    pub unit: String,
    pub name: String,
    pub notes: Option<String>,
    #[serde(default)]
    pub category: IngredientCategory,
}

impl Ingredient {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let category: String = row.get("category")?;
        Ok(Self {
            id: row.get("id")?,
            recipe_id: row.get("recipe_id")?,
            position: row.get("position")?,
            quantity: row.get("quantity")?,
            unit: row.get("unit")?,
            name: row.get("name")?,
            notes: row.get("notes")?,
            category: IngredientCategory::from_str(&category),
            created_at: row.get("created_at")?,
        })
    }

    /// Replace the full ingredient list of a recipe, preserving entry order
    pub fn replace_for_recipe(
        conn: &Connection,
        recipe_id: i64,
        entries: &[IngredientEntry],
    ) -> DbResult<Vec<Self>> {
        conn.execute(
            "DELETE FROM recipe_ingredients WHERE recipe_id = ?1",
            [recipe_id],
        )?;

        for (position, entry) in entries.iter().enumerate() {
            conn.execute(
                r#"
                INSERT INTO recipe_ingredients (recipe_id, position, quantity, unit, name, notes, category)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                params![
                    recipe_id,
                    position as i64,
                    entry.quantity,
                    entry.unit,
                    entry.name,
                    entry.notes,
                    entry.category.as_str(),
                ],
            )?;
        }

        Self::get_for_recipe(conn, recipe_id)
    }

    /// Get all ingredients for a recipe in list order
    pub fn get_for_recipe(conn: &Connection, recipe_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM recipe_ingredients WHERE recipe_id = ?1 ORDER BY position",
        )?;

        let ingredients = stmt
            .query_map([recipe_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ingredients)
    }

    /// Count ingredients for a recipe
    pub fn count_for_recipe(conn: &Connection, recipe_id: i64) -> DbResult<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM recipe_ingredients WHERE recipe_id = ?1",
            [recipe_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
