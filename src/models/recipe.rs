//! Recipe model
//!
//! Represents an authored coffee recipe with brew metadata and the derived
//! average rating maintained by the rating aggregator.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

/// A recipe with its derived aggregate rating
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub instructions: Vec<String>,
    pub brew_method: Option<String>,
    pub brew_time_secs: Option<i64>,
    pub difficulty: Option<String>,
    /// None while the recipe has no reviews; written only by the aggregator
    pub average_rating: Option<f64>,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a new recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeCreate {
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub instructions: Vec<String>,
    pub brew_method: Option<String>,
    pub brew_time_secs: Option<i64>,
    pub difficulty: Option<String>,
}

/// Data for updating a recipe (author is not updatable)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipeUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub instructions: Option<Vec<String>>,
    pub brew_method: Option<String>,
    pub brew_time_secs: Option<i64>,
    pub difficulty: Option<String>,
}

impl Recipe {
    /// Create a Recipe from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let instructions_json: String = row.get("instructions")?;
        let instructions: Vec<String> = serde_json::from_str(&instructions_json)
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    0,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?;

        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            author: row.get("author")?,
            description: row.get("description")?,
            image_url: row.get("image_url")?,
            instructions,
            brew_method: row.get("brew_method")?,
            brew_time_secs: row.get("brew_time_secs")?,
            difficulty: row.get("difficulty")?,
            average_rating: row.get("average_rating")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Insert a new recipe into the database
    pub fn create(conn: &Connection, data: &RecipeCreate) -> DbResult<Self> {
        let instructions_json = serde_json::to_string(&data.instructions)
            .unwrap_or_else(|_| "[]".to_string());

        conn.execute(
            r#"
            INSERT INTO recipes (title, author, description, image_url, instructions,
                                 brew_method, brew_time_secs, difficulty)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                data.title,
                data.author,
                data.description,
                data.image_url,
                instructions_json,
                data.brew_method,
                data.brew_time_secs,
                data.difficulty,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get a recipe by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM recipes WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(recipe) => Ok(Some(recipe)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Check whether a recipe exists
    pub fn exists(conn: &Connection, id: i64) -> DbResult<bool> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM recipes WHERE id = ?1",
            [id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// List recipes with optional filtering
    pub fn list(
        conn: &Connection,
        query: Option<&str>,
        author: Option<&str>,
        sort_by: &str,
        sort_order: &str,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<Self>> {
        let order = if sort_order.to_lowercase() == "asc" { "ASC" } else { "DESC" };
        let sort_col = match sort_by.to_lowercase().as_str() {
            "title" => "title",
            "average_rating" => "average_rating",
            _ => "created_at",
        };

        let (sql, search_param) = match (query, author) {
            (Some(q), Some(_)) => (
                format!(
                    "SELECT * FROM recipes WHERE title LIKE ?1 AND author = ?2 ORDER BY {} {} LIMIT ?3 OFFSET ?4",
                    sort_col, order
                ),
                Some(format!("%{}%", q)),
            ),
            (Some(q), None) => (
                format!(
                    "SELECT * FROM recipes WHERE title LIKE ?1 ORDER BY {} {} LIMIT ?2 OFFSET ?3",
                    sort_col, order
                ),
                Some(format!("%{}%", q)),
            ),
            (None, Some(_)) => (
                format!(
                    "SELECT * FROM recipes WHERE author = ?1 ORDER BY {} {} LIMIT ?2 OFFSET ?3",
                    sort_col, order
                ),
                None,
            ),
            (None, None) => (
                format!(
                    "SELECT * FROM recipes ORDER BY {} {} LIMIT ?1 OFFSET ?2",
                    sort_col, order
                ),
                None,
            ),
        };

        let mut stmt = conn.prepare(&sql)?;

        let recipes = match (search_param, author) {
            (Some(pattern), Some(author)) => stmt
                .query_map(params![pattern, author, limit, offset], Self::from_row)?
                .collect::<Result<Vec<_>, _>>()?,
            (Some(pattern), None) => stmt
                .query_map(params![pattern, limit, offset], Self::from_row)?
                .collect::<Result<Vec<_>, _>>()?,
            (None, Some(author)) => stmt
                .query_map(params![author, limit, offset], Self::from_row)?
                .collect::<Result<Vec<_>, _>>()?,
            (None, None) => stmt
                .query_map(params![limit, offset], Self::from_row)?
                .collect::<Result<Vec<_>, _>>()?,
        };

        Ok(recipes)
    }

    /// Update a recipe, only when the given author owns it
    pub fn update_for_author(
        conn: &Connection,
        id: i64,
        author: &str,
        data: &RecipeUpdate,
    ) -> DbResult<Option<Self>> {
        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref title) = data.title {
            updates.push(format!("title = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(title.clone()));
        }
        if let Some(ref description) = data.description {
            updates.push(format!("description = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(description.clone()));
        }
        if let Some(ref image_url) = data.image_url {
            updates.push(format!("image_url = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(image_url.clone()));
        }
        if let Some(ref instructions) = data.instructions {
            let json = serde_json::to_string(instructions)
                .unwrap_or_else(|_| "[]".to_string());
            updates.push(format!("instructions = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(json));
        }
        if let Some(ref brew_method) = data.brew_method {
            updates.push(format!("brew_method = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(brew_method.clone()));
        }
        if let Some(brew_time_secs) = data.brew_time_secs {
            updates.push(format!("brew_time_secs = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(brew_time_secs));
        }
        if let Some(ref difficulty) = data.difficulty {
            updates.push(format!("difficulty = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(difficulty.clone()));
        }

        if updates.is_empty() {
            // Nothing to change, but still enforce ownership
            let recipe = Self::get_by_id(conn, id)?;
            return Ok(recipe.filter(|r| r.author == author));
        }

        updates.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "UPDATE recipes SET {} WHERE id = ?{} AND author = ?{}",
            updates.join(", "),
            params_vec.len() + 1,
            params_vec.len() + 2,
        );

        params_vec.push(Box::new(id));
        params_vec.push(Box::new(author.to_string()));

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        let rows = conn.execute(&sql, params_refs.as_slice())?;

        if rows == 0 {
            return Ok(None);
        }

        Self::get_by_id(conn, id)
    }

    /// Persist the derived aggregate rating. NULL is the explicit "no rating"
    /// marker for a recipe with zero reviews. Returns the number of rows
    /// touched (0 means the recipe no longer exists).
    pub fn set_average_rating(
        conn: &Connection,
        id: i64,
        average_rating: Option<f64>,
    ) -> DbResult<usize> {
        let rows = conn.execute(
            "UPDATE recipes SET average_rating = ?1, updated_at = datetime('now') WHERE id = ?2",
            params![average_rating, id],
        )?;
        Ok(rows)
    }

    /// Count recipes, optionally for one author
    pub fn count(conn: &Connection, author: Option<&str>) -> DbResult<i64> {
        let count: i64 = if let Some(author) = author {
            conn.query_row(
                "SELECT COUNT(*) FROM recipes WHERE author = ?1",
                [author],
                |row| row.get(0),
            )?
        } else {
            conn.query_row("SELECT COUNT(*) FROM recipes", [], |row| row.get(0))?
        };
        Ok(count)
    }

    /// List all recipe IDs (for maintenance sweeps)
    pub fn all_ids(conn: &Connection) -> DbResult<Vec<i64>> {
        let mut stmt = conn.prepare("SELECT id FROM recipes ORDER BY id")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    /// Delete a recipe, only when the given author owns it.
    /// Reviews and ingredients cascade with the row.
    pub fn delete_for_author(conn: &Connection, id: i64, author: &str) -> DbResult<bool> {
        let rows = conn.execute(
            "DELETE FROM recipes WHERE id = ?1 AND author = ?2",
            params![id, author],
        )?;
        Ok(rows > 0)
    }
}
