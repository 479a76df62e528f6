//! Review model
//!
//! User reviews of recipes. Reviews are created, updated, and deleted
//! independently of their recipe; every mutation is followed by an
//! aggregate recomputation (see the rating module).

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

/// A review of a recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub recipe_id: i64,
    pub commenter: String,
    pub rating: i32,
    pub comment: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a new review
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewCreate {
    pub recipe_id: i64,
    pub commenter: String,
    pub rating: i32,
    pub comment: String,
}

/// Data for updating a review
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewUpdate {
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

impl Review {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            recipe_id: row.get("recipe_id")?,
            commenter: row.get("commenter")?,
            rating: row.get("rating")?,
            comment: row.get("comment")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Insert a new review
    pub fn create(conn: &Connection, data: &ReviewCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO reviews (recipe_id, commenter, rating, comment)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![data.recipe_id, data.commenter, data.rating, data.comment],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get a review by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM reviews WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(review) => Ok(Some(review)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get all reviews for a recipe, newest first
    pub fn list_for_recipe(conn: &Connection, recipe_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM reviews WHERE recipe_id = ?1 ORDER BY created_at DESC, id DESC",
        )?;

        let reviews = stmt
            .query_map([recipe_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(reviews)
    }

    /// Get all reviews written by a commenter, newest first
    pub fn list_by_commenter(conn: &Connection, commenter: &str) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM reviews WHERE commenter = ?1 ORDER BY created_at DESC, id DESC",
        )?;

        let reviews = stmt
            .query_map([commenter], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(reviews)
    }

    /// The ratings of all reviews currently referencing a recipe, in row order.
    /// This is the read contract consumed by the rating aggregator.
    pub fn ratings_for_recipe(conn: &Connection, recipe_id: i64) -> DbResult<Vec<i32>> {
        let mut stmt = conn.prepare(
            "SELECT rating FROM reviews WHERE recipe_id = ?1 ORDER BY id",
        )?;

        let ratings = stmt
            .query_map([recipe_id], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ratings)
    }

    /// Count reviews for a recipe
    pub fn count_for_recipe(conn: &Connection, recipe_id: i64) -> DbResult<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM reviews WHERE recipe_id = ?1",
            [recipe_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Update a review, only when the given commenter wrote it
    pub fn update_for_commenter(
        conn: &Connection,
        id: i64,
        commenter: &str,
        data: &ReviewUpdate,
    ) -> DbResult<Option<Self>> {
        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(rating) = data.rating {
            updates.push(format!("rating = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(rating));
        }
        if let Some(ref comment) = data.comment {
            updates.push(format!("comment = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(comment.clone()));
        }

        if updates.is_empty() {
            let review = Self::get_by_id(conn, id)?;
            return Ok(review.filter(|r| r.commenter == commenter));
        }

        updates.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "UPDATE reviews SET {} WHERE id = ?{} AND commenter = ?{}",
            updates.join(", "),
            params_vec.len() + 1,
            params_vec.len() + 2,
        );

        params_vec.push(Box::new(id));
        params_vec.push(Box::new(commenter.to_string()));

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        let rows = conn.execute(&sql, params_refs.as_slice())?;

        if rows == 0 {
            return Ok(None);
        }

        Self::get_by_id(conn, id)
    }

    /// Delete a review, only when the given commenter wrote it.
    /// Returns the deleted review so callers can recompute its recipe's aggregate.
    pub fn delete_for_commenter(
        conn: &Connection,
        id: i64,
        commenter: &str,
    ) -> DbResult<Option<Self>> {
        let review = match Self::get_by_id(conn, id)? {
            Some(r) if r.commenter == commenter => r,
            _ => return Ok(None),
        };

        conn.execute(
            "DELETE FROM reviews WHERE id = ?1 AND commenter = ?2",
            params![id, commenter],
        )?;

        Ok(Some(review))
    }
}
