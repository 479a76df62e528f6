//! Rating aggregate recomputation
//!
//! Recomputes a recipe's average rating by a full re-scan of its current
//! reviews. Recomputation is serialized per recipe id so concurrent review
//! mutations can never settle the aggregate on a stale intermediate set;
//! mutations against different recipes do not contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use thiserror::Error;

use crate::db::{Database, DbError};
use crate::models::{Recipe, Review};

/// Rating recomputation error types
#[derive(Debug, Error)]
pub enum RatingError {
    #[error("recipe not found with id: {0}")]
    RecipeNotFound(i64),

    #[error(transparent)]
    Db(#[from] DbError),
}

/// Result of one aggregate recomputation
#[derive(Debug, Clone, Serialize)]
pub struct RatingSummary {
    pub recipe_id: i64,
    pub review_count: usize,
    /// None is the explicit "no rating" state for zero reviews
    pub average_rating: Option<f64>,
}

/// Serialized per-recipe aggregate maintenance
#[derive(Clone)]
pub struct RatingAggregator {
    database: Database,
    /// One lock per recipe id; the map itself is guarded separately
    locks: Arc<Mutex<HashMap<i64, Arc<Mutex<()>>>>>,
}

impl RatingAggregator {
    pub fn new(database: Database) -> Self {
        Self {
            database,
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Get the lock for a recipe id, creating it on first use
    fn lock_for(&self, recipe_id: i64) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap();
        locks.entry(recipe_id).or_default().clone()
    }

    /// Recompute and persist the average rating of a recipe.
    ///
    /// Always performs a full re-scan of the current review set: the
    /// persisted aggregate is the exact mean of whatever reviews exist at
    /// the time the recipe's lock is held, which keeps it correct under any
    /// interleaving of review mutations. An empty review set persists the
    /// explicit "no rating" marker, never 0 or a division artifact.
    pub fn recompute(&self, recipe_id: i64) -> Result<RatingSummary, RatingError> {
        let lock = self.lock_for(recipe_id);
        let _guard = lock.lock().unwrap();

        let conn = self.database.get_conn()?;

        if !Recipe::exists(&conn, recipe_id)? {
            return Err(RatingError::RecipeNotFound(recipe_id));
        }

        let ratings = Review::ratings_for_recipe(&conn, recipe_id)?;

        let average_rating = if ratings.is_empty() {
            None
        } else {
            let total: i64 = ratings.iter().map(|r| *r as i64).sum();
            Some(total as f64 / ratings.len() as f64)
        };

        let rows = Recipe::set_average_rating(&conn, recipe_id, average_rating)?;
        if rows == 0 {
            // Recipe deleted between the existence check and the write
            return Err(RatingError::RecipeNotFound(recipe_id));
        }

        tracing::debug!(
            recipe_id,
            review_count = ratings.len(),
            average_rating,
            "recomputed recipe rating"
        );

        Ok(RatingSummary {
            recipe_id,
            review_count: ratings.len(),
            average_rating,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations;
    use crate::models::{RecipeCreate, ReviewCreate};

    fn test_db() -> (Database, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("test.db")).unwrap();
        db.with_conn(|conn| migrations::run_migrations(conn)).unwrap();
        (db, dir)
    }

    fn seed_recipe(db: &Database) -> i64 {
        db.with_conn(|conn| {
            let recipe = Recipe::create(
                conn,
                &RecipeCreate {
                    title: "Flat White".to_string(),
                    author: "ada".to_string(),
                    description: None,
                    image_url: None,
                    instructions: vec!["pull shot".to_string(), "steam milk".to_string()],
                    brew_method: Some("espresso".to_string()),
                    brew_time_secs: Some(30),
                    difficulty: None,
                },
            )?;
            Ok(recipe.id)
        })
        .unwrap()
    }

    fn seed_review(db: &Database, recipe_id: i64, commenter: &str, rating: i32) {
        db.with_conn(|conn| {
            Review::create(
                conn,
                &ReviewCreate {
                    recipe_id,
                    commenter: commenter.to_string(),
                    rating,
                    comment: "tasty".to_string(),
                },
            )?;
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_recompute_is_exact_mean() {
        let (db, _dir) = test_db();
        let recipe_id = seed_recipe(&db);
        for (who, rating) in [("bo", 4), ("cy", 5), ("di", 3)] {
            seed_review(&db, recipe_id, who, rating);
        }

        let aggregator = RatingAggregator::new(db.clone());
        let summary = aggregator.recompute(recipe_id).unwrap();

        assert_eq!(summary.review_count, 3);
        assert_eq!(summary.average_rating, Some(4.0));

        let persisted = db
            .with_conn(|conn| Recipe::get_by_id(conn, recipe_id))
            .unwrap()
            .unwrap();
        assert_eq!(persisted.average_rating, Some(4.0));
    }

    #[test]
    fn test_empty_review_set_persists_no_rating() {
        let (db, _dir) = test_db();
        let recipe_id = seed_recipe(&db);
        seed_review(&db, recipe_id, "bo", 5);

        let aggregator = RatingAggregator::new(db.clone());
        aggregator.recompute(recipe_id).unwrap();

        // Delete the only review; the aggregate must become the explicit
        // no-rating marker, not 0 and not NaN
        db.with_conn(|conn| {
            conn.execute("DELETE FROM reviews WHERE recipe_id = ?1", [recipe_id])?;
            Ok(())
        })
        .unwrap();

        let summary = aggregator.recompute(recipe_id).unwrap();
        assert_eq!(summary.review_count, 0);
        assert_eq!(summary.average_rating, None);

        let persisted = db
            .with_conn(|conn| Recipe::get_by_id(conn, recipe_id))
            .unwrap()
            .unwrap();
        assert_eq!(persisted.average_rating, None);
    }

    #[test]
    fn test_recompute_missing_recipe() {
        let (db, _dir) = test_db();
        let aggregator = RatingAggregator::new(db);

        match aggregator.recompute(999) {
            Err(RatingError::RecipeNotFound(999)) => {}
            other => panic!("expected RecipeNotFound, got {:?}", other.map(|s| s.average_rating)),
        }
    }

    #[test]
    fn test_concurrent_reviews_settle_on_final_mean() {
        let (db, _dir) = test_db();
        let recipe_id = seed_recipe(&db);
        let aggregator = RatingAggregator::new(db.clone());

        let mut handles = Vec::new();
        for (who, rating) in [("bo", 5), ("cy", 1)] {
            let db = db.clone();
            let aggregator = aggregator.clone();
            let who = who.to_string();
            handles.push(std::thread::spawn(move || {
                db.with_conn(|conn| {
                    Review::create(
                        conn,
                        &ReviewCreate {
                            recipe_id,
                            commenter: who,
                            rating,
                            comment: "concurrent".to_string(),
                        },
                    )?;
                    Ok(())
                })
                .unwrap();
                aggregator.recompute(recipe_id).unwrap();
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let persisted = db
            .with_conn(|conn| Recipe::get_by_id(conn, recipe_id))
            .unwrap()
            .unwrap();
        assert_eq!(persisted.average_rating, Some(3.0));
    }
}
