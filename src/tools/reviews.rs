//! Review MCP Tools
//!
//! Tools for creating, updating, and deleting reviews. Every mutation is
//! followed by a full aggregate recomputation for the affected recipe.

use serde::Serialize;

use crate::db::Database;
use crate::models::{Recipe, Review, ReviewCreate, ReviewUpdate};
use crate::rating::{RatingAggregator, RatingError};

/// Response for review mutations, carrying the recipe's fresh aggregate
#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub id: i64,
    pub recipe_id: i64,
    pub commenter: String,
    pub rating: i32,
    pub comment: String,
    pub average_rating: Option<f64>,
    pub review_count: usize,
}

/// Response for delete_review
#[derive(Debug, Serialize)]
pub struct DeleteReviewResponse {
    pub success: bool,
    pub deleted_id: i64,
    pub recipe_id: i64,
    pub average_rating: Option<f64>,
    pub review_count: usize,
}

/// Response for list_reviews
#[derive(Debug, Serialize)]
pub struct ListReviewsResponse {
    pub reviews: Vec<Review>,
    pub count: usize,
}

fn check_rating(rating: i32) -> Result<(), String> {
    if !(1..=5).contains(&rating) {
        return Err(format!("Rating must be between 1 and 5, got {}", rating));
    }
    Ok(())
}

/// Create a review for a recipe and recompute its aggregate
pub fn create_review(
    db: &Database,
    aggregator: &RatingAggregator,
    data: ReviewCreate,
) -> Result<ReviewResponse, String> {
    check_rating(data.rating)?;
    if data.commenter.trim().is_empty() {
        return Err("Review commenter cannot be empty".to_string());
    }
    if data.comment.trim().is_empty() {
        return Err("Review comment cannot be empty".to_string());
    }

    let review = {
        let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

        let recipe = Recipe::get_by_id(&conn, data.recipe_id)
            .map_err(|e| format!("Failed to get recipe: {}", e))?;
        let recipe = match recipe {
            Some(r) => r,
            None => return Err(format!("Recipe not found with id: {}", data.recipe_id)),
        };

        if recipe.author == data.commenter {
            return Err("Users cannot review their own recipe".to_string());
        }

        Review::create(&conn, &data).map_err(|e| format!("Failed to create review: {}", e))?
    };

    let summary = aggregator
        .recompute(review.recipe_id)
        .map_err(|e| format!("Failed to recompute rating: {}", e))?;

    Ok(ReviewResponse {
        id: review.id,
        recipe_id: review.recipe_id,
        commenter: review.commenter,
        rating: review.rating,
        comment: review.comment,
        average_rating: summary.average_rating,
        review_count: summary.review_count,
    })
}

/// Update a review (commenter must match) and recompute the aggregate
pub fn update_review(
    db: &Database,
    aggregator: &RatingAggregator,
    id: i64,
    commenter: &str,
    data: ReviewUpdate,
) -> Result<ReviewResponse, String> {
    if let Some(rating) = data.rating {
        check_rating(rating)?;
    }

    let review = {
        let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

        let updated = Review::update_for_commenter(&conn, id, commenter, &data)
            .map_err(|e| format!("Failed to update review: {}", e))?;

        match updated {
            Some(review) => review,
            None => return Err(format!("Review {} not found for commenter '{}'", id, commenter)),
        }
    };

    let summary = aggregator
        .recompute(review.recipe_id)
        .map_err(|e| format!("Failed to recompute rating: {}", e))?;

    Ok(ReviewResponse {
        id: review.id,
        recipe_id: review.recipe_id,
        commenter: review.commenter,
        rating: review.rating,
        comment: review.comment,
        average_rating: summary.average_rating,
        review_count: summary.review_count,
    })
}

/// Delete a review (commenter must match) and recompute the aggregate
pub fn delete_review(
    db: &Database,
    aggregator: &RatingAggregator,
    id: i64,
    commenter: &str,
) -> Result<DeleteReviewResponse, String> {
    let deleted = {
        let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

        let deleted = Review::delete_for_commenter(&conn, id, commenter)
            .map_err(|e| format!("Failed to delete review: {}", e))?;

        match deleted {
            Some(review) => review,
            None => return Err(format!("Review {} not found for commenter '{}'", id, commenter)),
        }
    };

    let summary = match aggregator.recompute(deleted.recipe_id) {
        Ok(summary) => summary,
        // The recipe may have been deleted concurrently; the review is gone
        // either way, so report the terminal state instead of failing
        Err(RatingError::RecipeNotFound(_)) => {
            return Ok(DeleteReviewResponse {
                success: true,
                deleted_id: id,
                recipe_id: deleted.recipe_id,
                average_rating: None,
                review_count: 0,
            })
        }
        Err(e) => return Err(format!("Failed to recompute rating: {}", e)),
    };

    Ok(DeleteReviewResponse {
        success: true,
        deleted_id: id,
        recipe_id: deleted.recipe_id,
        average_rating: summary.average_rating,
        review_count: summary.review_count,
    })
}

/// List all reviews for a recipe
pub fn list_reviews(db: &Database, recipe_id: i64) -> Result<ListReviewsResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    if !Recipe::exists(&conn, recipe_id).map_err(|e| format!("Database error: {}", e))? {
        return Err(format!("Recipe not found with id: {}", recipe_id));
    }

    let reviews = Review::list_for_recipe(&conn, recipe_id)
        .map_err(|e| format!("Failed to list reviews: {}", e))?;

    let count = reviews.len();
    Ok(ListReviewsResponse { reviews, count })
}

/// List all reviews written by a commenter
pub fn list_reviews_by_commenter(
    db: &Database,
    commenter: &str,
) -> Result<ListReviewsResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let reviews = Review::list_by_commenter(&conn, commenter)
        .map_err(|e| format!("Failed to list reviews: {}", e))?;

    let count = reviews.len();
    Ok(ListReviewsResponse { reviews, count })
}

/// Force a recomputation of a recipe's aggregate rating
pub fn recompute_rating(
    aggregator: &RatingAggregator,
    recipe_id: i64,
) -> Result<crate::rating::RatingSummary, String> {
    aggregator
        .recompute(recipe_id)
        .map_err(|e| format!("Failed to recompute rating: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations;
    use crate::models::RecipeCreate;

    fn test_db() -> (Database, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("test.db")).unwrap();
        db.with_conn(|conn| migrations::run_migrations(conn)).unwrap();
        (db, dir)
    }

    fn seed_recipe(db: &Database, author: &str) -> i64 {
        db.with_conn(|conn| {
            let recipe = Recipe::create(
                conn,
                &RecipeCreate {
                    title: "Cold Brew".to_string(),
                    author: author.to_string(),
                    description: None,
                    image_url: None,
                    instructions: vec!["steep overnight".to_string()],
                    brew_method: Some("immersion".to_string()),
                    brew_time_secs: None,
                    difficulty: None,
                },
            )?;
            Ok(recipe.id)
        })
        .unwrap()
    }

    fn review(recipe_id: i64, commenter: &str, rating: i32) -> ReviewCreate {
        ReviewCreate {
            recipe_id,
            commenter: commenter.to_string(),
            rating,
            comment: "nice brew".to_string(),
        }
    }

    #[test]
    fn test_create_review_updates_aggregate() {
        let (db, _dir) = test_db();
        let recipe_id = seed_recipe(&db, "ada");
        let aggregator = RatingAggregator::new(db.clone());

        let first = create_review(&db, &aggregator, review(recipe_id, "bo", 4)).unwrap();
        assert_eq!(first.average_rating, Some(4.0));
        assert_eq!(first.review_count, 1);

        let second = create_review(&db, &aggregator, review(recipe_id, "cy", 2)).unwrap();
        assert_eq!(second.average_rating, Some(3.0));
        assert_eq!(second.review_count, 2);
    }

    #[test]
    fn test_author_cannot_review_own_recipe() {
        let (db, _dir) = test_db();
        let recipe_id = seed_recipe(&db, "ada");
        let aggregator = RatingAggregator::new(db.clone());

        let err = create_review(&db, &aggregator, review(recipe_id, "ada", 5)).unwrap_err();
        assert!(err.contains("own recipe"));
    }

    #[test]
    fn test_rating_out_of_range_rejected() {
        let (db, _dir) = test_db();
        let recipe_id = seed_recipe(&db, "ada");
        let aggregator = RatingAggregator::new(db.clone());

        assert!(create_review(&db, &aggregator, review(recipe_id, "bo", 0)).is_err());
        assert!(create_review(&db, &aggregator, review(recipe_id, "bo", 6)).is_err());
    }

    #[test]
    fn test_update_review_recomputes() {
        let (db, _dir) = test_db();
        let recipe_id = seed_recipe(&db, "ada");
        let aggregator = RatingAggregator::new(db.clone());

        let created = create_review(&db, &aggregator, review(recipe_id, "bo", 2)).unwrap();
        let updated = update_review(
            &db,
            &aggregator,
            created.id,
            "bo",
            ReviewUpdate {
                rating: Some(5),
                comment: None,
            },
        )
        .unwrap();

        assert_eq!(updated.rating, 5);
        assert_eq!(updated.average_rating, Some(5.0));
    }

    #[test]
    fn test_update_requires_matching_commenter() {
        let (db, _dir) = test_db();
        let recipe_id = seed_recipe(&db, "ada");
        let aggregator = RatingAggregator::new(db.clone());

        let created = create_review(&db, &aggregator, review(recipe_id, "bo", 2)).unwrap();
        let result = update_review(
            &db,
            &aggregator,
            created.id,
            "mallory",
            ReviewUpdate {
                rating: Some(1),
                comment: None,
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_delete_last_review_clears_aggregate() {
        let (db, _dir) = test_db();
        let recipe_id = seed_recipe(&db, "ada");
        let aggregator = RatingAggregator::new(db.clone());

        let created = create_review(&db, &aggregator, review(recipe_id, "bo", 4)).unwrap();
        let deleted = delete_review(&db, &aggregator, created.id, "bo").unwrap();

        assert_eq!(deleted.review_count, 0);
        assert_eq!(deleted.average_rating, None);

        let persisted = db
            .with_conn(|conn| Recipe::get_by_id(conn, recipe_id))
            .unwrap()
            .unwrap();
        assert_eq!(persisted.average_rating, None);
    }
}
