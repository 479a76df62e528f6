//! Simple utility to recompute every recipe's average rating
//! Usage: cargo run --bin recalculate_ratings

use std::path::PathBuf;

use brewbook::rating::RatingAggregator;

fn get_database_path() -> PathBuf {
    std::env::var("BREWBOOK_DATABASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let mut path = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()))
                .unwrap_or_else(|| PathBuf::from("."));

            if path.ends_with("release") || path.ends_with("debug") {
                if let Some(parent) = path.parent() {
                    if let Some(grandparent) = parent.parent() {
                        path = grandparent.to_path_buf();
                    }
                }
            }

            path.push("data");
            path.push("brewbook.db");
            path
        })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let db_path = get_database_path();
    println!("Database: {}", db_path.display());

    let database = brewbook::db::Database::new(&db_path)?;

    database.with_conn(|conn| {
        brewbook::db::migrations::run_migrations(conn)?;
        Ok(())
    })?;

    let recipe_ids = database.with_conn(brewbook::models::Recipe::all_ids)?;
    println!("Found {} recipes", recipe_ids.len());

    let aggregator = RatingAggregator::new(database.clone());

    for recipe_id in recipe_ids {
        let old = database
            .with_conn(|conn| brewbook::models::Recipe::get_by_id(conn, recipe_id))?
            .map(|r| r.average_rating);

        let summary = aggregator.recompute(recipe_id)?;

        println!(
            "Recipe {}: {:?} -> {:?} ({} reviews)",
            recipe_id,
            old.flatten(),
            summary.average_rating,
            summary.review_count
        );
    }

    Ok(())
}
