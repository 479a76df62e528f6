//! Recipe MCP Tools
//!
//! Tools for creating, reading, updating, and deleting recipes, including
//! the ingredient validation pipeline and legacy ingredient import.

use serde::Serialize;

use crate::db::Database;
use crate::ingredients::{parse_legacy_line, validate_ingredients, IngredientDraft};
use crate::models::{Ingredient, Recipe, RecipeCreate, RecipeUpdate, Review};
use crate::units::UnitCatalog;

/// Response for create_recipe
#[derive(Debug, Serialize)]
pub struct CreateRecipeResponse {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub ingredient_count: usize,
    /// Advisories from unit normalization; the recipe was saved regardless
    pub warnings: Vec<String>,
    pub created_at: String,
}

/// Full recipe detail with ingredients and reviews
#[derive(Debug, Serialize)]
pub struct RecipeDetail {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub instructions: Vec<String>,
    pub brew_method: Option<String>,
    pub brew_time_secs: Option<i64>,
    pub difficulty: Option<String>,
    pub average_rating: Option<f64>,
    pub ingredients: Vec<Ingredient>,
    pub reviews: Vec<Review>,
    pub created_at: String,
    pub updated_at: String,
}

/// Recipe summary for listing
#[derive(Debug, Serialize)]
pub struct RecipeSummary {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub average_rating: Option<f64>,
    pub review_count: i64,
    pub ingredient_count: i64,
    pub created_at: String,
}

/// Response for list_recipes
#[derive(Debug, Serialize)]
pub struct ListRecipesResponse {
    pub recipes: Vec<RecipeSummary>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Response for update_recipe
#[derive(Debug, Serialize)]
pub struct UpdateRecipeResponse {
    pub success: bool,
    pub warnings: Vec<String>,
    pub updated_at: String,
}

/// Response for delete_recipe
#[derive(Debug, Serialize)]
pub struct DeleteRecipeResponse {
    pub success: bool,
    pub deleted_id: i64,
}

/// Response for import_legacy_ingredients
#[derive(Debug, Serialize)]
pub struct ImportLegacyResponse {
    pub recipe_id: i64,
    pub ingredient_count: usize,
    pub warnings: Vec<String>,
}

// ============================================================================
// Recipe Tools
// ============================================================================

/// Create a new recipe with its ingredient list
pub fn create_recipe(
    db: &Database,
    catalog: &UnitCatalog,
    data: RecipeCreate,
    ingredients: Vec<IngredientDraft>,
) -> Result<CreateRecipeResponse, String> {
    if data.title.trim().is_empty() {
        return Err("Recipe title cannot be empty".to_string());
    }
    if data.author.trim().is_empty() {
        return Err("Recipe author cannot be empty".to_string());
    }
    if data.instructions.is_empty() {
        return Err("Recipe must have at least one instruction step".to_string());
    }

    // Validate the whole batch before anything is persisted
    let validated = validate_ingredients(catalog, &ingredients).map_err(|e| e.to_string())?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let recipe = Recipe::create(&conn, &data)
        .map_err(|e| format!("Failed to create recipe: {}", e))?;

    let saved = Ingredient::replace_for_recipe(&conn, recipe.id, &validated.ingredients)
        .map_err(|e| format!("Failed to save ingredients: {}", e))?;

    Ok(CreateRecipeResponse {
        id: recipe.id,
        title: recipe.title,
        author: recipe.author,
        ingredient_count: saved.len(),
        warnings: validated.warnings,
        created_at: recipe.created_at,
    })
}

/// Get a recipe with full details
pub fn get_recipe(db: &Database, id: i64) -> Result<Option<RecipeDetail>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let recipe = Recipe::get_by_id(&conn, id)
        .map_err(|e| format!("Failed to get recipe: {}", e))?;

    match recipe {
        Some(recipe) => {
            let ingredients = Ingredient::get_for_recipe(&conn, id)
                .map_err(|e| format!("Failed to get ingredients: {}", e))?;

            let reviews = Review::list_for_recipe(&conn, id)
                .map_err(|e| format!("Failed to get reviews: {}", e))?;

            Ok(Some(RecipeDetail {
                id: recipe.id,
                title: recipe.title,
                author: recipe.author,
                description: recipe.description,
                image_url: recipe.image_url,
                instructions: recipe.instructions,
                brew_method: recipe.brew_method,
                brew_time_secs: recipe.brew_time_secs,
                difficulty: recipe.difficulty,
                average_rating: recipe.average_rating,
                ingredients,
                reviews,
                created_at: recipe.created_at,
                updated_at: recipe.updated_at,
            }))
        }
        None => Ok(None),
    }
}

/// List recipes with filtering
pub fn list_recipes(
    db: &Database,
    query: Option<&str>,
    author: Option<&str>,
    sort_by: &str,
    sort_order: &str,
    limit: i64,
    offset: i64,
) -> Result<ListRecipesResponse, String> {
    let limit = limit.clamp(1, 200);
    let offset = offset.max(0);

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let recipes = Recipe::list(&conn, query, author, sort_by, sort_order, limit, offset)
        .map_err(|e| format!("Failed to list recipes: {}", e))?;

    let total = Recipe::count(&conn, author)
        .map_err(|e| format!("Failed to count recipes: {}", e))?;

    let mut summaries = Vec::new();
    for recipe in recipes {
        let review_count = Review::count_for_recipe(&conn, recipe.id)
            .map_err(|e| format!("Failed to count reviews: {}", e))?;
        let ingredient_count = Ingredient::count_for_recipe(&conn, recipe.id)
            .map_err(|e| format!("Failed to count ingredients: {}", e))?;

        summaries.push(RecipeSummary {
            id: recipe.id,
            title: recipe.title,
            author: recipe.author,
            average_rating: recipe.average_rating,
            review_count,
            ingredient_count,
            created_at: recipe.created_at,
        });
    }

    Ok(ListRecipesResponse {
        recipes: summaries,
        total,
        limit,
        offset,
    })
}

/// Update a recipe; a new ingredient list replaces the old one wholesale
pub fn update_recipe(
    db: &Database,
    catalog: &UnitCatalog,
    id: i64,
    author: &str,
    data: RecipeUpdate,
    ingredients: Option<Vec<IngredientDraft>>,
) -> Result<UpdateRecipeResponse, String> {
    // Validate a replacement list before touching the recipe so a bad batch
    // leaves the stored list untouched
    let validated = match ingredients {
        Some(drafts) => Some(validate_ingredients(catalog, &drafts).map_err(|e| e.to_string())?),
        None => None,
    };

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let updated = Recipe::update_for_author(&conn, id, author, &data)
        .map_err(|e| format!("Failed to update recipe: {}", e))?;

    let recipe = match updated {
        Some(recipe) => recipe,
        None => return Err(format!("Recipe {} not found for author '{}'", id, author)),
    };

    let warnings = match validated {
        Some(validated) => {
            Ingredient::replace_for_recipe(&conn, id, &validated.ingredients)
                .map_err(|e| format!("Failed to replace ingredients: {}", e))?;
            validated.warnings
        }
        None => Vec::new(),
    };

    Ok(UpdateRecipeResponse {
        success: true,
        warnings,
        updated_at: recipe.updated_at,
    })
}

/// Delete a recipe and (by cascade) its ingredients and reviews
pub fn delete_recipe(db: &Database, id: i64, author: &str) -> Result<DeleteRecipeResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let deleted = Recipe::delete_for_author(&conn, id, author)
        .map_err(|e| format!("Failed to delete recipe: {}", e))?;

    if !deleted {
        return Err(format!("Recipe {} not found for author '{}'", id, author));
    }

    Ok(DeleteRecipeResponse {
        success: true,
        deleted_id: id,
    })
}

/// Import legacy free-text ingredient lines, replacing the recipe's list
pub fn import_legacy_ingredients(
    db: &Database,
    catalog: &UnitCatalog,
    recipe_id: i64,
    author: &str,
    lines: Vec<String>,
) -> Result<ImportLegacyResponse, String> {
    let mut drafts = Vec::with_capacity(lines.len());
    for (line_number, line) in lines.iter().enumerate() {
        let draft = parse_legacy_line(line)
            .map_err(|e| format!("Line {}: {}", line_number + 1, e))?;
        drafts.push(draft);
    }

    let validated = validate_ingredients(catalog, &drafts).map_err(|e| e.to_string())?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let recipe = Recipe::get_by_id(&conn, recipe_id)
        .map_err(|e| format!("Failed to get recipe: {}", e))?;
    match recipe {
        Some(recipe) if recipe.author == author => {}
        _ => return Err(format!("Recipe {} not found for author '{}'", recipe_id, author)),
    }

    let saved = Ingredient::replace_for_recipe(&conn, recipe_id, &validated.ingredients)
        .map_err(|e| format!("Failed to save ingredients: {}", e))?;

    Ok(ImportLegacyResponse {
        recipe_id,
        ingredient_count: saved.len(),
        warnings: validated.warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations;
    use crate::models::IngredientCategory;

    fn test_db() -> (Database, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("test.db")).unwrap();
        db.with_conn(|conn| migrations::run_migrations(conn)).unwrap();
        (db, dir)
    }

    fn catalog() -> UnitCatalog {
        UnitCatalog::standard().unwrap()
    }

    fn pour_over(author: &str) -> RecipeCreate {
        RecipeCreate {
            title: "V60 Pour Over".to_string(),
            author: author.to_string(),
            description: None,
            image_url: None,
            instructions: vec!["bloom".to_string(), "pour".to_string()],
            brew_method: Some("pour over".to_string()),
            brew_time_secs: Some(180),
            difficulty: Some("medium".to_string()),
        }
    }

    fn drafts() -> Vec<IngredientDraft> {
        vec![
            IngredientDraft {
                quantity: Some(18.0),
                unit: Some("grams".to_string()),
                name: Some("coffee".to_string()),
                notes: None,
                category: IngredientCategory::Coffee,
            },
            IngredientDraft {
                quantity: Some(300.0),
                unit: Some("ml".to_string()),
                name: Some("water".to_string()),
                notes: None,
                category: IngredientCategory::Water,
            },
        ]
    }

    #[test]
    fn test_create_recipe_canonicalizes_units() {
        let (db, _dir) = test_db();
        let response = create_recipe(&db, &catalog(), pour_over("ada"), drafts()).unwrap();

        assert_eq!(response.ingredient_count, 2);
        assert!(response.warnings.is_empty());

        let detail = get_recipe(&db, response.id).unwrap().unwrap();
        assert_eq!(detail.ingredients[0].unit, "g");
        assert_eq!(detail.ingredients[1].unit, "ml");
        assert_eq!(detail.average_rating, None);
    }

    #[test]
    fn test_create_recipe_surfaces_warnings() {
        let (db, _dir) = test_db();
        let mut ingredients = drafts();
        ingredients[0].unit = Some("grms".to_string());

        let response = create_recipe(&db, &catalog(), pour_over("ada"), ingredients).unwrap();
        assert_eq!(response.warnings.len(), 1);
        assert!(response.warnings[0].contains("grms"));
    }

    #[test]
    fn test_invalid_batch_saves_nothing() {
        let (db, _dir) = test_db();
        let mut ingredients = drafts();
        ingredients[1].quantity = Some(0.0);

        assert!(create_recipe(&db, &catalog(), pour_over("ada"), ingredients).is_err());

        let count = db
            .with_conn(|conn| Recipe::count(conn, None))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_update_with_bad_batch_keeps_old_list() {
        let (db, _dir) = test_db();
        let response = create_recipe(&db, &catalog(), pour_over("ada"), drafts()).unwrap();

        let bad = vec![IngredientDraft {
            quantity: Some(1.0),
            unit: None,
            name: Some("mystery".to_string()),
            notes: None,
            category: IngredientCategory::Other,
        }];

        assert!(update_recipe(
            &db,
            &catalog(),
            response.id,
            "ada",
            RecipeUpdate::default(),
            Some(bad),
        )
        .is_err());

        let detail = get_recipe(&db, response.id).unwrap().unwrap();
        assert_eq!(detail.ingredients.len(), 2);
        assert_eq!(detail.ingredients[0].name, "coffee");
    }

    #[test]
    fn test_update_requires_matching_author() {
        let (db, _dir) = test_db();
        let response = create_recipe(&db, &catalog(), pour_over("ada"), drafts()).unwrap();

        let result = update_recipe(
            &db,
            &catalog(),
            response.id,
            "mallory",
            RecipeUpdate {
                title: Some("Stolen Recipe".to_string()),
                ..Default::default()
            },
            None,
        );
        assert!(result.is_err());

        let detail = get_recipe(&db, response.id).unwrap().unwrap();
        assert_eq!(detail.title, "V60 Pour Over");
    }

    #[test]
    fn test_import_legacy_lines() {
        let (db, _dir) = test_db();
        let response = create_recipe(&db, &catalog(), pour_over("ada"), Vec::new()).unwrap();

        let imported = import_legacy_ingredients(
            &db,
            &catalog(),
            response.id,
            "ada",
            vec!["18 g coffee beans".to_string(), "300ml water".to_string()],
        )
        .unwrap();

        assert_eq!(imported.ingredient_count, 2);
        assert!(imported.warnings.is_empty());

        let detail = get_recipe(&db, response.id).unwrap().unwrap();
        assert_eq!(detail.ingredients[0].name, "coffee beans");
        assert_eq!(detail.ingredients[0].unit, "g");
        assert_eq!(detail.ingredients[1].quantity, 300.0);
    }

    #[test]
    fn test_delete_recipe_cascades() {
        let (db, _dir) = test_db();
        let response = create_recipe(&db, &catalog(), pour_over("ada"), drafts()).unwrap();

        delete_recipe(&db, response.id, "ada").unwrap();

        let orphans = db
            .with_conn(|conn| Ingredient::count_for_recipe(conn, response.id))
            .unwrap();
        assert_eq!(orphans, 0);
        assert!(get_recipe(&db, response.id).unwrap().is_none());
    }
}
