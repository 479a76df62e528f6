//! Brewbook MCP Server Implementation
//!
//! Implements the MCP server with all Brewbook tools.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::db::Database;
use crate::ingredients::IngredientDraft;
use crate::models::{IngredientCategory, RecipeCreate, RecipeUpdate, ReviewCreate, ReviewUpdate};
use crate::rating::RatingAggregator;
use crate::tools::status::StatusTracker;
use crate::tools::{recipes, reviews, units};
use crate::units::UnitCatalog;

/// Brewbook MCP Service
#[derive(Clone)]
pub struct BrewbookService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    catalog: Arc<UnitCatalog>,
    aggregator: RatingAggregator,
    tool_router: ToolRouter<BrewbookService>,
}

impl BrewbookService {
    pub fn new(database_path: PathBuf, database: Database, catalog: UnitCatalog) -> Self {
        let aggregator = RatingAggregator::new(database.clone());
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path))),
            database,
            catalog: Arc::new(catalog),
            aggregator,
            tool_router: Self::tool_router(),
        }
    }
}

// ============================================================================
// Ingredient Parameter Structs
// ============================================================================

/// A raw ingredient entry; validation reports missing fields by index
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct IngredientParam {
    /// Quantity, must be a positive number
    pub quantity: Option<f64>,
    /// Unit string, free-form; normalized to a canonical unit when recognized
    pub unit: Option<String>,
    /// Ingredient name
    pub name: Option<String>,
    /// Optional notes
    pub notes: Option<String>,
    /// Category: coffee, water, sweetener, flavoring, or other (default other)
    pub category: Option<String>,
}

impl From<IngredientParam> for IngredientDraft {
    fn from(p: IngredientParam) -> Self {
        IngredientDraft {
            quantity: p.quantity,
            unit: p.unit,
            name: p.name,
            notes: p.notes,
            category: p
                .category
                .as_deref()
                .map(IngredientCategory::from_str)
                .unwrap_or_default(),
        }
    }
}

// ============================================================================
// Recipe Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateRecipeParams {
    /// Recipe title
    pub title: String,
    /// Author username (supplied by the calling layer)
    pub author: String,
    /// Optional description
    pub description: Option<String>,
    /// Optional image URL
    pub image_url: Option<String>,
    /// Ordered instruction steps
    pub instructions: Vec<String>,
    /// Brew method, e.g. "pour over", "espresso"
    pub brew_method: Option<String>,
    /// Total brew time in seconds
    pub brew_time_secs: Option<i64>,
    /// Difficulty, e.g. "easy", "medium", "hard"
    pub difficulty: Option<String>,
    /// Ingredient list (validated as one batch)
    #[serde(default)]
    pub ingredients: Vec<IngredientParam>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetRecipeParams {
    /// Recipe ID
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListRecipesParams {
    /// Search query for recipe title (optional)
    pub query: Option<String>,
    /// Only show recipes by this author (optional)
    pub author: Option<String>,
    /// Sort by: created_at, title, or average_rating (default created_at)
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
    /// Sort order: asc or desc (default desc)
    #[serde(default = "default_sort_order")]
    pub sort_order: String,
    /// Maximum results (default 50, max 200)
    #[serde(default = "default_list_limit")]
    pub limit: i64,
    /// Offset for pagination (default 0)
    #[serde(default)]
    pub offset: i64,
}

fn default_sort_by() -> String { "created_at".to_string() }
fn default_sort_order() -> String { "desc".to_string() }
fn default_list_limit() -> i64 { 50 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateRecipeParams {
    /// Recipe ID to update
    pub id: i64,
    /// Author username; must match the recipe's author
    pub author: String,
    /// New title (optional)
    pub title: Option<String>,
    /// New description (optional)
    pub description: Option<String>,
    /// New image URL (optional)
    pub image_url: Option<String>,
    /// New instruction steps (optional)
    pub instructions: Option<Vec<String>>,
    /// New brew method (optional)
    pub brew_method: Option<String>,
    /// New brew time in seconds (optional)
    pub brew_time_secs: Option<i64>,
    /// New difficulty (optional)
    pub difficulty: Option<String>,
    /// Replacement ingredient list (optional; replaces the whole list)
    pub ingredients: Option<Vec<IngredientParam>>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteRecipeParams {
    /// Recipe ID to delete
    pub id: i64,
    /// Author username; must match the recipe's author
    pub author: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ImportLegacyIngredientsParams {
    /// Recipe ID to import into
    pub recipe_id: i64,
    /// Author username; must match the recipe's author
    pub author: String,
    /// Legacy ingredient lines, e.g. "18 g coffee beans"
    pub lines: Vec<String>,
}

// ============================================================================
// Unit Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct NormalizeUnitParams {
    /// Raw unit string, e.g. "Tbs", "grams", "cups"
    pub unit: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ValidateIngredientsParams {
    /// Ingredient entries to validate (nothing is persisted)
    pub ingredients: Vec<IngredientParam>,
}

// ============================================================================
// Review Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateReviewParams {
    /// Recipe ID being reviewed
    pub recipe_id: i64,
    /// Reviewer username (supplied by the calling layer)
    pub commenter: String,
    /// Rating from 1 to 5
    pub rating: i32,
    /// Review comment
    pub comment: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateReviewParams {
    /// Review ID to update
    pub id: i64,
    /// Reviewer username; must match the review's commenter
    pub commenter: String,
    /// New rating from 1 to 5 (optional)
    pub rating: Option<i32>,
    /// New comment (optional)
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteReviewParams {
    /// Review ID to delete
    pub id: i64,
    /// Reviewer username; must match the review's commenter
    pub commenter: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListReviewsParams {
    /// Recipe ID
    pub recipe_id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListReviewsByCommenterParams {
    /// Reviewer username
    pub commenter: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RecomputeRatingParams {
    /// Recipe ID to recompute
    pub recipe_id: i64,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl BrewbookService {
    // --- Status ---

    #[tool(description = "Get the current status of the Brewbook service including build info, database status, and process information")]
    async fn brewbook_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status(&self.database);
        let json = serde_json::to_string_pretty(&status)
            .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    // --- Recipes ---

    #[tool(description = "Create a new recipe with its ingredient list. The whole ingredient batch is validated up front; unknown units are kept but reported as warnings.")]
    fn create_recipe(&self, Parameters(p): Parameters<CreateRecipeParams>) -> Result<CallToolResult, McpError> {
        let data = RecipeCreate {
            title: p.title,
            author: p.author,
            description: p.description,
            image_url: p.image_url,
            instructions: p.instructions,
            brew_method: p.brew_method,
            brew_time_secs: p.brew_time_secs,
            difficulty: p.difficulty,
        };
        let ingredients: Vec<IngredientDraft> = p.ingredients.into_iter().map(Into::into).collect();
        let result = recipes::create_recipe(&self.database, &self.catalog, data, ingredients)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Get full recipe details with ingredients, reviews, and average rating")]
    fn get_recipe(&self, Parameters(p): Parameters<GetRecipeParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::get_recipe(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(recipe) => serde_json::to_string_pretty(&recipe),
            None => Ok(format!(r#"{{"error": "Recipe not found", "id": {}}}"#, p.id)),
        }.map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "List recipes with optional title search, author filter, sorting, and pagination")]
    fn list_recipes(&self, Parameters(p): Parameters<ListRecipesParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::list_recipes(&self.database, p.query.as_deref(), p.author.as_deref(), &p.sort_by, &p.sort_order, p.limit, p.offset)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Update a recipe. Only the recipe's author may update it. A new ingredient list replaces the old one wholesale and goes through the validation pipeline.")]
    fn update_recipe(&self, Parameters(p): Parameters<UpdateRecipeParams>) -> Result<CallToolResult, McpError> {
        let data = RecipeUpdate {
            title: p.title,
            description: p.description,
            image_url: p.image_url,
            instructions: p.instructions,
            brew_method: p.brew_method,
            brew_time_secs: p.brew_time_secs,
            difficulty: p.difficulty,
        };
        let ingredients = p.ingredients.map(|list| list.into_iter().map(Into::into).collect());
        let result = recipes::update_recipe(&self.database, &self.catalog, p.id, &p.author, data, ingredients)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Delete a recipe and its reviews. Only the recipe's author may delete it.")]
    fn delete_recipe(&self, Parameters(p): Parameters<DeleteRecipeParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::delete_recipe(&self.database, p.id, &p.author)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Import legacy free-text ingredient lines (e.g. \"18 g coffee beans\") into a recipe, replacing its current ingredient list")]
    fn import_legacy_ingredients(&self, Parameters(p): Parameters<ImportLegacyIngredientsParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::import_legacy_ingredients(&self.database, &self.catalog, p.recipe_id, &p.author, p.lines)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    // --- Units ---

    #[tool(description = "Normalize a raw unit string to its canonical unit. Unknown units are passed through with was_normalized=false.")]
    fn normalize_unit(&self, Parameters(p): Parameters<NormalizeUnitParams>) -> Result<CallToolResult, McpError> {
        let result = units::normalize(&self.catalog, &p.unit).map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Validate a batch of ingredient entries without saving anything. Fails on the first structural violation; returns canonical units and warnings otherwise.")]
    fn validate_ingredients(&self, Parameters(p): Parameters<ValidateIngredientsParams>) -> Result<CallToolResult, McpError> {
        let drafts: Vec<IngredientDraft> = p.ingredients.into_iter().map(Into::into).collect();
        let result = units::validate(&self.catalog, drafts).map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "List all supported measurement units with their accepted variations")]
    fn list_units(&self) -> Result<CallToolResult, McpError> {
        let result = units::list_units(&self.catalog);
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    // --- Reviews ---

    #[tool(description = "Create a review for a recipe (rating 1-5). Authors cannot review their own recipes. The recipe's average rating is recomputed.")]
    fn create_review(&self, Parameters(p): Parameters<CreateReviewParams>) -> Result<CallToolResult, McpError> {
        let data = ReviewCreate {
            recipe_id: p.recipe_id,
            commenter: p.commenter,
            rating: p.rating,
            comment: p.comment,
        };
        let result = reviews::create_review(&self.database, &self.aggregator, data)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Update a review's rating or comment. Only the review's commenter may update it. The recipe's average rating is recomputed.")]
    fn update_review(&self, Parameters(p): Parameters<UpdateReviewParams>) -> Result<CallToolResult, McpError> {
        let data = ReviewUpdate { rating: p.rating, comment: p.comment };
        let result = reviews::update_review(&self.database, &self.aggregator, p.id, &p.commenter, data)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Delete a review. Only the review's commenter may delete it. The recipe's average rating is recomputed.")]
    fn delete_review(&self, Parameters(p): Parameters<DeleteReviewParams>) -> Result<CallToolResult, McpError> {
        let result = reviews::delete_review(&self.database, &self.aggregator, p.id, &p.commenter)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "List all reviews for a recipe, newest first")]
    fn list_reviews(&self, Parameters(p): Parameters<ListReviewsParams>) -> Result<CallToolResult, McpError> {
        let result = reviews::list_reviews(&self.database, p.recipe_id)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "List all reviews written by a commenter, newest first")]
    fn list_reviews_by_commenter(&self, Parameters(p): Parameters<ListReviewsByCommenterParams>) -> Result<CallToolResult, McpError> {
        let result = reviews::list_reviews_by_commenter(&self.database, &p.commenter)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Force a recomputation of a recipe's average rating from its current review set")]
    fn recompute_rating(&self, Parameters(p): Parameters<RecomputeRatingParams>) -> Result<CallToolResult, McpError> {
        let result = reviews::recompute_rating(&self.aggregator, p.recipe_id)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for BrewbookService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "brewbook".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Brewbook".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Brewbook - coffee recipe sharing and reviews. \
                 Recipes: create/get/list/update/delete_recipe, import_legacy_ingredients. \
                 Ingredient quantities need a positive quantity, a unit, and a name; \
                 unknown units are accepted but reported in the response's warnings array. \
                 Units: normalize_unit, validate_ingredients, list_units. \
                 Reviews: create/update/delete_review (rating 1-5, authors cannot review \
                 their own recipes), list_reviews, list_reviews_by_commenter. \
                 The average rating on a recipe is derived from its reviews; use \
                 recompute_rating to refresh it manually."
                    .into(),
            ),
        }
    }
}
