//! Recipe, meal-plan, and shopping-list endpoints

use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value as JsonValue;

use hearth_store::{
    MealPlan, MealPlanPatch, MealPlanWithRecipe, NewMealPlan, NewRecipe, NewShoppingItem,
    Recipe, RecipePatch, ShoppingItemPatch, ShoppingListItem,
};

use crate::error::ApiError;
use crate::server::GatewayState;

// ── Recipes ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct RecipeQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub category: Option<String>,
}

fn default_limit() -> i64 {
    100
}

pub async fn create_recipe(
    State(state): State<GatewayState>,
    Json(new): Json<NewRecipe>,
) -> Result<Json<Recipe>, ApiError> {
    Ok(Json(state.store.create_recipe(new).await?))
}

pub async fn list_recipes(
    State(state): State<GatewayState>,
    Query(query): Query<RecipeQuery>,
) -> Result<Json<Vec<Recipe>>, ApiError> {
    Ok(Json(
        state
            .store
            .list_recipes(query.category, query.skip, query.limit)
            .await?,
    ))
}

pub async fn get_recipe(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<Json<Recipe>, ApiError> {
    let recipe = state
        .store
        .get_recipe(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Recipe"))?;
    Ok(Json(recipe))
}

pub async fn update_recipe(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    Json(patch): Json<RecipePatch>,
) -> Result<Json<Recipe>, ApiError> {
    let recipe = state
        .store
        .update_recipe(&id, patch)
        .await?
        .ok_or_else(|| ApiError::not_found("Recipe"))?;
    Ok(Json(recipe))
}

pub async fn delete_recipe(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<Json<JsonValue>, ApiError> {
    if !state.store.delete_recipe(&id).await? {
        return Err(ApiError::not_found("Recipe"));
    }
    Ok(Json(
        serde_json::json!({ "message": "Recipe deleted successfully" }),
    ))
}

// ── Meal plans ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MealPlanQuery {
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct WeeklyPlanRequest {
    pub start_date: DateTime<Utc>,
}

pub async fn create_meal_plan(
    State(state): State<GatewayState>,
    Json(new): Json<NewMealPlan>,
) -> Result<Json<MealPlan>, ApiError> {
    let plan = state
        .store
        .create_meal_plan(new)
        .await?
        .ok_or_else(|| ApiError::not_found("Recipe"))?;
    Ok(Json(plan))
}

pub async fn list_meal_plans(
    State(state): State<GatewayState>,
    Query(query): Query<MealPlanQuery>,
) -> Result<Json<Vec<MealPlanWithRecipe>>, ApiError> {
    Ok(Json(
        state
            .store
            .list_meal_plans(query.start_date, query.end_date)
            .await?,
    ))
}

pub async fn get_meal_plan(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<Json<MealPlanWithRecipe>, ApiError> {
    let plan = state
        .store
        .get_meal_plan(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Meal plan"))?;
    Ok(Json(plan))
}

pub async fn update_meal_plan(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    Json(patch): Json<MealPlanPatch>,
) -> Result<Json<MealPlan>, ApiError> {
    let plan = state
        .store
        .update_meal_plan(&id, patch)
        .await?
        .ok_or_else(|| ApiError::not_found("Meal plan"))?;
    Ok(Json(plan))
}

pub async fn delete_meal_plan(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<Json<JsonValue>, ApiError> {
    if !state.store.delete_meal_plan(&id).await? {
        return Err(ApiError::not_found("Meal plan"));
    }
    Ok(Json(
        serde_json::json!({ "message": "Meal plan deleted successfully" }),
    ))
}

pub async fn generate_weekly(
    State(state): State<GatewayState>,
    Json(request): Json<WeeklyPlanRequest>,
) -> Result<Json<JsonValue>, ApiError> {
    let plans = state.store.generate_weekly_plan(request.start_date).await?;
    Ok(Json(serde_json::json!({
        "message": format!("Generated {} meal plans", plans.len()),
        "plans": plans,
    })))
}

// ── Shopping list ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ShoppingQuery {
    #[serde(default)]
    pub include_purchased: bool,
}

pub async fn shopping_list(
    State(state): State<GatewayState>,
    Query(query): Query<ShoppingQuery>,
) -> Result<Json<Vec<ShoppingListItem>>, ApiError> {
    Ok(Json(
        state
            .store
            .list_shopping_items(query.include_purchased)
            .await?,
    ))
}

pub async fn add_shopping_item(
    State(state): State<GatewayState>,
    Json(new): Json<NewShoppingItem>,
) -> Result<Json<ShoppingListItem>, ApiError> {
    Ok(Json(state.store.add_shopping_item(new).await?))
}

pub async fn update_shopping_item(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    Json(patch): Json<ShoppingItemPatch>,
) -> Result<Json<ShoppingListItem>, ApiError> {
    let item = state
        .store
        .update_shopping_item(&id, patch)
        .await?
        .ok_or_else(|| ApiError::not_found("Shopping list item"))?;
    Ok(Json(item))
}

pub async fn delete_shopping_item(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<Json<JsonValue>, ApiError> {
    if !state.store.delete_shopping_item(&id).await? {
        return Err(ApiError::not_found("Shopping list item"));
    }
    Ok(Json(
        serde_json::json!({ "message": "Shopping list item deleted successfully" }),
    ))
}

pub async fn shopping_from_meal_plan(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<Json<JsonValue>, ApiError> {
    let items = state
        .store
        .shopping_items_from_meal_plan(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Recipe or ingredients"))?;
    Ok(Json(serde_json::json!({
        "message": format!("Added {} items to shopping list", items.len()),
        "items": items,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::test_support::*;
    use chrono::TimeZone;
    use hearth_store::Ingredient;
    use std::sync::Arc;

    async fn seed_recipe(state: &GatewayState, name: &str, category: &str) -> Recipe {
        create_recipe(
            State(state.clone()),
            Json(NewRecipe {
                name: name.to_string(),
                category: Some(category.to_string()),
                ingredients: vec![Ingredient {
                    name: "thing".to_string(),
                    quantity: 1.0,
                    unit: None,
                    category: None,
                }],
                instructions: None,
                prep_minutes: None,
                servings: None,
            }),
        )
        .await
        .unwrap()
        .0
    }

    #[tokio::test]
    async fn test_recipe_crud_roundtrip() {
        let (state, _dir) = state_with(Some(Arc::new(EchoRunner)));
        let recipe = seed_recipe(&state, "Soup", "dinner").await;

        let fetched = get_recipe(State(state.clone()), Path(recipe.id.clone()))
            .await
            .unwrap();
        assert_eq!(fetched.0.name, "Soup");

        let filtered = list_recipes(
            State(state.clone()),
            Query(RecipeQuery {
                skip: 0,
                limit: 100,
                category: Some("dinner".to_string()),
            }),
        )
        .await
        .unwrap();
        assert_eq!(filtered.0.len(), 1);

        delete_recipe(State(state.clone()), Path(recipe.id.clone()))
            .await
            .unwrap();
        let err = get_recipe(State(state), Path(recipe.id))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_meal_plan_for_unknown_recipe_is_404() {
        let (state, _dir) = state_with(Some(Arc::new(EchoRunner)));
        let err = create_meal_plan(
            State(state),
            Json(NewMealPlan {
                recipe_id: "ghost".to_string(),
                meal_type: "dinner".to_string(),
                planned_date: Utc::now(),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_generate_weekly_and_shopping_flow() {
        let (state, _dir) = state_with(Some(Arc::new(EchoRunner)));
        seed_recipe(&state, "Oats", "breakfast").await;
        seed_recipe(&state, "Stew", "dinner").await;

        let start = Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap();
        let generated = generate_weekly(
            State(state.clone()),
            Json(WeeklyPlanRequest { start_date: start }),
        )
        .await
        .unwrap();
        assert_eq!(generated.0["plans"].as_array().unwrap().len(), 28);

        let plans = list_meal_plans(
            State(state.clone()),
            Query(MealPlanQuery {
                start_date: None,
                end_date: None,
            }),
        )
        .await
        .unwrap();
        let first_plan_id = plans.0[0].plan.id.clone();

        let added = shopping_from_meal_plan(State(state.clone()), Path(first_plan_id))
            .await
            .unwrap();
        assert_eq!(added.0["items"].as_array().unwrap().len(), 1);

        let items = shopping_list(
            State(state),
            Query(ShoppingQuery {
                include_purchased: false,
            }),
        )
        .await
        .unwrap();
        assert_eq!(items.0.len(), 1);
    }

    #[tokio::test]
    async fn test_shopping_item_lifecycle() {
        let (state, _dir) = state_with(Some(Arc::new(EchoRunner)));
        let item = add_shopping_item(
            State(state.clone()),
            Json(NewShoppingItem {
                name: "butter".to_string(),
                quantity: 2.0,
                unit: Some("pack".to_string()),
                category: None,
            }),
        )
        .await
        .unwrap();

        let updated = update_shopping_item(
            State(state.clone()),
            Path(item.0.id.clone()),
            Json(ShoppingItemPatch {
                is_purchased: Some(true),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        assert!(updated.0.is_purchased);

        delete_shopping_item(State(state.clone()), Path(item.0.id.clone()))
            .await
            .unwrap();
        let err = delete_shopping_item(State(state), Path(item.0.id))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
