//! Row types and create/patch parameter structs
//!
//! Each entity has a full row struct plus a `New*` struct for creation and
//! a `*Patch` struct of optional fields for partial updates (only provided
//! fields are applied).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// A household groups every other entity. A default one is created lazily
/// the first time anything needs it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Household {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub settings: JsonValue,
}

// ── Chores ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chore {
    pub id: String,
    pub household_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub points: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewChore {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub points: i64,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChorePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub frequency: Option<String>,
    pub assigned_to: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub points: Option<i64>,
}

// ── Inventory ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: String,
    pub household_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub quantity: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,
    pub low_stock_threshold: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewInventoryItem {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default = "default_unit")]
    pub unit: Option<String>,
    #[serde(default)]
    pub expiration_date: Option<DateTime<Utc>>,
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: i64,
    #[serde(default)]
    pub barcode: Option<String>,
}

fn default_unit() -> Option<String> {
    Some("pcs".to_string())
}

fn default_low_stock_threshold() -> i64 {
    1
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InventoryPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<i64>,
    pub unit: Option<String>,
    pub expiration_date: Option<DateTime<Utc>>,
    pub low_stock_threshold: Option<i64>,
}

// ── Finance ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub household_id: String,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub transaction_date: DateTime<Utc>,
    pub is_expense: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTransaction {
    pub amount: f64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_is_expense")]
    pub is_expense: bool,
    #[serde(default)]
    pub transaction_date: Option<DateTime<Utc>>,
}

fn default_is_expense() -> bool {
    true
}

/// Aggregate view over all transactions. The category breakdown covers
/// expenses only, with uncategorized amounts grouped under "Other".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinanceSummary {
    pub total_expenses: f64,
    pub total_income: f64,
    pub net_balance: f64,
    pub category_breakdown: HashMap<String, f64>,
}

// ── Recipes & meal plans ────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    #[serde(default = "default_ingredient_quantity")]
    pub quantity: f64,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

fn default_ingredient_quantity() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub household_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub ingredients: Vec<Ingredient>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prep_minutes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servings: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewRecipe {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub prep_minutes: Option<i64>,
    #[serde(default)]
    pub servings: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipePatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub ingredients: Option<Vec<Ingredient>>,
    pub instructions: Option<String>,
    pub prep_minutes: Option<i64>,
    pub servings: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealPlan {
    pub id: String,
    pub household_id: String,
    pub recipe_id: String,
    pub meal_type: String,
    pub planned_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewMealPlan {
    pub recipe_id: String,
    pub meal_type: String,
    pub planned_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MealPlanPatch {
    pub recipe_id: Option<String>,
    pub meal_type: Option<String>,
    pub planned_date: Option<DateTime<Utc>>,
}

/// Meal plan joined with its recipe for list/detail responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealPlanWithRecipe {
    #[serde(flatten)]
    pub plan: MealPlan,
    pub recipe: Option<Recipe>,
}

// ── Shopping list ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingListItem {
    pub id: String,
    pub household_id: String,
    pub name: String,
    pub quantity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub is_purchased: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchased_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added_from_recipe_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewShoppingItem {
    pub name: String,
    #[serde(default = "default_ingredient_quantity")]
    pub quantity: f64,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShoppingItemPatch {
    pub name: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub category: Option<String>,
    pub is_purchased: Option<bool>,
}

// ── Agent task log ──────────────────────────────────────────────

/// One dispatched prompt, recorded by the HTTP boundary around the call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentTask {
    pub id: String,
    pub agent_name: String,
    pub status: String, // running|completed|failed
    pub input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_inventory_item_defaults() {
        let item: NewInventoryItem = serde_json::from_str(r#"{"name":"milk"}"#).unwrap();
        assert_eq!(item.quantity, 0);
        assert_eq!(item.unit.as_deref(), Some("pcs"));
        assert_eq!(item.low_stock_threshold, 1);
    }

    #[test]
    fn test_new_transaction_defaults_to_expense() {
        let tx: NewTransaction = serde_json::from_str(r#"{"amount":12.5}"#).unwrap();
        assert!(tx.is_expense);
        assert!(tx.transaction_date.is_none());
    }

    #[test]
    fn test_ingredient_defaults() {
        let ing: Ingredient = serde_json::from_str(r#"{"name":"flour"}"#).unwrap();
        assert_eq!(ing.quantity, 1.0);
        assert!(ing.unit.is_none());
    }

    #[test]
    fn test_chore_patch_partial() {
        let patch: ChorePatch = serde_json::from_str(r#"{"points":5}"#).unwrap();
        assert_eq!(patch.points, Some(5));
        assert!(patch.name.is_none());
    }

    #[test]
    fn test_meal_plan_with_recipe_flattens() {
        let plan = MealPlan {
            id: "p1".to_string(),
            household_id: "h1".to_string(),
            recipe_id: "r1".to_string(),
            meal_type: "dinner".to_string(),
            planned_date: Utc::now(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(MealPlanWithRecipe { plan, recipe: None }).unwrap();
        assert_eq!(json["id"], "p1");
        assert_eq!(json["meal_type"], "dinner");
        assert!(json["recipe"].is_null());
    }
}
