//! Weekly meal-plan generation
//!
//! Round-robin selection over the recipe pool: seven days, four meal slots
//! per day, preferring recipes whose category matches the slot and
//! avoiding repeats per meal type until the pool is exhausted.

use chrono::{DateTime, Duration, Timelike, Utc};
use std::collections::{HashMap, HashSet};

use crate::types::Recipe;

/// Meal slots in serving order.
pub const MEAL_TYPES: &[&str] = &["breakfast", "lunch", "snack", "dinner"];

/// A slot filled by the planner, ready to persist as a meal plan row.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedMeal {
    pub recipe_id: String,
    pub meal_type: String,
    pub planned_date: DateTime<Utc>,
}

fn serving_hour(meal_type: &str) -> u32 {
    match meal_type {
        "breakfast" => 8,
        "lunch" => 12,
        "snack" => 15,
        _ => 18,
    }
}

/// Plan seven days of meals starting at `start`.
///
/// For each slot: candidates are the recipes whose category matches the
/// meal type, falling back to the whole pool when that category is empty.
/// Recipes already used for this meal type are skipped; once every
/// candidate has been used the used-set resets so variety wraps around.
/// Selection is `day % candidates` rather than random so plans are
/// reproducible. An empty recipe pool yields an empty plan.
pub fn plan_week(recipes: &[Recipe], start: DateTime<Utc>) -> Vec<PlannedMeal> {
    let mut by_category: HashMap<&str, Vec<&Recipe>> = HashMap::new();
    for meal_type in MEAL_TYPES {
        by_category.insert(
            meal_type,
            recipes
                .iter()
                .filter(|r| r.category.as_deref() == Some(*meal_type))
                .collect(),
        );
    }

    let all_recipes: Vec<&Recipe> = recipes.iter().collect();
    let mut used: HashMap<&str, HashSet<String>> =
        MEAL_TYPES.iter().map(|mt| (*mt, HashSet::new())).collect();
    let mut planned = Vec::new();

    for day in 0..7i64 {
        let current_date = start + Duration::days(day);

        for meal_type in MEAL_TYPES {
            let candidates = match by_category.get(meal_type) {
                Some(list) if !list.is_empty() => list,
                _ => &all_recipes,
            };

            let used_set = used.get_mut(meal_type).expect("meal type preseeded");
            let mut unused: Vec<&&Recipe> = candidates
                .iter()
                .filter(|r| !used_set.contains(&r.id))
                .collect();

            if unused.is_empty() {
                used_set.clear();
                unused = candidates.iter().collect();
            }
            if unused.is_empty() {
                continue;
            }

            let recipe = unused[day as usize % unused.len()];
            used_set.insert(recipe.id.clone());

            let planned_date = current_date
                .with_hour(serving_hour(meal_type))
                .and_then(|d| d.with_minute(0))
                .and_then(|d| d.with_second(0))
                .and_then(|d| d.with_nanosecond(0))
                .expect("valid serving hour");

            planned.push(PlannedMeal {
                recipe_id: recipe.id.clone(),
                meal_type: meal_type.to_string(),
                planned_date,
            });
        }
    }

    planned
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn recipe(id: &str, category: Option<&str>) -> Recipe {
        Recipe {
            id: id.to_string(),
            household_id: "h1".to_string(),
            name: format!("recipe {id}"),
            category: category.map(String::from),
            ingredients: Vec::new(),
            instructions: None,
            prep_minutes: None,
            servings: None,
            created_at: Utc::now(),
        }
    }

    fn monday() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_pool_yields_empty_plan() {
        assert!(plan_week(&[], monday()).is_empty());
    }

    #[test]
    fn test_full_week_fills_every_slot() {
        let recipes = vec![
            recipe("b1", Some("breakfast")),
            recipe("l1", Some("lunch")),
            recipe("s1", Some("snack")),
            recipe("d1", Some("dinner")),
        ];
        let planned = plan_week(&recipes, monday());
        // 7 days x 4 meal types
        assert_eq!(planned.len(), 28);
    }

    #[test]
    fn test_category_match_preferred() {
        let recipes = vec![
            recipe("b1", Some("breakfast")),
            recipe("d1", Some("dinner")),
        ];
        let planned = plan_week(&recipes, monday());
        for meal in planned.iter().filter(|m| m.meal_type == "breakfast") {
            assert_eq!(meal.recipe_id, "b1");
        }
        for meal in planned.iter().filter(|m| m.meal_type == "dinner") {
            assert_eq!(meal.recipe_id, "d1");
        }
    }

    #[test]
    fn test_uncategorized_pool_used_as_fallback() {
        let recipes = vec![recipe("any1", None), recipe("any2", None)];
        let planned = plan_week(&recipes, monday());
        assert_eq!(planned.len(), 28);
        assert!(planned.iter().all(|m| m.recipe_id.starts_with("any")));
    }

    #[test]
    fn test_avoids_repeats_until_exhausted() {
        let recipes = vec![
            recipe("d1", Some("dinner")),
            recipe("d2", Some("dinner")),
            recipe("d3", Some("dinner")),
        ];
        let planned = plan_week(&recipes, monday());
        let dinners: Vec<&str> = planned
            .iter()
            .filter(|m| m.meal_type == "dinner")
            .map(|m| m.recipe_id.as_str())
            .collect();

        assert_eq!(dinners.len(), 7);
        // first three days must all differ (pool not yet exhausted)
        let first_three: HashSet<&str> = dinners[..3].iter().copied().collect();
        assert_eq!(first_three.len(), 3);
        // across the week every recipe gets used
        let all: HashSet<&str> = dinners.iter().copied().collect();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_serving_hours() {
        let recipes = vec![recipe("r1", None)];
        let planned = plan_week(&recipes, monday());

        for meal in &planned {
            let expected = match meal.meal_type.as_str() {
                "breakfast" => 8,
                "lunch" => 12,
                "snack" => 15,
                "dinner" => 18,
                other => panic!("unexpected meal type {other}"),
            };
            assert_eq!(meal.planned_date.hour(), expected);
            assert_eq!(meal.planned_date.minute(), 0);
        }
    }

    #[test]
    fn test_dates_advance_daily() {
        let recipes = vec![recipe("r1", None)];
        let planned = plan_week(&recipes, monday());
        let breakfasts: Vec<_> = planned
            .iter()
            .filter(|m| m.meal_type == "breakfast")
            .collect();
        assert_eq!(breakfasts.len(), 7);
        for (i, meal) in breakfasts.iter().enumerate() {
            assert_eq!(
                meal.planned_date.date_naive(),
                (monday() + Duration::days(i as i64)).date_naive()
            );
        }
    }
}
