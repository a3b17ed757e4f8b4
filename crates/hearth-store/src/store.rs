//! SQLite database layer
//!
//! Single `rusqlite::Connection` behind `Arc<Mutex>`; every public method
//! hops through `tokio::task::spawn_blocking` so SQLite's blocking I/O
//! never runs on the async worker threads.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::meal_planner::plan_week;
use crate::types::*;

const DEFAULT_HOUSEHOLD_NAME: &str = "Default Household";

/// SQLite database wrapper (thread-safe via Arc<Mutex>)
pub struct HearthStore {
    conn: Arc<Mutex<Connection>>,
}

fn lock_conn(conn: &Arc<Mutex<Connection>>) -> MutexGuard<'_, Connection> {
    conn.lock().unwrap_or_else(|poisoned| {
        warn!("Database mutex was poisoned, recovering");
        poisoned.into_inner()
    })
}

fn parse_ts(s: String) -> DateTime<Utc> {
    s.parse().unwrap_or_else(|_| Utc::now())
}

fn parse_ts_opt(s: Option<String>) -> Option<DateTime<Utc>> {
    s.and_then(|s| s.parse().ok())
}

impl HearthStore {
    /// Open (or create) the database and initialize the schema.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn =
            Connection::open(path.as_ref()).context("Failed to open SQLite database")?;

        info!("Initializing hearth database at {:?}", path.as_ref());

        conn.execute("PRAGMA foreign_keys = ON", [])?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS households (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                created_at TEXT NOT NULL,
                settings TEXT NOT NULL DEFAULT '{}'
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS chores (
                id TEXT PRIMARY KEY,
                household_id TEXT NOT NULL,
                name TEXT NOT NULL,
                description TEXT,
                frequency TEXT,
                assigned_to TEXT,
                due_date TEXT,
                completed_at TEXT,
                points INTEGER NOT NULL DEFAULT 0,
                FOREIGN KEY(household_id) REFERENCES households(id) ON DELETE CASCADE
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS inventory_items (
                id TEXT PRIMARY KEY,
                household_id TEXT NOT NULL,
                name TEXT NOT NULL,
                category TEXT,
                quantity INTEGER NOT NULL DEFAULT 0,
                unit TEXT,
                expiration_date TEXT,
                low_stock_threshold INTEGER NOT NULL DEFAULT 1,
                barcode TEXT,
                last_updated TEXT NOT NULL,
                FOREIGN KEY(household_id) REFERENCES households(id) ON DELETE CASCADE
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS financial_transactions (
                id TEXT PRIMARY KEY,
                household_id TEXT NOT NULL,
                amount REAL NOT NULL,
                category TEXT,
                description TEXT,
                transaction_date TEXT NOT NULL,
                is_expense INTEGER NOT NULL DEFAULT 1,
                FOREIGN KEY(household_id) REFERENCES households(id) ON DELETE CASCADE
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS recipes (
                id TEXT PRIMARY KEY,
                household_id TEXT NOT NULL,
                name TEXT NOT NULL,
                category TEXT,
                ingredients TEXT NOT NULL DEFAULT '[]',
                instructions TEXT,
                prep_minutes INTEGER,
                servings INTEGER,
                created_at TEXT NOT NULL,
                FOREIGN KEY(household_id) REFERENCES households(id) ON DELETE CASCADE
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS meal_plans (
                id TEXT PRIMARY KEY,
                household_id TEXT NOT NULL,
                recipe_id TEXT NOT NULL,
                meal_type TEXT NOT NULL,
                planned_date TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY(household_id) REFERENCES households(id) ON DELETE CASCADE
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS shopping_list_items (
                id TEXT PRIMARY KEY,
                household_id TEXT NOT NULL,
                name TEXT NOT NULL,
                quantity REAL NOT NULL DEFAULT 1,
                unit TEXT,
                category TEXT,
                is_purchased INTEGER NOT NULL DEFAULT 0,
                purchased_at TEXT,
                added_from_recipe_id TEXT,
                created_at TEXT NOT NULL,
                FOREIGN KEY(household_id) REFERENCES households(id) ON DELETE CASCADE
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS agent_tasks (
                id TEXT PRIMARY KEY,
                agent_name TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'running',
                input TEXT NOT NULL,
                output TEXT,
                created_at TEXT NOT NULL,
                completed_at TEXT,
                error_message TEXT
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_chores_household ON chores(household_id)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_inventory_household ON inventory_items(household_id)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_transactions_date ON financial_transactions(transaction_date)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_recipes_category ON recipes(category)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_meal_plans_date ON meal_plans(planned_date)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_shopping_purchased ON shopping_list_items(is_purchased)",
            [],
        )?;

        debug!("Database schema initialized successfully");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    // ── Households ──────────────────────────────────────────────

    /// Get the default household, creating it on first use.
    pub async fn default_household(&self) -> Result<Household> {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = lock_conn(&conn);
            let id = default_household_id(&conn)?;
            let household = conn.query_row(
                "SELECT id, name, created_at, settings FROM households WHERE id = ?1",
                params![&id],
                household_from_row,
            )?;
            Ok(household)
        })
        .await
        .context("spawn_blocking task panicked")?
    }

    // ── Chores ──────────────────────────────────────────────────

    pub async fn list_chores(&self, skip: i64, limit: i64) -> Result<Vec<Chore>> {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = lock_conn(&conn);
            let mut stmt = conn.prepare(
                "SELECT id, household_id, name, description, frequency, assigned_to,
                        due_date, completed_at, points
                 FROM chores LIMIT ?1 OFFSET ?2",
            )?;
            let chores = stmt
                .query_map(params![limit, skip], chore_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(chores)
        })
        .await
        .context("spawn_blocking task panicked")?
    }

    pub async fn create_chore(&self, new: NewChore) -> Result<Chore> {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = lock_conn(&conn);
            let household_id = default_household_id(&conn)?;
            let chore = Chore {
                id: Uuid::new_v4().to_string(),
                household_id,
                name: new.name,
                description: new.description,
                frequency: new.frequency,
                assigned_to: None,
                due_date: new.due_date,
                completed_at: None,
                points: new.points,
            };
            conn.execute(
                "INSERT INTO chores (id, household_id, name, description, frequency,
                                     assigned_to, due_date, completed_at, points)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    &chore.id,
                    &chore.household_id,
                    &chore.name,
                    &chore.description,
                    &chore.frequency,
                    &chore.assigned_to,
                    chore.due_date.map(|d| d.to_rfc3339()),
                    chore.completed_at.map(|d| d.to_rfc3339()),
                    chore.points,
                ],
            )?;
            debug!("Created chore '{}' ({})", chore.name, chore.id);
            Ok(chore)
        })
        .await
        .context("spawn_blocking task panicked")?
    }

    pub async fn update_chore(&self, id: &str, patch: ChorePatch) -> Result<Option<Chore>> {
        let conn = Arc::clone(&self.conn);
        let id = id.to_owned();
        tokio::task::spawn_blocking(move || {
            let conn = lock_conn(&conn);
            let Some(mut chore) = get_chore(&conn, &id)? else {
                return Ok(None);
            };

            if let Some(name) = patch.name {
                chore.name = name;
            }
            if patch.description.is_some() {
                chore.description = patch.description;
            }
            if patch.frequency.is_some() {
                chore.frequency = patch.frequency;
            }
            if patch.assigned_to.is_some() {
                chore.assigned_to = patch.assigned_to;
            }
            if patch.due_date.is_some() {
                chore.due_date = patch.due_date;
            }
            if patch.completed_at.is_some() {
                chore.completed_at = patch.completed_at;
            }
            if let Some(points) = patch.points {
                chore.points = points;
            }

            write_chore(&conn, &chore)?;
            Ok(Some(chore))
        })
        .await
        .context("spawn_blocking task panicked")?
    }

    /// Stamp a chore as completed now.
    pub async fn complete_chore(&self, id: &str) -> Result<Option<Chore>> {
        let conn = Arc::clone(&self.conn);
        let id = id.to_owned();
        tokio::task::spawn_blocking(move || {
            let conn = lock_conn(&conn);
            let Some(mut chore) = get_chore(&conn, &id)? else {
                return Ok(None);
            };
            chore.completed_at = Some(Utc::now());
            write_chore(&conn, &chore)?;
            debug!("Completed chore {}", chore.id);
            Ok(Some(chore))
        })
        .await
        .context("spawn_blocking task panicked")?
    }

    // ── Inventory ───────────────────────────────────────────────

    pub async fn list_inventory(&self, skip: i64, limit: i64) -> Result<Vec<InventoryItem>> {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = lock_conn(&conn);
            let mut stmt = conn.prepare(
                "SELECT id, household_id, name, category, quantity, unit, expiration_date,
                        low_stock_threshold, barcode, last_updated
                 FROM inventory_items LIMIT ?1 OFFSET ?2",
            )?;
            let items = stmt
                .query_map(params![limit, skip], inventory_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(items)
        })
        .await
        .context("spawn_blocking task panicked")?
    }

    pub async fn add_inventory_item(&self, new: NewInventoryItem) -> Result<InventoryItem> {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = lock_conn(&conn);
            let household_id = default_household_id(&conn)?;
            let item = InventoryItem {
                id: Uuid::new_v4().to_string(),
                household_id,
                name: new.name,
                category: new.category,
                quantity: new.quantity,
                unit: new.unit,
                expiration_date: new.expiration_date,
                low_stock_threshold: new.low_stock_threshold,
                barcode: new.barcode,
                last_updated: Utc::now(),
            };
            conn.execute(
                "INSERT INTO inventory_items (id, household_id, name, category, quantity,
                                              unit, expiration_date, low_stock_threshold,
                                              barcode, last_updated)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    &item.id,
                    &item.household_id,
                    &item.name,
                    &item.category,
                    item.quantity,
                    &item.unit,
                    item.expiration_date.map(|d| d.to_rfc3339()),
                    item.low_stock_threshold,
                    &item.barcode,
                    item.last_updated.to_rfc3339(),
                ],
            )?;
            debug!("Added inventory item '{}' ({})", item.name, item.id);
            Ok(item)
        })
        .await
        .context("spawn_blocking task panicked")?
    }

    pub async fn update_inventory_item(
        &self,
        id: &str,
        patch: InventoryPatch,
    ) -> Result<Option<InventoryItem>> {
        let conn = Arc::clone(&self.conn);
        let id = id.to_owned();
        tokio::task::spawn_blocking(move || {
            let conn = lock_conn(&conn);
            let Some(mut item) = get_inventory_item(&conn, &id)? else {
                return Ok(None);
            };

            if let Some(name) = patch.name {
                item.name = name;
            }
            if patch.category.is_some() {
                item.category = patch.category;
            }
            if let Some(quantity) = patch.quantity {
                item.quantity = quantity;
            }
            if patch.unit.is_some() {
                item.unit = patch.unit;
            }
            if patch.expiration_date.is_some() {
                item.expiration_date = patch.expiration_date;
            }
            if let Some(threshold) = patch.low_stock_threshold {
                item.low_stock_threshold = threshold;
            }
            item.last_updated = Utc::now();

            conn.execute(
                "UPDATE inventory_items
                 SET name = ?2, category = ?3, quantity = ?4, unit = ?5,
                     expiration_date = ?6, low_stock_threshold = ?7, last_updated = ?8
                 WHERE id = ?1",
                params![
                    &item.id,
                    &item.name,
                    &item.category,
                    item.quantity,
                    &item.unit,
                    item.expiration_date.map(|d| d.to_rfc3339()),
                    item.low_stock_threshold,
                    item.last_updated.to_rfc3339(),
                ],
            )?;
            Ok(Some(item))
        })
        .await
        .context("spawn_blocking task panicked")?
    }

    /// Items at or below their low-stock threshold.
    pub async fn low_stock_items(&self) -> Result<Vec<InventoryItem>> {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = lock_conn(&conn);
            let mut stmt = conn.prepare(
                "SELECT id, household_id, name, category, quantity, unit, expiration_date,
                        low_stock_threshold, barcode, last_updated
                 FROM inventory_items WHERE quantity <= low_stock_threshold",
            )?;
            let items = stmt
                .query_map([], inventory_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(items)
        })
        .await
        .context("spawn_blocking task panicked")?
    }

    // ── Finance ─────────────────────────────────────────────────

    pub async fn list_transactions(&self, skip: i64, limit: i64) -> Result<Vec<Transaction>> {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = lock_conn(&conn);
            let mut stmt = conn.prepare(
                "SELECT id, household_id, amount, category, description, transaction_date,
                        is_expense
                 FROM financial_transactions
                 ORDER BY transaction_date DESC LIMIT ?1 OFFSET ?2",
            )?;
            let transactions = stmt
                .query_map(params![limit, skip], transaction_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(transactions)
        })
        .await
        .context("spawn_blocking task panicked")?
    }

    pub async fn record_transaction(&self, new: NewTransaction) -> Result<Transaction> {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = lock_conn(&conn);
            let household_id = default_household_id(&conn)?;
            let tx = Transaction {
                id: Uuid::new_v4().to_string(),
                household_id,
                amount: new.amount,
                category: new.category,
                description: new.description,
                transaction_date: new.transaction_date.unwrap_or_else(Utc::now),
                is_expense: new.is_expense,
            };
            conn.execute(
                "INSERT INTO financial_transactions (id, household_id, amount, category,
                                                     description, transaction_date, is_expense)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    &tx.id,
                    &tx.household_id,
                    tx.amount,
                    &tx.category,
                    &tx.description,
                    tx.transaction_date.to_rfc3339(),
                    tx.is_expense,
                ],
            )?;
            Ok(tx)
        })
        .await
        .context("spawn_blocking task panicked")?
    }

    /// Totals plus an expenses-by-category breakdown ("Other" for
    /// uncategorized).
    pub async fn finance_summary(&self) -> Result<FinanceSummary> {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = lock_conn(&conn);
            let mut stmt = conn.prepare(
                "SELECT id, household_id, amount, category, description, transaction_date,
                        is_expense
                 FROM financial_transactions",
            )?;
            let transactions = stmt
                .query_map([], transaction_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            let mut summary = FinanceSummary {
                total_expenses: 0.0,
                total_income: 0.0,
                net_balance: 0.0,
                category_breakdown: Default::default(),
            };
            for tx in &transactions {
                if tx.is_expense {
                    summary.total_expenses += tx.amount;
                    let category = tx.category.clone().unwrap_or_else(|| "Other".to_string());
                    *summary.category_breakdown.entry(category).or_insert(0.0) += tx.amount;
                } else {
                    summary.total_income += tx.amount;
                }
            }
            summary.net_balance = summary.total_income - summary.total_expenses;
            Ok(summary)
        })
        .await
        .context("spawn_blocking task panicked")?
    }

    // ── Recipes ─────────────────────────────────────────────────

    pub async fn create_recipe(&self, new: NewRecipe) -> Result<Recipe> {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = lock_conn(&conn);
            let household_id = default_household_id(&conn)?;
            let recipe = Recipe {
                id: Uuid::new_v4().to_string(),
                household_id,
                name: new.name,
                category: new.category,
                ingredients: new.ingredients,
                instructions: new.instructions,
                prep_minutes: new.prep_minutes,
                servings: new.servings,
                created_at: Utc::now(),
            };
            write_recipe(&conn, &recipe, true)?;
            debug!("Created recipe '{}' ({})", recipe.name, recipe.id);
            Ok(recipe)
        })
        .await
        .context("spawn_blocking task panicked")?
    }

    pub async fn list_recipes(
        &self,
        category: Option<String>,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Recipe>> {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = lock_conn(&conn);
            let recipes = match category {
                Some(category) => {
                    let mut stmt = conn.prepare(
                        "SELECT id, household_id, name, category, ingredients, instructions,
                                prep_minutes, servings, created_at
                         FROM recipes WHERE category = ?1 LIMIT ?2 OFFSET ?3",
                    )?;
                    stmt.query_map(params![category, limit, skip], recipe_from_row)?
                        .collect::<rusqlite::Result<Vec<_>>>()?
                }
                None => {
                    let mut stmt = conn.prepare(
                        "SELECT id, household_id, name, category, ingredients, instructions,
                                prep_minutes, servings, created_at
                         FROM recipes LIMIT ?1 OFFSET ?2",
                    )?;
                    stmt.query_map(params![limit, skip], recipe_from_row)?
                        .collect::<rusqlite::Result<Vec<_>>>()?
                }
            };
            Ok(recipes)
        })
        .await
        .context("spawn_blocking task panicked")?
    }

    pub async fn get_recipe(&self, id: &str) -> Result<Option<Recipe>> {
        let conn = Arc::clone(&self.conn);
        let id = id.to_owned();
        tokio::task::spawn_blocking(move || {
            let conn = lock_conn(&conn);
            get_recipe(&conn, &id)
        })
        .await
        .context("spawn_blocking task panicked")?
    }

    pub async fn update_recipe(&self, id: &str, patch: RecipePatch) -> Result<Option<Recipe>> {
        let conn = Arc::clone(&self.conn);
        let id = id.to_owned();
        tokio::task::spawn_blocking(move || {
            let conn = lock_conn(&conn);
            let Some(mut recipe) = get_recipe(&conn, &id)? else {
                return Ok(None);
            };

            if let Some(name) = patch.name {
                recipe.name = name;
            }
            if patch.category.is_some() {
                recipe.category = patch.category;
            }
            if let Some(ingredients) = patch.ingredients {
                recipe.ingredients = ingredients;
            }
            if patch.instructions.is_some() {
                recipe.instructions = patch.instructions;
            }
            if patch.prep_minutes.is_some() {
                recipe.prep_minutes = patch.prep_minutes;
            }
            if patch.servings.is_some() {
                recipe.servings = patch.servings;
            }

            write_recipe(&conn, &recipe, false)?;
            Ok(Some(recipe))
        })
        .await
        .context("spawn_blocking task panicked")?
    }

    pub async fn delete_recipe(&self, id: &str) -> Result<bool> {
        let conn = Arc::clone(&self.conn);
        let id = id.to_owned();
        tokio::task::spawn_blocking(move || {
            let conn = lock_conn(&conn);
            let deleted = conn.execute("DELETE FROM recipes WHERE id = ?1", params![&id])?;
            Ok(deleted > 0)
        })
        .await
        .context("spawn_blocking task panicked")?
    }

    // ── Meal plans ──────────────────────────────────────────────

    /// Create a meal plan. Returns `None` when the recipe does not exist.
    pub async fn create_meal_plan(&self, new: NewMealPlan) -> Result<Option<MealPlan>> {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = lock_conn(&conn);
            if get_recipe(&conn, &new.recipe_id)?.is_none() {
                return Ok(None);
            }
            let household_id = default_household_id(&conn)?;
            let plan = MealPlan {
                id: Uuid::new_v4().to_string(),
                household_id,
                recipe_id: new.recipe_id,
                meal_type: new.meal_type,
                planned_date: new.planned_date,
                created_at: Utc::now(),
            };
            write_meal_plan(&conn, &plan)?;
            Ok(Some(plan))
        })
        .await
        .context("spawn_blocking task panicked")?
    }

    /// List meal plans in a date range, joined with their recipes, ordered
    /// by planned date. Plans whose recipe has been deleted are skipped.
    pub async fn list_meal_plans(
        &self,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    ) -> Result<Vec<MealPlanWithRecipe>> {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = lock_conn(&conn);
            let mut stmt = conn.prepare(
                "SELECT id, household_id, recipe_id, meal_type, planned_date, created_at
                 FROM meal_plans
                 WHERE (?1 IS NULL OR planned_date >= ?1)
                   AND (?2 IS NULL OR planned_date <= ?2)
                 ORDER BY planned_date",
            )?;
            let plans = stmt
                .query_map(
                    params![
                        start_date.map(|d| d.to_rfc3339()),
                        end_date.map(|d| d.to_rfc3339()),
                    ],
                    meal_plan_from_row,
                )?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            let mut joined = Vec::with_capacity(plans.len());
            for plan in plans {
                match get_recipe(&conn, &plan.recipe_id)? {
                    Some(recipe) => joined.push(MealPlanWithRecipe {
                        plan,
                        recipe: Some(recipe),
                    }),
                    None => continue,
                }
            }
            Ok(joined)
        })
        .await
        .context("spawn_blocking task panicked")?
    }

    pub async fn get_meal_plan(&self, id: &str) -> Result<Option<MealPlanWithRecipe>> {
        let conn = Arc::clone(&self.conn);
        let id = id.to_owned();
        tokio::task::spawn_blocking(move || {
            let conn = lock_conn(&conn);
            let Some(plan) = get_meal_plan(&conn, &id)? else {
                return Ok(None);
            };
            let recipe = get_recipe(&conn, &plan.recipe_id)?;
            Ok(Some(MealPlanWithRecipe { plan, recipe }))
        })
        .await
        .context("spawn_blocking task panicked")?
    }

    pub async fn update_meal_plan(
        &self,
        id: &str,
        patch: MealPlanPatch,
    ) -> Result<Option<MealPlan>> {
        let conn = Arc::clone(&self.conn);
        let id = id.to_owned();
        tokio::task::spawn_blocking(move || {
            let conn = lock_conn(&conn);
            let Some(mut plan) = get_meal_plan(&conn, &id)? else {
                return Ok(None);
            };

            if let Some(recipe_id) = patch.recipe_id {
                plan.recipe_id = recipe_id;
            }
            if let Some(meal_type) = patch.meal_type {
                plan.meal_type = meal_type;
            }
            if let Some(planned_date) = patch.planned_date {
                plan.planned_date = planned_date;
            }

            conn.execute(
                "UPDATE meal_plans SET recipe_id = ?2, meal_type = ?3, planned_date = ?4
                 WHERE id = ?1",
                params![
                    &plan.id,
                    &plan.recipe_id,
                    &plan.meal_type,
                    plan.planned_date.to_rfc3339(),
                ],
            )?;
            Ok(Some(plan))
        })
        .await
        .context("spawn_blocking task panicked")?
    }

    pub async fn delete_meal_plan(&self, id: &str) -> Result<bool> {
        let conn = Arc::clone(&self.conn);
        let id = id.to_owned();
        tokio::task::spawn_blocking(move || {
            let conn = lock_conn(&conn);
            let deleted = conn.execute("DELETE FROM meal_plans WHERE id = ?1", params![&id])?;
            Ok(deleted > 0)
        })
        .await
        .context("spawn_blocking task panicked")?
    }

    /// Generate and persist a week of meal plans starting at `start_date`.
    pub async fn generate_weekly_plan(
        &self,
        start_date: DateTime<Utc>,
    ) -> Result<Vec<MealPlan>> {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = lock_conn(&conn);
            let household_id = default_household_id(&conn)?;

            let mut stmt = conn.prepare(
                "SELECT id, household_id, name, category, ingredients, instructions,
                        prep_minutes, servings, created_at
                 FROM recipes",
            )?;
            let recipes = stmt
                .query_map([], recipe_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            drop(stmt);

            let planned = plan_week(&recipes, start_date);
            let mut created = Vec::with_capacity(planned.len());
            for meal in planned {
                let plan = MealPlan {
                    id: Uuid::new_v4().to_string(),
                    household_id: household_id.clone(),
                    recipe_id: meal.recipe_id,
                    meal_type: meal.meal_type,
                    planned_date: meal.planned_date,
                    created_at: Utc::now(),
                };
                write_meal_plan(&conn, &plan)?;
                created.push(plan);
            }
            info!("Generated {} meal plans", created.len());
            Ok(created)
        })
        .await
        .context("spawn_blocking task panicked")?
    }

    // ── Shopping list ───────────────────────────────────────────

    pub async fn list_shopping_items(
        &self,
        include_purchased: bool,
    ) -> Result<Vec<ShoppingListItem>> {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = lock_conn(&conn);
            let mut stmt = conn.prepare(
                "SELECT id, household_id, name, quantity, unit, category, is_purchased,
                        purchased_at, added_from_recipe_id, created_at
                 FROM shopping_list_items
                 WHERE (?1 OR is_purchased = 0)
                 ORDER BY created_at DESC",
            )?;
            let items = stmt
                .query_map(params![include_purchased], shopping_item_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(items)
        })
        .await
        .context("spawn_blocking task panicked")?
    }

    pub async fn add_shopping_item(&self, new: NewShoppingItem) -> Result<ShoppingListItem> {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = lock_conn(&conn);
            let household_id = default_household_id(&conn)?;
            let item = ShoppingListItem {
                id: Uuid::new_v4().to_string(),
                household_id,
                name: new.name,
                quantity: new.quantity,
                unit: new.unit,
                category: new.category,
                is_purchased: false,
                purchased_at: None,
                added_from_recipe_id: None,
                created_at: Utc::now(),
            };
            write_shopping_item(&conn, &item, true)?;
            Ok(item)
        })
        .await
        .context("spawn_blocking task panicked")?
    }

    pub async fn update_shopping_item(
        &self,
        id: &str,
        patch: ShoppingItemPatch,
    ) -> Result<Option<ShoppingListItem>> {
        let conn = Arc::clone(&self.conn);
        let id = id.to_owned();
        tokio::task::spawn_blocking(move || {
            let conn = lock_conn(&conn);
            let Some(mut item) = get_shopping_item(&conn, &id)? else {
                return Ok(None);
            };

            if let Some(name) = patch.name {
                item.name = name;
            }
            if let Some(quantity) = patch.quantity {
                item.quantity = quantity;
            }
            if patch.unit.is_some() {
                item.unit = patch.unit;
            }
            if patch.category.is_some() {
                item.category = patch.category;
            }
            if let Some(is_purchased) = patch.is_purchased {
                item.is_purchased = is_purchased;
                // stamp purchase time on the first transition only
                if is_purchased && item.purchased_at.is_none() {
                    item.purchased_at = Some(Utc::now());
                }
            }

            write_shopping_item(&conn, &item, false)?;
            Ok(Some(item))
        })
        .await
        .context("spawn_blocking task panicked")?
    }

    pub async fn delete_shopping_item(&self, id: &str) -> Result<bool> {
        let conn = Arc::clone(&self.conn);
        let id = id.to_owned();
        tokio::task::spawn_blocking(move || {
            let conn = lock_conn(&conn);
            let deleted =
                conn.execute("DELETE FROM shopping_list_items WHERE id = ?1", params![&id])?;
            Ok(deleted > 0)
        })
        .await
        .context("spawn_blocking task panicked")?
    }

    /// Add one shopping item per ingredient of a meal plan's recipe.
    /// Returns `None` when the plan or its recipe is missing, or the
    /// recipe has no ingredients.
    pub async fn shopping_items_from_meal_plan(
        &self,
        meal_plan_id: &str,
    ) -> Result<Option<Vec<ShoppingListItem>>> {
        let conn = Arc::clone(&self.conn);
        let meal_plan_id = meal_plan_id.to_owned();
        tokio::task::spawn_blocking(move || {
            let conn = lock_conn(&conn);
            let Some(plan) = get_meal_plan(&conn, &meal_plan_id)? else {
                return Ok(None);
            };
            let Some(recipe) = get_recipe(&conn, &plan.recipe_id)? else {
                return Ok(None);
            };
            if recipe.ingredients.is_empty() {
                return Ok(None);
            }

            let household_id = default_household_id(&conn)?;
            let mut created = Vec::with_capacity(recipe.ingredients.len());
            for ingredient in &recipe.ingredients {
                let item = ShoppingListItem {
                    id: Uuid::new_v4().to_string(),
                    household_id: household_id.clone(),
                    name: ingredient.name.clone(),
                    quantity: ingredient.quantity,
                    unit: ingredient.unit.clone(),
                    category: Some(
                        ingredient
                            .category
                            .clone()
                            .unwrap_or_else(|| "Other".to_string()),
                    ),
                    is_purchased: false,
                    purchased_at: None,
                    added_from_recipe_id: Some(recipe.id.clone()),
                    created_at: Utc::now(),
                };
                write_shopping_item(&conn, &item, true)?;
                created.push(item);
            }
            debug!(
                "Added {} shopping items from meal plan {}",
                created.len(),
                meal_plan_id
            );
            Ok(Some(created))
        })
        .await
        .context("spawn_blocking task panicked")?
    }

    // ── Agent task log ──────────────────────────────────────────

    pub async fn create_agent_task(&self, agent_name: &str, input: &str) -> Result<AgentTask> {
        let conn = Arc::clone(&self.conn);
        let agent_name = agent_name.to_owned();
        let input = input.to_owned();
        tokio::task::spawn_blocking(move || {
            let conn = lock_conn(&conn);
            let task = AgentTask {
                id: Uuid::new_v4().to_string(),
                agent_name,
                status: "running".to_string(),
                input,
                output: None,
                created_at: Utc::now(),
                completed_at: None,
                error_message: None,
            };
            conn.execute(
                "INSERT INTO agent_tasks (id, agent_name, status, input, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    &task.id,
                    &task.agent_name,
                    &task.status,
                    &task.input,
                    task.created_at.to_rfc3339(),
                ],
            )?;
            Ok(task)
        })
        .await
        .context("spawn_blocking task panicked")?
    }

    /// Close out a task: `completed` with output, or `failed` with an
    /// error message.
    pub async fn finish_agent_task(
        &self,
        id: &str,
        output: Option<String>,
        error_message: Option<String>,
    ) -> Result<()> {
        let conn = Arc::clone(&self.conn);
        let id = id.to_owned();
        tokio::task::spawn_blocking(move || {
            let conn = lock_conn(&conn);
            let status = if error_message.is_none() {
                "completed"
            } else {
                "failed"
            };
            conn.execute(
                "UPDATE agent_tasks
                 SET status = ?2, output = ?3, error_message = ?4, completed_at = ?5
                 WHERE id = ?1",
                params![&id, status, output, error_message, Utc::now().to_rfc3339()],
            )?;
            Ok(())
        })
        .await
        .context("spawn_blocking task panicked")?
    }

    pub async fn list_agent_tasks(&self, limit: i64) -> Result<Vec<AgentTask>> {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = lock_conn(&conn);
            let mut stmt = conn.prepare(
                "SELECT id, agent_name, status, input, output, created_at, completed_at,
                        error_message
                 FROM agent_tasks ORDER BY created_at DESC LIMIT ?1",
            )?;
            let tasks = stmt
                .query_map(params![limit], agent_task_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(tasks)
        })
        .await
        .context("spawn_blocking task panicked")?
    }

    pub async fn get_agent_task(&self, id: &str) -> Result<Option<AgentTask>> {
        let conn = Arc::clone(&self.conn);
        let id = id.to_owned();
        tokio::task::spawn_blocking(move || {
            let conn = lock_conn(&conn);
            let task = conn
                .query_row(
                    "SELECT id, agent_name, status, input, output, created_at, completed_at,
                            error_message
                     FROM agent_tasks WHERE id = ?1",
                    params![&id],
                    agent_task_from_row,
                )
                .optional()?;
            Ok(task)
        })
        .await
        .context("spawn_blocking task panicked")?
    }
}

// ── Row helpers (run inside the blocking closures) ──────────────

fn default_household_id(conn: &Connection) -> Result<String> {
    let existing: Option<String> = conn
        .query_row("SELECT id FROM households LIMIT 1", [], |row| row.get(0))
        .optional()?;
    if let Some(id) = existing {
        return Ok(id);
    }

    let id = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO households (id, name, created_at, settings) VALUES (?1, ?2, ?3, '{}')",
        params![&id, DEFAULT_HOUSEHOLD_NAME, Utc::now().to_rfc3339()],
    )?;
    debug!("Created default household ({})", id);
    Ok(id)
}

fn household_from_row(row: &Row<'_>) -> rusqlite::Result<Household> {
    let settings: String = row.get(3)?;
    Ok(Household {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: parse_ts(row.get(2)?),
        settings: serde_json::from_str(&settings).unwrap_or_default(),
    })
}

fn chore_from_row(row: &Row<'_>) -> rusqlite::Result<Chore> {
    Ok(Chore {
        id: row.get(0)?,
        household_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        frequency: row.get(4)?,
        assigned_to: row.get(5)?,
        due_date: parse_ts_opt(row.get(6)?),
        completed_at: parse_ts_opt(row.get(7)?),
        points: row.get(8)?,
    })
}

fn get_chore(conn: &Connection, id: &str) -> Result<Option<Chore>> {
    let chore = conn
        .query_row(
            "SELECT id, household_id, name, description, frequency, assigned_to,
                    due_date, completed_at, points
             FROM chores WHERE id = ?1",
            params![id],
            chore_from_row,
        )
        .optional()?;
    Ok(chore)
}

fn write_chore(conn: &Connection, chore: &Chore) -> Result<()> {
    conn.execute(
        "UPDATE chores
         SET name = ?2, description = ?3, frequency = ?4, assigned_to = ?5,
             due_date = ?6, completed_at = ?7, points = ?8
         WHERE id = ?1",
        params![
            &chore.id,
            &chore.name,
            &chore.description,
            &chore.frequency,
            &chore.assigned_to,
            chore.due_date.map(|d| d.to_rfc3339()),
            chore.completed_at.map(|d| d.to_rfc3339()),
            chore.points,
        ],
    )?;
    Ok(())
}

fn inventory_from_row(row: &Row<'_>) -> rusqlite::Result<InventoryItem> {
    Ok(InventoryItem {
        id: row.get(0)?,
        household_id: row.get(1)?,
        name: row.get(2)?,
        category: row.get(3)?,
        quantity: row.get(4)?,
        unit: row.get(5)?,
        expiration_date: parse_ts_opt(row.get(6)?),
        low_stock_threshold: row.get(7)?,
        barcode: row.get(8)?,
        last_updated: parse_ts(row.get(9)?),
    })
}

fn get_inventory_item(conn: &Connection, id: &str) -> Result<Option<InventoryItem>> {
    let item = conn
        .query_row(
            "SELECT id, household_id, name, category, quantity, unit, expiration_date,
                    low_stock_threshold, barcode, last_updated
             FROM inventory_items WHERE id = ?1",
            params![id],
            inventory_from_row,
        )
        .optional()?;
    Ok(item)
}

fn transaction_from_row(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: row.get(0)?,
        household_id: row.get(1)?,
        amount: row.get(2)?,
        category: row.get(3)?,
        description: row.get(4)?,
        transaction_date: parse_ts(row.get(5)?),
        is_expense: row.get(6)?,
    })
}

fn recipe_from_row(row: &Row<'_>) -> rusqlite::Result<Recipe> {
    let ingredients: String = row.get(4)?;
    Ok(Recipe {
        id: row.get(0)?,
        household_id: row.get(1)?,
        name: row.get(2)?,
        category: row.get(3)?,
        ingredients: serde_json::from_str(&ingredients).unwrap_or_default(),
        instructions: row.get(5)?,
        prep_minutes: row.get(6)?,
        servings: row.get(7)?,
        created_at: parse_ts(row.get(8)?),
    })
}

fn get_recipe(conn: &Connection, id: &str) -> Result<Option<Recipe>> {
    let recipe = conn
        .query_row(
            "SELECT id, household_id, name, category, ingredients, instructions,
                    prep_minutes, servings, created_at
             FROM recipes WHERE id = ?1",
            params![id],
            recipe_from_row,
        )
        .optional()?;
    Ok(recipe)
}

fn write_recipe(conn: &Connection, recipe: &Recipe, insert: bool) -> Result<()> {
    let ingredients = serde_json::to_string(&recipe.ingredients)?;
    if insert {
        conn.execute(
            "INSERT INTO recipes (id, household_id, name, category, ingredients,
                                  instructions, prep_minutes, servings, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                &recipe.id,
                &recipe.household_id,
                &recipe.name,
                &recipe.category,
                ingredients,
                &recipe.instructions,
                recipe.prep_minutes,
                recipe.servings,
                recipe.created_at.to_rfc3339(),
            ],
        )?;
    } else {
        conn.execute(
            "UPDATE recipes
             SET name = ?2, category = ?3, ingredients = ?4, instructions = ?5,
                 prep_minutes = ?6, servings = ?7
             WHERE id = ?1",
            params![
                &recipe.id,
                &recipe.name,
                &recipe.category,
                ingredients,
                &recipe.instructions,
                recipe.prep_minutes,
                recipe.servings,
            ],
        )?;
    }
    Ok(())
}

fn meal_plan_from_row(row: &Row<'_>) -> rusqlite::Result<MealPlan> {
    Ok(MealPlan {
        id: row.get(0)?,
        household_id: row.get(1)?,
        recipe_id: row.get(2)?,
        meal_type: row.get(3)?,
        planned_date: parse_ts(row.get(4)?),
        created_at: parse_ts(row.get(5)?),
    })
}

fn get_meal_plan(conn: &Connection, id: &str) -> Result<Option<MealPlan>> {
    let plan = conn
        .query_row(
            "SELECT id, household_id, recipe_id, meal_type, planned_date, created_at
             FROM meal_plans WHERE id = ?1",
            params![id],
            meal_plan_from_row,
        )
        .optional()?;
    Ok(plan)
}

fn write_meal_plan(conn: &Connection, plan: &MealPlan) -> Result<()> {
    conn.execute(
        "INSERT INTO meal_plans (id, household_id, recipe_id, meal_type, planned_date,
                                 created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            &plan.id,
            &plan.household_id,
            &plan.recipe_id,
            &plan.meal_type,
            plan.planned_date.to_rfc3339(),
            plan.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

fn shopping_item_from_row(row: &Row<'_>) -> rusqlite::Result<ShoppingListItem> {
    Ok(ShoppingListItem {
        id: row.get(0)?,
        household_id: row.get(1)?,
        name: row.get(2)?,
        quantity: row.get(3)?,
        unit: row.get(4)?,
        category: row.get(5)?,
        is_purchased: row.get(6)?,
        purchased_at: parse_ts_opt(row.get(7)?),
        added_from_recipe_id: row.get(8)?,
        created_at: parse_ts(row.get(9)?),
    })
}

fn get_shopping_item(conn: &Connection, id: &str) -> Result<Option<ShoppingListItem>> {
    let item = conn
        .query_row(
            "SELECT id, household_id, name, quantity, unit, category, is_purchased,
                    purchased_at, added_from_recipe_id, created_at
             FROM shopping_list_items WHERE id = ?1",
            params![id],
            shopping_item_from_row,
        )
        .optional()?;
    Ok(item)
}

fn write_shopping_item(conn: &Connection, item: &ShoppingListItem, insert: bool) -> Result<()> {
    if insert {
        conn.execute(
            "INSERT INTO shopping_list_items (id, household_id, name, quantity, unit,
                                              category, is_purchased, purchased_at,
                                              added_from_recipe_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                &item.id,
                &item.household_id,
                &item.name,
                item.quantity,
                &item.unit,
                &item.category,
                item.is_purchased,
                item.purchased_at.map(|d| d.to_rfc3339()),
                &item.added_from_recipe_id,
                item.created_at.to_rfc3339(),
            ],
        )?;
    } else {
        conn.execute(
            "UPDATE shopping_list_items
             SET name = ?2, quantity = ?3, unit = ?4, category = ?5, is_purchased = ?6,
                 purchased_at = ?7
             WHERE id = ?1",
            params![
                &item.id,
                &item.name,
                item.quantity,
                &item.unit,
                &item.category,
                item.is_purchased,
                item.purchased_at.map(|d| d.to_rfc3339()),
            ],
        )?;
    }
    Ok(())
}

fn agent_task_from_row(row: &Row<'_>) -> rusqlite::Result<AgentTask> {
    Ok(AgentTask {
        id: row.get(0)?,
        agent_name: row.get(1)?,
        status: row.get(2)?,
        input: row.get(3)?,
        output: row.get(4)?,
        created_at: parse_ts(row.get(5)?),
        completed_at: parse_ts_opt(row.get(6)?),
        error_message: row.get(7)?,
    })
}
