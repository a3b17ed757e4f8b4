//! Axum REST server
//!
//! Holds the shared state (store + optional dispatcher) and wires every
//! `/api/v1` route. The dispatcher slot is optional on purpose: when the
//! LLM backend could not be constructed the rest of the API still runs
//! and agent requests degrade to an `unavailable` reply.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, patch, post, put};
use tower_http::cors::CorsLayer;
use tracing::info;

use hearth_core::HouseholdManager;
use hearth_store::HearthStore;

use crate::{agents, chores, finance, inventory, meals};

/// Shared state for all request handlers
#[derive(Clone)]
pub struct GatewayState {
    pub store: Arc<HearthStore>,
    pub manager: Option<Arc<HouseholdManager>>,
    /// Why the manager is absent, surfaced to agent-request callers.
    pub manager_error: Option<String>,
}

impl GatewayState {
    pub fn new(store: Arc<HearthStore>, manager: Option<Arc<HouseholdManager>>) -> Self {
        Self {
            store,
            manager,
            manager_error: None,
        }
    }

    pub fn with_manager_error(mut self, reason: impl Into<String>) -> Self {
        self.manager_error = Some(reason.into());
        self
    }
}

/// The gateway server
pub struct GatewayServer {
    state: GatewayState,
    bind: SocketAddr,
}

impl GatewayServer {
    pub fn new(bind: SocketAddr, state: GatewayState) -> Self {
        Self { state, bind }
    }

    /// Build the Axum router
    pub fn router(&self) -> Router {
        router(self.state.clone())
    }

    /// Start the server (blocks until shutdown)
    pub async fn run(self) -> anyhow::Result<()> {
        let router = self.router();
        let listener = tokio::net::TcpListener::bind(self.bind).await?;
        info!("Gateway listening on {}", self.bind);

        axum::serve(listener, router).await?;

        Ok(())
    }

    /// Start the server in the background, returning a handle
    pub fn spawn(self) -> tokio::task::JoinHandle<anyhow::Result<()>> {
        tokio::spawn(async move { self.run().await })
    }
}

/// Build the full route table over the given state.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/api/v1/agents/request", post(agents::submit_request))
        .route("/api/v1/agents/status/{task_id}", get(agents::task_status))
        .route("/api/v1/chores", get(chores::list).post(chores::create))
        .route("/api/v1/chores/{id}", patch(chores::update))
        .route("/api/v1/chores/{id}/complete", post(chores::complete))
        .route(
            "/api/v1/inventory",
            get(inventory::list).post(inventory::create),
        )
        .route("/api/v1/inventory/low-stock", get(inventory::low_stock))
        .route("/api/v1/inventory/{id}", patch(inventory::update))
        .route(
            "/api/v1/finance/transactions",
            get(finance::list_transactions).post(finance::record_transaction),
        )
        .route("/api/v1/finance/summary", get(finance::summary))
        .route(
            "/api/v1/meals/recipes",
            get(meals::list_recipes).post(meals::create_recipe),
        )
        .route(
            "/api/v1/meals/recipes/{id}",
            get(meals::get_recipe)
                .put(meals::update_recipe)
                .delete(meals::delete_recipe),
        )
        .route(
            "/api/v1/meals/meal-plans",
            get(meals::list_meal_plans).post(meals::create_meal_plan),
        )
        .route(
            "/api/v1/meals/meal-plans/generate-weekly",
            post(meals::generate_weekly),
        )
        .route(
            "/api/v1/meals/meal-plans/{id}",
            get(meals::get_meal_plan)
                .put(meals::update_meal_plan)
                .delete(meals::delete_meal_plan),
        )
        .route(
            "/api/v1/meals/shopping-list",
            get(meals::shopping_list).post(meals::add_shopping_item),
        )
        .route(
            "/api/v1/meals/shopping-list/from-meal-plan/{id}",
            post(meals::shopping_from_meal_plan),
        )
        .route(
            "/api/v1/meals/shopping-list/{id}",
            put(meals::update_shopping_item).delete(meals::delete_shopping_item),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn root_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "message": "Welcome to the hearth household manager API",
        "status": "running",
    }))
}

async fn health_handler(State(state): State<GatewayState>) -> impl IntoResponse {
    let dispatcher = if state.manager.is_some() {
        "ready"
    } else {
        "unavailable"
    };
    axum::Json(serde_json::json!({
        "status": "healthy",
        "dispatcher": dispatcher,
    }))
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[tokio::test]
    async fn test_router_builds() {
        let (state, _dir) = state_with(Some(std::sync::Arc::new(EchoRunner)));
        let _router = router(state);
    }

    #[tokio::test]
    async fn test_health_reports_dispatcher_state() {
        let (state, _dir) = state_with(None);
        let response = health_handler(State(state)).await.into_response();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }
}
