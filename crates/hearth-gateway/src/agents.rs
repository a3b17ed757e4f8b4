//! Agent dispatch endpoints
//!
//! `POST /api/v1/agents/request` hands the prompt to the household
//! manager and returns its envelope verbatim. The task log is written
//! here, at the boundary, so dispatch itself stays persistence-free.

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::warn;

use hearth_core::{ResponseStatus, classify};
use hearth_store::AgentTask;

use crate::error::ApiError;
use crate::server::GatewayState;

#[derive(Debug, Clone, Deserialize)]
pub struct AgentRequest {
    pub prompt: String,
    /// Accepted for forward compatibility; not consumed by dispatch yet.
    #[serde(default)]
    pub context: JsonValue,
}

pub async fn submit_request(
    State(state): State<GatewayState>,
    Json(request): Json<AgentRequest>,
) -> Result<Response, ApiError> {
    if request.prompt.is_empty() {
        return Err(ApiError::BadRequest(
            "Missing or empty 'prompt' field".to_string(),
        ));
    }

    let Some(manager) = &state.manager else {
        let message = state
            .manager_error
            .clone()
            .unwrap_or_else(|| "agent dispatcher is not available".to_string());
        return Ok(Json(serde_json::json!({
            "status": ResponseStatus::Unavailable,
            "message": message,
        }))
        .into_response());
    };

    // Record the dispatch; log failures but never block the request on them.
    let task = state
        .store
        .create_agent_task(classify(&request.prompt).agent_label(), &request.prompt)
        .await
        .map_err(|e| warn!("Failed to record agent task: {}", e))
        .ok();

    let envelope = manager.process_request(&request.prompt).await;

    if let Some(task) = &task {
        let (output, error_message) = match envelope.status {
            ResponseStatus::Success => (
                envelope.results.first().map(|r| r.output.clone()),
                None,
            ),
            _ => (None, envelope.results.first().map(|r| r.output.clone())),
        };
        if let Err(e) = state
            .store
            .finish_agent_task(&task.id, output, error_message)
            .await
        {
            warn!("Failed to close agent task {}: {}", task.id, e);
        }
    }

    Ok(Json(envelope).into_response())
}

pub async fn task_status(
    State(state): State<GatewayState>,
    Path(task_id): Path<String>,
) -> Result<Json<AgentTask>, ApiError> {
    let task = state
        .store
        .get_agent_task(&task_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Task"))?;
    Ok(Json(task))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::test_support::*;
    use axum::body::to_bytes;
    use std::sync::Arc;

    async fn body_json(response: Response) -> JsonValue {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn request(prompt: &str) -> AgentRequest {
        AgentRequest {
            prompt: prompt.to_string(),
            context: JsonValue::Null,
        }
    }

    #[tokio::test]
    async fn test_submit_returns_envelope_verbatim() {
        let (state, _dir) = state_with(Some(Arc::new(EchoRunner)));
        let response = submit_request(State(state), Json(request("explain compost")))
            .await
            .unwrap();
        let json = body_json(response).await;

        assert_eq!(json["status"], "success");
        assert_eq!(json["results"][0]["agent"], "knowledge");
        assert_eq!(json["messages"][0]["content"], "echo: explain compost");
    }

    #[tokio::test]
    async fn test_submit_degrades_on_backend_failure() {
        let (state, _dir) = state_with(Some(Arc::new(FailingRunner)));
        let response = submit_request(State(state), Json(request("plan my week")))
            .await
            .unwrap();
        let json = body_json(response).await;

        assert_eq!(json["status"], "partial_success");
        assert_eq!(json["results"][0]["agent"], "ManagerAgent");
    }

    #[tokio::test]
    async fn test_submit_unavailable_without_manager() {
        let (state, _dir) = state_with(None);
        let response = submit_request(State(state), Json(request("anything")))
            .await
            .unwrap();
        let json = body_json(response).await;

        assert_eq!(json["status"], "unavailable");
        assert!(
            json["message"]
                .as_str()
                .unwrap()
                .contains("not configured")
        );
    }

    #[tokio::test]
    async fn test_submit_rejects_empty_prompt() {
        let (state, _dir) = state_with(Some(Arc::new(EchoRunner)));
        let err = submit_request(State(state), Json(request("")))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_dispatch_is_recorded_in_task_log() {
        let (state, _dir) = state_with(Some(Arc::new(EchoRunner)));
        submit_request(State(state.clone()), Json(request("stock the pantry")))
            .await
            .unwrap();

        let tasks = state.store.list_agent_tasks(10).await.unwrap();
        assert_eq!(tasks.len(), 1);
        // labeled with the house display name, closed out as completed
        assert_eq!(tasks[0].agent_name, "ChoreCoordinatorAgent");
        assert_eq!(tasks[0].status, "completed");
        assert_eq!(tasks[0].output.as_deref(), Some("echo: stock the pantry"));

        let fetched = task_status(State(state), Path(tasks[0].id.clone()))
            .await
            .unwrap();
        assert_eq!(fetched.0.id, tasks[0].id);
    }

    #[tokio::test]
    async fn test_failed_dispatch_records_error() {
        let (state, _dir) = state_with(Some(Arc::new(FailingRunner)));
        submit_request(State(state.clone()), Json(request("budget check")))
            .await
            .unwrap();

        let tasks = state.store.list_agent_tasks(10).await.unwrap();
        assert_eq!(tasks[0].status, "failed");
        assert!(
            tasks[0]
                .error_message
                .as_deref()
                .unwrap()
                .contains("backend offline")
        );
    }

    #[tokio::test]
    async fn test_task_status_missing_is_404() {
        let (state, _dir) = state_with(Some(Arc::new(EchoRunner)));
        let err = task_status(State(state), Path("ghost".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
