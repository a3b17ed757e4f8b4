//! Chore endpoints

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;

use hearth_store::{Chore, ChorePatch, NewChore};

use crate::error::ApiError;
use crate::server::GatewayState;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

pub async fn list(
    State(state): State<GatewayState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Chore>>, ApiError> {
    Ok(Json(state.store.list_chores(page.skip, page.limit).await?))
}

pub async fn create(
    State(state): State<GatewayState>,
    Json(new): Json<NewChore>,
) -> Result<Json<Chore>, ApiError> {
    Ok(Json(state.store.create_chore(new).await?))
}

pub async fn update(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    Json(patch): Json<ChorePatch>,
) -> Result<Json<Chore>, ApiError> {
    let chore = state
        .store
        .update_chore(&id, patch)
        .await?
        .ok_or_else(|| ApiError::not_found("Chore"))?;
    Ok(Json(chore))
}

pub async fn complete(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<Json<Chore>, ApiError> {
    let chore = state
        .store
        .complete_chore(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Chore"))?;
    Ok(Json(chore))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::test_support::*;
    use std::sync::Arc;

    fn page() -> Query<Pagination> {
        Query(Pagination {
            skip: 0,
            limit: 100,
        })
    }

    #[tokio::test]
    async fn test_create_list_complete() {
        let (state, _dir) = state_with(Some(Arc::new(EchoRunner)));

        let created = create(
            State(state.clone()),
            Json(NewChore {
                name: "Vacuum".to_string(),
                description: None,
                frequency: Some("weekly".to_string()),
                points: 3,
                due_date: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(created.0.name, "Vacuum");

        let listed = list(State(state.clone()), page()).await.unwrap();
        assert_eq!(listed.0.len(), 1);

        let completed = complete(State(state), Path(created.0.id.clone()))
            .await
            .unwrap();
        assert!(completed.0.completed_at.is_some());
    }

    #[tokio::test]
    async fn test_update_missing_is_404() {
        let (state, _dir) = state_with(Some(Arc::new(EchoRunner)));
        let err = update(
            State(state),
            Path("ghost".to_string()),
            Json(ChorePatch::default()),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_pagination_defaults() {
        let page: Pagination = serde_json::from_str("{}").unwrap();
        assert_eq!(page.skip, 0);
        assert_eq!(page.limit, 100);
    }
}
