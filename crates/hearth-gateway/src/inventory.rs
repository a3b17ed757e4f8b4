//! Inventory endpoints

use axum::Json;
use axum::extract::{Path, Query, State};

use hearth_store::{InventoryItem, InventoryPatch, NewInventoryItem};

use crate::chores::Pagination;
use crate::error::ApiError;
use crate::server::GatewayState;

pub async fn list(
    State(state): State<GatewayState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<InventoryItem>>, ApiError> {
    Ok(Json(
        state.store.list_inventory(page.skip, page.limit).await?,
    ))
}

pub async fn create(
    State(state): State<GatewayState>,
    Json(new): Json<NewInventoryItem>,
) -> Result<Json<InventoryItem>, ApiError> {
    Ok(Json(state.store.add_inventory_item(new).await?))
}

pub async fn update(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    Json(patch): Json<InventoryPatch>,
) -> Result<Json<InventoryItem>, ApiError> {
    let item = state
        .store
        .update_inventory_item(&id, patch)
        .await?
        .ok_or_else(|| ApiError::not_found("Item"))?;
    Ok(Json(item))
}

pub async fn low_stock(
    State(state): State<GatewayState>,
) -> Result<Json<Vec<InventoryItem>>, ApiError> {
    Ok(Json(state.store.low_stock_items().await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::test_support::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_create_and_low_stock() {
        let (state, _dir) = state_with(Some(Arc::new(EchoRunner)));

        let item = create(
            State(state.clone()),
            Json(NewInventoryItem {
                name: "milk".to_string(),
                category: Some("dairy".to_string()),
                quantity: 0,
                unit: Some("l".to_string()),
                expiration_date: None,
                low_stock_threshold: 1,
                barcode: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(item.0.quantity, 0);

        let low = low_stock(State(state.clone())).await.unwrap();
        assert_eq!(low.0.len(), 1);

        // restock above the threshold and it drops out
        update(
            State(state.clone()),
            Path(item.0.id.clone()),
            Json(InventoryPatch {
                quantity: Some(4),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        let low = low_stock(State(state)).await.unwrap();
        assert!(low.0.is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_is_404() {
        let (state, _dir) = state_with(Some(Arc::new(EchoRunner)));
        let err = update(
            State(state),
            Path("ghost".to_string()),
            Json(InventoryPatch::default()),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
