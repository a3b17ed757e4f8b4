//! Finance endpoints

use axum::Json;
use axum::extract::{Query, State};

use hearth_store::{FinanceSummary, NewTransaction, Transaction};

use crate::chores::Pagination;
use crate::error::ApiError;
use crate::server::GatewayState;

pub async fn list_transactions(
    State(state): State<GatewayState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    Ok(Json(
        state.store.list_transactions(page.skip, page.limit).await?,
    ))
}

pub async fn record_transaction(
    State(state): State<GatewayState>,
    Json(new): Json<NewTransaction>,
) -> Result<Json<Transaction>, ApiError> {
    Ok(Json(state.store.record_transaction(new).await?))
}

pub async fn summary(
    State(state): State<GatewayState>,
) -> Result<Json<FinanceSummary>, ApiError> {
    Ok(Json(state.store.finance_summary().await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::test_support::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_record_and_summarize() {
        let (state, _dir) = state_with(Some(Arc::new(EchoRunner)));

        record_transaction(
            State(state.clone()),
            Json(NewTransaction {
                amount: 45.0,
                category: Some("Groceries".to_string()),
                description: Some("weekly shop".to_string()),
                is_expense: true,
                transaction_date: None,
            }),
        )
        .await
        .unwrap();
        record_transaction(
            State(state.clone()),
            Json(NewTransaction {
                amount: 1500.0,
                category: None,
                description: None,
                is_expense: false,
                transaction_date: None,
            }),
        )
        .await
        .unwrap();

        let summary = summary(State(state.clone())).await.unwrap();
        assert_eq!(summary.0.total_expenses, 45.0);
        assert_eq!(summary.0.total_income, 1500.0);
        assert_eq!(summary.0.net_balance, 1455.0);
        assert_eq!(summary.0.category_breakdown["Groceries"], 45.0);

        let listed = list_transactions(
            State(state),
            Query(Pagination {
                skip: 0,
                limit: 10,
            }),
        )
        .await
        .unwrap();
        assert_eq!(listed.0.len(), 2);
    }
}
