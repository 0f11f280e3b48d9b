//! Tracked query handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::{brands::Deleted, ok, validate_request, ApiResponse};
use crate::AppState;
use brandlens_common::{
    errors::{AppError, Result},
    pipeline::{QueryStatus, TrackedQuery},
};

/// Either a custom query text or `generate: true` for a fresh AI-generated set
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CreateQueryRequest {
    #[validate(length(min = 1, max = 500))]
    pub query: Option<String>,
    #[serde(default)]
    pub generate: bool,
}

/// Only the status of a query may change
#[derive(Debug, Deserialize)]
pub struct UpdateQueryRequest {
    pub status: QueryStatus,
}

pub async fn list_queries(
    State(state): State<AppState>,
    Path(brand_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<TrackedQuery>>>> {
    state.repo.find_brand(brand_id).await?;
    let queries = state.repo.list_queries(brand_id).await?;
    Ok(ok(queries))
}

/// Add a custom query to a brand, or generate a new set
pub async fn create_query(
    State(state): State<AppState>,
    Path(brand_id): Path<Uuid>,
    Json(request): Json<CreateQueryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<TrackedQuery>>>)> {
    validate_request(&request)?;
    let brand = state.repo.find_brand(brand_id).await?;

    let custom = request.query.is_some();
    let queries = match request.query {
        Some(text) => state.runner.create_queries(brand_id, &[text], true).await?,
        None if request.generate => state.runner.seed_queries(&state.generator, &brand).await?,
        None => {
            return Err(AppError::MissingField {
                field: "query".to_string(),
            })
        }
    };

    tracing::info!(
        brand_id = %brand_id,
        queries = queries.len(),
        custom,
        "Queries added"
    );
    Ok((StatusCode::CREATED, ok(queries)))
}

pub async fn update_query(
    State(state): State<AppState>,
    Path(query_id): Path<Uuid>,
    Json(request): Json<UpdateQueryRequest>,
) -> Result<Json<ApiResponse<TrackedQuery>>> {
    let query = state.repo.transition_query(query_id, request.status).await?;
    Ok(ok(query))
}

pub async fn delete_query(
    State(state): State<AppState>,
    Path(query_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Deleted>>> {
    state.repo.delete_query(query_id).await?;

    tracing::info!(query_id = %query_id, "Query deleted");
    Ok(ok(Deleted { id: query_id }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_rejects_unknown_status() {
        assert!(serde_json::from_str::<UpdateQueryRequest>(r#"{"status":"done"}"#).is_err());
        let request: UpdateQueryRequest =
            serde_json::from_str(r#"{"status":"processing"}"#).unwrap();
        assert_eq!(request.status, QueryStatus::Processing);
    }

    #[test]
    fn test_create_requires_text() {
        let request = CreateQueryRequest {
            query: Some(String::new()),
            generate: false,
        };
        assert!(validate_request(&request).is_err());

        let request: CreateQueryRequest = serde_json::from_str(r#"{"generate":true}"#).unwrap();
        assert!(request.query.is_none());
        assert!(request.generate);
    }
}
