//! Analysis run handler

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use super::{ok, ApiResponse};
use crate::AppState;
use brandlens_common::{
    errors::{AppError, Result},
    pipeline::BatchReport,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    /// Analyze only this query; otherwise every pending or failed query
    pub query_id: Option<Uuid>,
}

/// Run analysis for a brand's queries, one at a time
pub async fn analyze_brand(
    State(state): State<AppState>,
    Path(brand_id): Path<Uuid>,
    body: Option<Json<AnalyzeRequest>>,
) -> Result<Json<ApiResponse<BatchReport>>> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let brand = state.repo.find_brand(brand_id).await?;

    let queries = match request.query_id {
        Some(query_id) => {
            let query = state.repo.find_query(query_id).await?;
            if query.brand_id != brand_id {
                return Err(AppError::QueryNotFound {
                    id: query_id.to_string(),
                });
            }
            vec![query]
        }
        None => state.repo.batch_eligible_queries(brand_id).await?,
    };

    if queries.is_empty() {
        tracing::info!(brand_id = %brand_id, "No queries awaiting analysis");
        return Ok(ok(BatchReport::default()));
    }

    let report = state.runner.run(&brand, &queries).await;
    Ok(ok(report))
}
