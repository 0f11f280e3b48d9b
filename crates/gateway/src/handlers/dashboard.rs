//! Dashboard, results and history handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{ok, validate_request, ApiResponse};
use crate::AppState;
use brandlens_common::{
    aggregation::{aggregate_by_day, group_by_query, DaySummary, MentionAggregator, QueryResults},
    analysis::AnalysisResult,
    db::ResultFilter,
    errors::{AppError, Result},
    pipeline::{BrandProfile, QueryStatus, TrackedQuery},
    DashboardMetrics,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardParams {
    /// RFC 3339 timestamp or `YYYY-MM-DD`
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub query_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct HistoryParams {
    #[validate(range(min = 1, max = 365))]
    pub days: Option<i64>,
}

/// Query counts by lifecycle status
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct QuerySummary {
    pub total: usize,
    pub pending: usize,
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
}

impl QuerySummary {
    fn from_queries(queries: &[TrackedQuery]) -> Self {
        let mut summary = Self {
            total: queries.len(),
            ..Default::default()
        };
        for query in queries {
            match query.status {
                QueryStatus::Pending => summary.pending += 1,
                QueryStatus::Processing => summary.processing += 1,
                QueryStatus::Completed => summary.completed += 1,
                QueryStatus::Failed => summary.failed += 1,
            }
        }
        summary
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub brand: BrandProfile,
    #[serde(flatten)]
    pub metrics: DashboardMetrics,
    pub query_summary: QuerySummary,
    pub recent_results: Vec<AnalysisResult>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub days: i64,
    pub history: Vec<DaySummary>,
}

/// Parse a date filter bound.
///
/// Bare dates start at UTC midnight; as an upper bound they cover the whole
/// day by resolving to the following midnight.
fn parse_bound(raw: &str, upper: bool) -> Result<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&Utc));
    }

    let invalid = || AppError::InvalidFormat {
        message: format!("invalid date '{}', expected YYYY-MM-DD or RFC 3339", raw),
    };
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| invalid())?;
    let date = if upper {
        date.succ_opt().ok_or_else(invalid)?
    } else {
        date
    };
    Ok(date.and_time(NaiveTime::MIN).and_utc())
}

impl DashboardParams {
    fn filter(&self) -> Result<ResultFilter> {
        let start = self
            .start_date
            .as_deref()
            .map(|s| parse_bound(s, false))
            .transpose()?;
        let before = self
            .end_date
            .as_deref()
            .map(|s| parse_bound(s, true))
            .transpose()?;

        if let (Some(start), Some(before)) = (start, before) {
            if start > before {
                return Err(AppError::Validation {
                    message: "startDate must not be after endDate".to_string(),
                    field: Some("startDate".to_string()),
                });
            }
        }

        Ok(ResultFilter {
            query_id: self.query_id,
            start,
            before,
        })
    }
}

/// Dashboard metrics for a brand over an optional date range
pub async fn dashboard(
    State(state): State<AppState>,
    Path(brand_id): Path<Uuid>,
    Query(params): Query<DashboardParams>,
) -> Result<Json<ApiResponse<DashboardResponse>>> {
    let filter = params.filter()?;
    let brand = state.repo.find_brand(brand_id).await?;

    let results = state.repo.list_results(brand_id, filter).await?;
    let queries = state.repo.list_queries(brand_id).await?;

    let metrics = MentionAggregator::new(state.config.analysis.top_citations)
        .aggregate(&results, &brand.name);

    let recent_results = results
        .into_iter()
        .take(state.config.analysis.recent_results)
        .collect();

    Ok(ok(DashboardResponse {
        brand,
        metrics,
        query_summary: QuerySummary::from_queries(&queries),
        recent_results,
    }))
}

/// All results of a brand grouped by query, newest first
pub async fn results(
    State(state): State<AppState>,
    Path(brand_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<QueryResults>>>> {
    state.repo.find_brand(brand_id).await?;
    let results = state
        .repo
        .list_results(brand_id, ResultFilter::default())
        .await?;
    Ok(ok(group_by_query(&results)))
}

/// Daily visibility history over the last `days` days
pub async fn history(
    State(state): State<AppState>,
    Path(brand_id): Path<Uuid>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<ApiResponse<HistoryResponse>>> {
    validate_request(&params)?;
    let days = params.days.unwrap_or(state.config.analysis.history_days);

    state.repo.find_brand(brand_id).await?;

    let now = Utc::now();
    let filter = ResultFilter {
        start: Duration::try_days(days).and_then(|window| now.checked_sub_signed(window)),
        ..Default::default()
    };
    let results = state.repo.list_results(brand_id, filter).await?;

    Ok(ok(HistoryResponse {
        days,
        history: aggregate_by_day(&results, days, now),
    }))
}
