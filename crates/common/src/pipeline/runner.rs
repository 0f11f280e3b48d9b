//! Batch analysis runner
//!
//! Drives queries through the lifecycle one at a time:
//! 1. Marks the query processing
//! 2. Fetches an answer from the answer source
//! 3. Analyzes it for the brand
//! 4. Stores the result and marks the query completed
//!
//! A failure in any step marks that query failed and the batch moves on.

use super::records::{BrandProfile, TrackedQuery};
use super::QueryStatus;
use crate::analysis::{AnalysisResult, AnswerSource, QueryGenerator, ResponseAnalyzer};
use crate::errors::{AppError, Result};
use crate::metrics;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// Persistence used by the runner
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// Set a query's status; `analyzed_at` is recorded when present
    async fn set_query_status(
        &self,
        query_id: Uuid,
        status: QueryStatus,
        analyzed_at: Option<DateTime<Utc>>,
    ) -> Result<()>;

    async fn insert_result(&self, result: &AnalysisResult) -> Result<()>;

    async fn insert_query(&self, brand_id: Uuid, text: &str, is_custom: bool)
        -> Result<TrackedQuery>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryFailure {
    pub query_id: Uuid,
    pub query: String,
    pub error: String,
}

/// Outcome of one batch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub results: Vec<AnalysisResult>,
    pub errors: Vec<QueryFailure>,
}

impl BatchReport {
    pub fn analyzed(&self) -> usize {
        self.results.len()
    }
}

pub struct BatchRunner {
    store: Arc<dyn AnalysisStore>,
    source: Arc<dyn AnswerSource>,
    analyzer: Arc<ResponseAnalyzer>,
}

impl BatchRunner {
    pub fn new(
        store: Arc<dyn AnalysisStore>,
        source: Arc<dyn AnswerSource>,
        analyzer: Arc<ResponseAnalyzer>,
    ) -> Self {
        Self {
            store,
            source,
            analyzer,
        }
    }

    /// Analyze `queries` sequentially in the given order
    #[instrument(skip(self, brand, queries), fields(brand_id = %brand.id, count = queries.len()))]
    pub async fn run(&self, brand: &BrandProfile, queries: &[TrackedQuery]) -> BatchReport {
        info!("Starting analysis batch");
        let mut report = BatchReport::default();

        for query in queries {
            let started = Instant::now();
            match self.run_one(brand, query).await {
                Ok(result) => {
                    metrics::record_analysis(started.elapsed().as_secs_f64(), true);
                    report.results.push(result);
                }
                Err(e) => {
                    metrics::record_analysis(started.elapsed().as_secs_f64(), false);
                    warn!(query_id = %query.id, error = %e, "Query analysis failed");
                    report.errors.push(QueryFailure {
                        query_id: query.id,
                        query: query.text.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            analyzed = report.results.len(),
            failed = report.errors.len(),
            "Analysis batch finished"
        );
        report
    }

    async fn run_one(&self, brand: &BrandProfile, query: &TrackedQuery) -> Result<AnalysisResult> {
        let processing = query.status.begin()?;
        self.store
            .set_query_status(query.id, processing, None)
            .await?;

        match self.analyze_and_complete(brand, query, processing).await {
            Ok(result) => Ok(result),
            Err(e) => {
                let failed = processing.fail()?;
                if let Err(store_err) = self.store.set_query_status(query.id, failed, None).await {
                    error!(query_id = %query.id, error = %store_err, "Failed to mark query failed");
                }
                Err(e)
            }
        }
    }

    /// Everything between `processing` and `completed`; any error here fails the query
    async fn analyze_and_complete(
        &self,
        brand: &BrandProfile,
        query: &TrackedQuery,
        processing: QueryStatus,
    ) -> Result<AnalysisResult> {
        let result = self.analyze_and_store(brand, query).await?;
        let completed = processing.complete()?;
        self.store
            .set_query_status(query.id, completed, Some(result.analyzed_at))
            .await?;
        Ok(result)
    }

    async fn analyze_and_store(
        &self,
        brand: &BrandProfile,
        query: &TrackedQuery,
    ) -> Result<AnalysisResult> {
        let answer = self
            .source
            .fetch_answer(&query.text, &brand.name, &brand.category)
            .await?;

        let outcome = self
            .analyzer
            .analyze(&answer, &brand.name, &brand.category)
            .await;

        let result = AnalysisResult::from_outcome(
            brand.id,
            query.id,
            query.text.clone(),
            answer,
            outcome,
            self.source.platform(),
            Utc::now(),
        );

        self.store.insert_result(&result).await?;
        Ok(result)
    }

    /// Insert several queries concurrently; fails if any insert fails
    pub async fn create_queries(
        &self,
        brand_id: Uuid,
        texts: &[String],
        is_custom: bool,
    ) -> Result<Vec<TrackedQuery>> {
        let texts: Vec<&str> = texts
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect();

        if texts.is_empty() {
            return Err(AppError::MissingField {
                field: "query".to_string(),
            });
        }

        let created = try_join_all(
            texts
                .iter()
                .map(|text| self.store.insert_query(brand_id, text, is_custom)),
        )
        .await?;

        metrics::record_queries_created(created.len(), is_custom);
        Ok(created)
    }

    /// Generate queries for a brand and store them as non-custom
    pub async fn seed_queries(
        &self,
        generator: &QueryGenerator,
        brand: &BrandProfile,
    ) -> Result<Vec<TrackedQuery>> {
        let texts = generator
            .generate(&brand.name, &brand.category, &brand.website)
            .await;
        self.create_queries(brand.id, &texts, false).await
    }
}
