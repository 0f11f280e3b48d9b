//! Repository pattern for database operations
//!
//! Provides a clean interface for all data access operations
//! with proper error handling and transaction support.

use crate::analysis::AnalysisResult;
use crate::db::models::*;
use crate::db::DbPool;
use crate::errors::{AppError, Result};
use crate::pipeline::{AnalysisStore, BrandDraft, BrandProfile, QueryStatus, TrackedQuery};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use uuid::Uuid;

/// Filters for result listings
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultFilter {
    pub query_id: Option<Uuid>,
    /// Inclusive lower bound on `analyzed_at`
    pub start: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `analyzed_at`
    pub before: Option<DateTime<Utc>>,
}

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get the read connection
    fn read_conn(&self) -> &DatabaseConnection {
        self.pool.read()
    }

    /// Get the write connection
    fn write_conn(&self) -> &DatabaseConnection {
        self.pool.write()
    }

    // ========================================================================
    // Health Check
    // ========================================================================

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    // ========================================================================
    // Brand Operations
    // ========================================================================

    pub async fn create_brand(&self, draft: BrandDraft) -> Result<BrandProfile> {
        let now = Utc::now();

        let brand = BrandActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(draft.name),
            website: Set(draft.website),
            category: Set(draft.category),
            description: Set(draft.description),
            competitors: Set(serde_json::to_value(draft.competitors)?),
            keywords: Set(serde_json::to_value(draft.keywords)?),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        brand.insert(self.write_conn()).await?.into_profile()
    }

    /// List brands, newest first
    pub async fn list_brands(&self) -> Result<Vec<BrandProfile>> {
        BrandEntity::find()
            .order_by_desc(BrandColumn::CreatedAt)
            .all(self.read_conn())
            .await?
            .into_iter()
            .map(Brand::into_profile)
            .collect()
    }

    async fn find_brand_row(&self, id: Uuid) -> Result<Brand> {
        BrandEntity::find_by_id(id)
            .one(self.read_conn())
            .await?
            .ok_or_else(|| AppError::BrandNotFound { id: id.to_string() })
    }

    pub async fn find_brand(&self, id: Uuid) -> Result<BrandProfile> {
        self.find_brand_row(id).await?.into_profile()
    }

    pub async fn update_brand(&self, id: Uuid, draft: BrandDraft) -> Result<BrandProfile> {
        let mut brand: BrandActiveModel = self.find_brand_row(id).await?.into();

        brand.name = Set(draft.name);
        brand.website = Set(draft.website);
        brand.category = Set(draft.category);
        brand.description = Set(draft.description);
        brand.competitors = Set(serde_json::to_value(draft.competitors)?);
        brand.keywords = Set(serde_json::to_value(draft.keywords)?);
        brand.updated_at = Set(Utc::now().into());

        brand.update(self.write_conn()).await?.into_profile()
    }

    /// Delete a brand with its queries and results in one transaction
    pub async fn delete_brand(&self, id: Uuid) -> Result<()> {
        let txn = self.write_conn().begin().await?;

        AnalysisResultEntity::delete_many()
            .filter(AnalysisResultColumn::BrandId.eq(id))
            .exec(&txn)
            .await?;

        QueryEntity::delete_many()
            .filter(QueryColumn::BrandId.eq(id))
            .exec(&txn)
            .await?;

        let deleted = BrandEntity::delete_by_id(id).exec(&txn).await?;
        if deleted.rows_affected == 0 {
            txn.rollback().await?;
            return Err(AppError::BrandNotFound { id: id.to_string() });
        }

        txn.commit().await?;
        Ok(())
    }

    // ========================================================================
    // Query Operations
    // ========================================================================

    pub async fn create_query(
        &self,
        brand_id: Uuid,
        text: &str,
        is_custom: bool,
    ) -> Result<TrackedQuery> {
        let query = QueryActiveModel {
            id: Set(Uuid::new_v4()),
            brand_id: Set(brand_id),
            query_text: Set(text.to_string()),
            is_custom: Set(is_custom),
            status: Set(QueryStatus::Pending.as_str().to_string()),
            last_analyzed_at: Set(None),
            created_at: Set(Utc::now().into()),
        };

        query.insert(self.write_conn()).await?.into_tracked()
    }

    /// Queries of a brand in creation order
    pub async fn list_queries(&self, brand_id: Uuid) -> Result<Vec<TrackedQuery>> {
        QueryEntity::find()
            .filter(QueryColumn::BrandId.eq(brand_id))
            .order_by_asc(QueryColumn::CreatedAt)
            .all(self.read_conn())
            .await?
            .into_iter()
            .map(Query::into_tracked)
            .collect()
    }

    /// Pending and failed queries of a brand in creation order
    pub async fn batch_eligible_queries(&self, brand_id: Uuid) -> Result<Vec<TrackedQuery>> {
        let eligible = [QueryStatus::Pending.as_str(), QueryStatus::Failed.as_str()];

        QueryEntity::find()
            .filter(QueryColumn::BrandId.eq(brand_id))
            .filter(QueryColumn::Status.is_in(eligible))
            .order_by_asc(QueryColumn::CreatedAt)
            .all(self.read_conn())
            .await?
            .into_iter()
            .map(Query::into_tracked)
            .collect()
    }

    async fn find_query_row(&self, id: Uuid) -> Result<Query> {
        QueryEntity::find_by_id(id)
            .one(self.read_conn())
            .await?
            .ok_or_else(|| AppError::QueryNotFound { id: id.to_string() })
    }

    pub async fn find_query(&self, id: Uuid) -> Result<TrackedQuery> {
        self.find_query_row(id).await?.into_tracked()
    }

    /// Move a query to `next`, enforcing the lifecycle
    pub async fn transition_query(&self, id: Uuid, next: QueryStatus) -> Result<TrackedQuery> {
        let row = self.find_query_row(id).await?;
        let status = row.query_status()?.transition(next)?;

        let mut query: QueryActiveModel = row.into();
        query.status = Set(status.as_str().to_string());
        if status == QueryStatus::Completed {
            query.last_analyzed_at = Set(Some(Utc::now().into()));
        }

        query.update(self.write_conn()).await?.into_tracked()
    }

    /// Delete a query and its results in one transaction
    pub async fn delete_query(&self, id: Uuid) -> Result<()> {
        let txn = self.write_conn().begin().await?;

        AnalysisResultEntity::delete_many()
            .filter(AnalysisResultColumn::QueryId.eq(id))
            .exec(&txn)
            .await?;

        let deleted = QueryEntity::delete_by_id(id).exec(&txn).await?;
        if deleted.rows_affected == 0 {
            txn.rollback().await?;
            return Err(AppError::QueryNotFound { id: id.to_string() });
        }

        txn.commit().await?;
        Ok(())
    }

    // ========================================================================
    // Result Operations
    // ========================================================================

    /// Results of a brand, newest first
    pub async fn list_results(
        &self,
        brand_id: Uuid,
        filter: ResultFilter,
    ) -> Result<Vec<AnalysisResult>> {
        let mut select =
            AnalysisResultEntity::find().filter(AnalysisResultColumn::BrandId.eq(brand_id));

        if let Some(query_id) = filter.query_id {
            select = select.filter(AnalysisResultColumn::QueryId.eq(query_id));
        }
        if let Some(start) = filter.start {
            select = select.filter(AnalysisResultColumn::AnalyzedAt.gte(start));
        }
        if let Some(before) = filter.before {
            select = select.filter(AnalysisResultColumn::AnalyzedAt.lt(before));
        }

        select
            .order_by_desc(AnalysisResultColumn::AnalyzedAt)
            .all(self.read_conn())
            .await?
            .into_iter()
            .map(AnalysisResultRow::into_result)
            .collect()
    }
}

#[async_trait]
impl AnalysisStore for Repository {
    async fn set_query_status(
        &self,
        query_id: Uuid,
        status: QueryStatus,
        analyzed_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let mut query: QueryActiveModel = self.find_query_row(query_id).await?.into();
        query.status = Set(status.as_str().to_string());
        if let Some(at) = analyzed_at {
            query.last_analyzed_at = Set(Some(at.into()));
        }

        query.update(self.write_conn()).await?;
        Ok(())
    }

    async fn insert_result(&self, result: &AnalysisResult) -> Result<()> {
        let row = AnalysisResultActiveModel {
            id: Set(result.id),
            brand_id: Set(result.brand_id),
            query_id: Set(result.query_id),
            query_text: Set(result.query_text.clone()),
            ai_response: Set(result.ai_response.clone()),
            brand_mentions: Set(serde_json::to_value(&result.brand_mentions)?),
            citations: Set(serde_json::to_value(&result.citations)?),
            user_brand_mentioned: Set(result.user_brand_mentioned),
            user_brand_rank: Set(result.user_brand_rank.map(|r| r as i32)),
            user_brand_sentiment: Set(result.user_brand_sentiment.as_str().to_string()),
            total_brands_mentioned: Set(result.total_brands_mentioned as i32),
            total_citations: Set(result.total_citations as i32),
            platform: Set(result.platform.as_str().to_string()),
            analyzed_at: Set(result.analyzed_at.into()),
        };

        row.insert(self.write_conn()).await?;
        Ok(())
    }

    async fn insert_query(
        &self,
        brand_id: Uuid,
        text: &str,
        is_custom: bool,
    ) -> Result<TrackedQuery> {
        self.create_query(brand_id, text, is_custom).await
    }
}
