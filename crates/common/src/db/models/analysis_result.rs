//! Analysis result entity
//!
//! Mentions and citations are stored as JSONB arrays in their wire shape.

use crate::analysis::AnalysisResult;
use crate::errors::Result as AppResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "analysis_results")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub brand_id: Uuid,

    pub query_id: Uuid,

    #[sea_orm(column_type = "Text")]
    pub query_text: String,

    #[sea_orm(column_type = "Text")]
    pub ai_response: String,

    #[sea_orm(column_type = "JsonBinary")]
    pub brand_mentions: serde_json::Value,

    #[sea_orm(column_type = "JsonBinary")]
    pub citations: serde_json::Value,

    pub user_brand_mentioned: bool,

    pub user_brand_rank: Option<i32>,

    #[sea_orm(column_type = "Text")]
    pub user_brand_sentiment: String,

    pub total_brands_mentioned: i32,

    pub total_citations: i32,

    #[sea_orm(column_type = "Text")]
    pub platform: String,

    pub analyzed_at: DateTimeWithTimeZone,
}

impl Model {
    /// Decode stored columns; unknown enum strings are rejected
    pub fn into_result(self) -> AppResult<AnalysisResult> {
        Ok(AnalysisResult {
            id: self.id,
            brand_id: self.brand_id,
            query_id: self.query_id,
            query_text: self.query_text,
            ai_response: self.ai_response,
            brand_mentions: serde_json::from_value(self.brand_mentions)?,
            citations: serde_json::from_value(self.citations)?,
            user_brand_mentioned: self.user_brand_mentioned,
            user_brand_rank: self.user_brand_rank.and_then(|r| u32::try_from(r).ok()),
            user_brand_sentiment: self.user_brand_sentiment.parse()?,
            total_brands_mentioned: self.total_brands_mentioned.max(0) as u32,
            total_citations: self.total_citations.max(0) as u32,
            platform: self.platform.parse()?,
            analyzed_at: self.analyzed_at.into(),
        })
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::brand::Entity",
        from = "Column::BrandId",
        to = "super::brand::Column::Id",
        on_delete = "Cascade"
    )]
    Brand,

    #[sea_orm(
        belongs_to = "super::query::Entity",
        from = "Column::QueryId",
        to = "super::query::Column::Id",
        on_delete = "Cascade"
    )]
    Query,
}

impl Related<super::brand::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Brand.def()
    }
}

impl Related<super::query::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Query.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
