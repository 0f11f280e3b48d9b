//! Brand entity

use crate::errors::Result as AppResult;
use crate::pipeline::BrandProfile;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "brands")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(column_type = "Text")]
    pub name: String,

    #[sea_orm(column_type = "Text")]
    pub website: String,

    #[sea_orm(column_type = "Text")]
    pub category: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// Ordered competitor names as a JSONB array
    #[sea_orm(column_type = "JsonBinary")]
    pub competitors: serde_json::Value,

    /// Ordered keywords as a JSONB array
    #[sea_orm(column_type = "JsonBinary")]
    pub keywords: serde_json::Value,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    pub fn into_profile(self) -> AppResult<BrandProfile> {
        Ok(BrandProfile {
            id: self.id,
            name: self.name,
            website: self.website,
            category: self.category,
            description: self.description,
            competitors: serde_json::from_value(self.competitors)?,
            keywords: serde_json::from_value(self.keywords)?,
            created_at: self.created_at.into(),
            updated_at: self.updated_at.into(),
        })
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::query::Entity")]
    Queries,

    #[sea_orm(has_many = "super::analysis_result::Entity")]
    AnalysisResults,
}

impl Related<super::query::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Queries.def()
    }
}

impl Related<super::analysis_result::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AnalysisResults.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
