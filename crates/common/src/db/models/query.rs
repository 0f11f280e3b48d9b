//! Tracked query entity

use crate::errors::Result as AppResult;
use crate::pipeline::{QueryStatus, TrackedQuery};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "queries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub brand_id: Uuid,

    #[sea_orm(column_type = "Text")]
    pub query_text: String,

    pub is_custom: bool,

    #[sea_orm(column_type = "Text")]
    pub status: String,

    pub last_analyzed_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    /// Get the query status as an enum
    pub fn query_status(&self) -> AppResult<QueryStatus> {
        self.status.parse()
    }

    pub fn into_tracked(self) -> AppResult<TrackedQuery> {
        Ok(TrackedQuery {
            status: self.query_status()?,
            id: self.id,
            brand_id: self.brand_id,
            text: self.query_text,
            is_custom: self.is_custom,
            last_analyzed_at: self.last_analyzed_at.map(Into::into),
            created_at: self.created_at.into(),
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

    #[sea_orm(has_many = "super::analysis_result::Entity")]
    AnalysisResults,
}

impl Related<super::brand::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Brand.def()
    }
}

impl Related<super::analysis_result::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AnalysisResults.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use chrono::Utc;

    fn row(status: &str) -> Model {
        Model {
            id: Uuid::new_v4(),
            brand_id: Uuid::new_v4(),
            query_text: "best crm?".to_string(),
            is_custom: true,
            status: status.to_string(),
            last_analyzed_at: None,
            created_at: Utc::now().fixed_offset(),
        }
    }

    #[test]
    fn test_into_tracked() {
        let model = row("failed");
        let id = model.id;
        let tracked = model.into_tracked().unwrap();

        assert_eq!(tracked.id, id);
        assert_eq!(tracked.text, "best crm?");
        assert_eq!(tracked.status, QueryStatus::Failed);
        assert!(tracked.is_custom);
    }

    #[test]
    fn test_unknown_status_rejected() {
        let err = row("archived").into_tracked().unwrap_err();
        assert!(matches!(err, AppError::InvalidFormat { .. }));
    }
}
