//! SeaORM entity models
//!
//! Database entities for BrandLens

mod analysis_result;
mod brand;
mod query;

pub use brand::{
    ActiveModel as BrandActiveModel, Column as BrandColumn, Entity as BrandEntity,
    Model as Brand,
};

pub use query::{
    ActiveModel as QueryActiveModel, Column as QueryColumn, Entity as QueryEntity,
    Model as Query,
};

pub use analysis_result::{
    ActiveModel as AnalysisResultActiveModel, Column as AnalysisResultColumn,
    Entity as AnalysisResultEntity, Model as AnalysisResultRow,
};
