//! Brand and query records shared by the store and the HTTP layer

use super::QueryStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A tracked brand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandProfile {
    pub id: Uuid,
    pub name: String,
    pub website: String,
    pub category: String,
    pub description: Option<String>,
    pub competitors: Vec<String>,
    pub keywords: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A prompt tracked for one brand. Text is immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedQuery {
    pub id: Uuid,
    pub brand_id: Uuid,
    #[serde(rename = "query")]
    pub text: String,
    pub is_custom: bool,
    pub status: QueryStatus,
    pub last_analyzed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Brand fields accepted on create and update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandDraft {
    pub name: String,
    pub website: String,
    pub category: String,
    pub description: Option<String>,
    #[serde(default)]
    pub competitors: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}
