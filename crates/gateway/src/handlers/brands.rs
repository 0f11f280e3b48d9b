//! Brand management handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{ok, validate_request, ApiResponse};
use crate::AppState;
use brandlens_common::{
    errors::Result,
    pipeline::{BrandDraft, BrandProfile, TrackedQuery},
};

/// Request body for creating or replacing a brand
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BrandRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[validate(length(min = 1, max = 500))]
    pub website: String,

    #[validate(length(min = 1, max = 100))]
    pub category: String,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    #[serde(default)]
    #[validate(length(max = 50))]
    pub competitors: Vec<String>,

    #[serde(default)]
    #[validate(length(max = 50))]
    pub keywords: Vec<String>,
}

impl BrandRequest {
    fn into_draft(self) -> BrandDraft {
        let clean = |items: Vec<String>| {
            items
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        };

        BrandDraft {
            name: self.name.trim().to_string(),
            website: self.website.trim().to_string(),
            category: self.category.trim().to_string(),
            description: self
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            competitors: clean(self.competitors),
            keywords: clean(self.keywords),
        }
    }
}

/// Brand with its tracked queries
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandDetail {
    #[serde(flatten)]
    pub brand: BrandProfile,
    pub queries: Vec<TrackedQuery>,
}

#[derive(Serialize)]
pub struct Deleted {
    pub id: Uuid,
}

pub async fn list_brands(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<BrandProfile>>>> {
    let brands = state.repo.list_brands().await?;
    Ok(ok(brands))
}

/// Create a brand and seed it with generated queries
pub async fn create_brand(
    State(state): State<AppState>,
    Json(request): Json<BrandRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BrandDetail>>)> {
    validate_request(&request)?;

    let brand = state.repo.create_brand(request.into_draft()).await?;
    let queries = state.runner.seed_queries(&state.generator, &brand).await?;

    tracing::info!(
        brand_id = %brand.id,
        name = %brand.name,
        queries = queries.len(),
        "Brand created"
    );

    Ok((StatusCode::CREATED, ok(BrandDetail { brand, queries })))
}

pub async fn get_brand(
    State(state): State<AppState>,
    Path(brand_id): Path<Uuid>,
) -> Result<Json<ApiResponse<BrandDetail>>> {
    let brand = state.repo.find_brand(brand_id).await?;
    let queries = state.repo.list_queries(brand_id).await?;
    Ok(ok(BrandDetail { brand, queries }))
}

pub async fn update_brand(
    State(state): State<AppState>,
    Path(brand_id): Path<Uuid>,
    Json(request): Json<BrandRequest>,
) -> Result<Json<ApiResponse<BrandProfile>>> {
    validate_request(&request)?;

    let brand = state
        .repo
        .update_brand(brand_id, request.into_draft())
        .await?;

    tracing::info!(brand_id = %brand_id, "Brand updated");
    Ok(ok(brand))
}

/// Delete a brand together with its queries and results
pub async fn delete_brand(
    State(state): State<AppState>,
    Path(brand_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Deleted>>> {
    state.repo.delete_brand(brand_id).await?;

    tracing::info!(brand_id = %brand_id, "Brand deleted");
    Ok(ok(Deleted { id: brand_id }))
}
